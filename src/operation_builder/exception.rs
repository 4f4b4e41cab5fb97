//! Responses for exceptions a handler documents as thrown.

use crate::annotation::ThrowsDirective;
use crate::config::GeneratorConfig;
use crate::openapi::{Response, ResponseKey, Schema};
use http::StatusCode;
use log::debug;

/// Exception names, with `Exception`/`Error` suffixes removed, and the status they map to.
const EXCEPTION_STATUS: &[(&str, u16)] = &[
    ("BadRequest", 400),
    ("Unauthorized", 401),
    ("Forbidden", 403),
    ("NotFound", 404),
    ("RecordNotFound", 404),
    ("MethodNotAllowed", 405),
    ("NotAcceptable", 406),
    ("Conflict", 409),
    ("Gone", 410),
    ("UnprocessableEntity", 422),
    ("Validation", 422),
    ("TooManyRequests", 429),
    ("Internal", 500),
    ("InternalServer", 500),
    ("NotImplemented", 501),
    ("ServiceUnavailable", 503),
];

/// `App\Http\NotFoundException` / `crate::errors::NotFoundError` -> `NotFound`
fn base_name(exception: &str) -> &str {
    let name = exception
        .rsplit(|c| c == ':' || c == '\\' || c == '/' || c == '.')
        .next()
        .unwrap_or(exception);
    let name = name.strip_suffix("Exception").unwrap_or(name);
    name.strip_suffix("Error").unwrap_or(name)
}

/// Status code of a known exception type.
pub fn status_for(exception: &str) -> Option<u16> {
    let name = base_name(exception);
    EXCEPTION_STATUS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, status)| *status)
}

/// Response key for an exception type, `fallback` when the type is unknown.
pub fn response_key(exception: &str, fallback: ResponseKey) -> ResponseKey {
    match status_for(exception).map(ResponseKey::status) {
        Some(Ok(key)) => key,
        _ => {
            debug!("Unknown exception `{}`, using {}", exception, fallback);
            fallback
        }
    }
}

/// Reason phrase for a response key: `404` -> `Not Found`, `5XX` -> `Server error`.
pub fn default_description(key: ResponseKey) -> String {
    match key {
        ResponseKey::Status(code) => StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown status")
            .to_string(),
        ResponseKey::Class(class) => match class {
            1 => "Informational",
            2 => "Success",
            3 => "Redirection",
            4 => "Client error",
            _ => "Server error",
        }
        .to_string(),
        ResponseKey::Default => "Unexpected error".to_string(),
    }
}

/// Builds the response documenting one thrown exception.
pub fn exception_response(throws: &ThrowsDirective, config: &GeneratorConfig) -> Response {
    let key = response_key(&throws.exception, config.exception_fallback);
    let description = throws
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| default_description(key));

    let schema = Schema::component(&config.exception_schema);
    config
        .response_content_types
        .iter()
        .fold(Response::new(key).with_description(description), |response, mime_type| {
            response.with_content(mime_type, schema.clone())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn throws(exception: &str, description: Option<&str>) -> ThrowsDirective {
        ThrowsDirective {
            exception: exception.to_string(),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_exception_table() {
        assert_eq!(status_for("BadRequestException"), Some(400));
        assert_eq!(status_for("UnauthorizedException"), Some(401));
        assert_eq!(status_for("ForbiddenError"), Some(403));
        assert_eq!(status_for("App\\Http\\Exception\\NotFoundException"), Some(404));
        assert_eq!(status_for("crate::error::RecordNotFound"), Some(404));
        assert_eq!(status_for("MethodNotAllowedException"), Some(405));
        assert_eq!(status_for("ConflictException"), Some(409));
        assert_eq!(status_for("ValidationError"), Some(422));
        assert_eq!(status_for("InternalErrorException"), Some(500));
        assert_eq!(status_for("InternalServerError"), Some(500));
        assert_eq!(status_for("ServiceUnavailableException"), Some(503));
        assert_eq!(status_for("Exception"), None);
        assert_eq!(status_for("DatabaseException"), None);
    }

    #[test]
    fn test_unknown_exception_uses_fallback() {
        assert_eq!(
            response_key("DatabaseException", ResponseKey::Class(5)),
            ResponseKey::Class(5)
        );
        assert_eq!(
            response_key("DatabaseException", ResponseKey::Default),
            ResponseKey::Default
        );
        assert_eq!(
            response_key("NotFoundException", ResponseKey::Class(5)),
            ResponseKey::Status(404)
        );
    }

    #[test]
    fn test_default_descriptions() {
        assert_eq!(default_description(ResponseKey::Status(404)), "Not Found");
        assert_eq!(default_description(ResponseKey::Status(422)), "Unprocessable Entity");
        assert_eq!(default_description(ResponseKey::Class(5)), "Server error");
        assert_eq!(default_description(ResponseKey::Default), "Unexpected error");
    }

    #[test]
    fn test_exception_response() {
        let config = GeneratorConfig {
            response_content_types: vec![
                "application/json".to_string(),
                "application/xml".to_string(),
            ],
            ..GeneratorConfig::default()
        };

        let response = exception_response(&throws("NotFoundException", None), &config);
        assert_eq!(response.key(), ResponseKey::Status(404));
        assert_eq!(response.description(), Some("Not Found"));
        assert_eq!(response.content().len(), 2);
        assert_eq!(
            response.content_by_mime_type("application/xml").unwrap().schema,
            Schema::component("Exception")
        );

        let response =
            exception_response(&throws("BadRequestException", Some("Bad input")), &config);
        assert_eq!(response.description(), Some("Bad input"));
    }
}
