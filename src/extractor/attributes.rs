//! Parsing of `openapi_*` handler attributes.
//!
//! ```ignore
//! #[openapi_tag("Staff")]
//! #[openapi_param(name = "page", location = "query", type = "integer", required)]
//! #[openapi_request_body(description = "New employee", mime_types("application/json"))]
//! #[openapi_dto(EmployeeInput)]
//! #[openapi_form(name = "notify", type = "boolean")]
//! #[openapi_response(status = 404, description = "Missing", reference = "Exception")]
//! #[openapi_security(name = "BearerAuth", scopes("read"))]
//! ```

use crate::annotation::{
    AnnotationRecord, DtoDirective, FieldDirective, ParameterDirective, RequestBodyDirective,
    ResponseDirective, SecurityDirective,
};
use crate::openapi::{ParameterLocation, ResponseKey};
use log::warn;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{Attribute, Lit, LitBool, LitStr, Token};

const ATTRIBUTE_PREFIX: &str = "openapi_";

/// Applies every `openapi_*` attribute in `attrs` to `record`. Malformed attributes are logged
/// and skipped.
pub fn apply(attrs: &[Attribute], record: &mut AnnotationRecord, handler: &str) {
    for attr in attrs {
        let Some(ident) = attr.path().get_ident() else {
            continue;
        };
        let name = ident.to_string();
        let Some(kind) = name.strip_prefix(ATTRIBUTE_PREFIX) else {
            continue;
        };

        let result = match kind {
            "tag" => parse_tags(attr).map(|tags| record.tags.extend(tags)),
            "param" => parse_param(attr).map(|p| record.parameters.push(p)),
            "request_body" => parse_request_body(attr).map(|b| record.request_body = Some(b)),
            "dto" => parse_dto(attr).map(|d| record.dto = Some(d)),
            "form" => parse_field(attr).map(|f| record.form_fields.push(f)),
            "response" => parse_response(attr).map(|r| record.responses.push(r)),
            "security" => parse_security(attr).map(|s| record.security.push(s)),
            _ => Err(syn::Error::new_spanned(attr, "unknown openapi attribute")),
        };

        if let Err(err) = result {
            warn!("Skipping malformed #[{}] on {}: {}", name, handler, err);
        }
    }
}

fn parse_tags(attr: &Attribute) -> syn::Result<Vec<String>> {
    let tags = attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
    Ok(tags.into_iter().map(|t| t.value()).collect())
}

fn parse_param(attr: &Attribute) -> syn::Result<ParameterDirective> {
    let mut name = None;
    let mut directive = ParameterDirective {
        name: String::new(),
        location: ParameterLocation::Query,
        schema_type: "string".to_string(),
        format: None,
        required: false,
        description: None,
        deprecated: false,
    };
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(string_value(&meta)?);
        } else if meta.path.is_ident("location") || meta.path.is_ident("in") {
            directive.location = parse_location(&meta)?;
        } else if meta.path.is_ident("type") {
            directive.schema_type = string_value(&meta)?;
        } else if meta.path.is_ident("format") {
            directive.format = Some(string_value(&meta)?);
        } else if meta.path.is_ident("required") {
            directive.required = flag(&meta)?;
        } else if meta.path.is_ident("description") {
            directive.description = Some(string_value(&meta)?);
        } else if meta.path.is_ident("deprecated") {
            directive.deprecated = flag(&meta)?;
        } else {
            return Err(meta.error("unsupported openapi_param key"));
        }
        Ok(())
    })?;
    directive.name = required_name(attr, name)?;
    Ok(directive)
}

fn parse_request_body(attr: &Attribute) -> syn::Result<RequestBodyDirective> {
    let mut directive = RequestBodyDirective::default();
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("description") {
            directive.description = Some(string_value(&meta)?);
        } else if meta.path.is_ident("required") {
            directive.required = Some(flag(&meta)?);
        } else if meta.path.is_ident("ignore_base_schema") {
            directive.ignore_base_schema = flag(&meta)?;
        } else if meta.path.is_ident("reference") {
            directive.reference = Some(string_value(&meta)?);
        } else if meta.path.is_ident("mime_types") {
            directive.mime_types = string_list(&meta)?;
        } else {
            return Err(meta.error("unsupported openapi_request_body key"));
        }
        Ok(())
    })?;
    Ok(directive)
}

fn parse_dto(attr: &Attribute) -> syn::Result<DtoDirective> {
    let path: syn::Path = attr.parse_args()?;
    let name = path
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
        .ok_or_else(|| syn::Error::new_spanned(attr, "expected a type name"))?;
    Ok(DtoDirective {
        name,
        fields: Vec::new(),
    })
}

fn parse_field(attr: &Attribute) -> syn::Result<FieldDirective> {
    let mut name = None;
    let mut field = FieldDirective::new("", "string", false);
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(string_value(&meta)?);
        } else if meta.path.is_ident("type") {
            field.field_type = string_value(&meta)?;
        } else if meta.path.is_ident("format") {
            field.format = Some(string_value(&meta)?);
        } else if meta.path.is_ident("required") {
            field.required = flag(&meta)?;
        } else if meta.path.is_ident("description") {
            field.description = Some(string_value(&meta)?);
        } else {
            return Err(meta.error("unsupported openapi_form key"));
        }
        Ok(())
    })?;
    field.name = required_name(attr, name)?;
    Ok(field)
}

fn parse_response(attr: &Attribute) -> syn::Result<ResponseDirective> {
    let mut status = None;
    let mut directive = ResponseDirective::new(ResponseKey::Default);
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("status") {
            status = Some(parse_status(&meta)?);
        } else if meta.path.is_ident("description") {
            directive.description = Some(string_value(&meta)?);
        } else if meta.path.is_ident("mime_type") {
            directive.mime_type = Some(string_value(&meta)?);
        } else if meta.path.is_ident("reference") {
            directive.reference = Some(string_value(&meta)?);
        } else if meta.path.is_ident("type") {
            directive.schema_type = Some(string_value(&meta)?);
        } else {
            return Err(meta.error("unsupported openapi_response key"));
        }
        Ok(())
    })?;
    directive.status =
        status.ok_or_else(|| syn::Error::new_spanned(attr, "missing `status`"))?;
    Ok(directive)
}

fn parse_security(attr: &Attribute) -> syn::Result<SecurityDirective> {
    let mut name = None;
    let mut scopes = Vec::new();
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(string_value(&meta)?);
        } else if meta.path.is_ident("scopes") {
            scopes = string_list(&meta)?;
        } else {
            return Err(meta.error("unsupported openapi_security key"));
        }
        Ok(())
    })?;
    Ok(SecurityDirective {
        name: required_name(attr, name)?,
        scopes,
    })
}

fn required_name(attr: &Attribute, name: Option<String>) -> syn::Result<String> {
    name.filter(|n| !n.trim().is_empty())
        .ok_or_else(|| syn::Error::new_spanned(attr, "missing `name`"))
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    Ok(meta.value()?.parse::<LitStr>()?.value())
}

/// `key` alone means true, `key = false` is explicit.
fn flag(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        Ok(meta.value()?.parse::<LitBool>()?.value)
    } else {
        Ok(true)
    }
}

/// `key("a", "b")`
fn string_list(meta: &ParseNestedMeta) -> syn::Result<Vec<String>> {
    let content;
    syn::parenthesized!(content in meta.input);
    let values = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
    Ok(values.into_iter().map(|v| v.value()).collect())
}

fn parse_location(meta: &ParseNestedMeta) -> syn::Result<ParameterLocation> {
    match string_value(meta)?.to_ascii_lowercase().as_str() {
        "path" => Ok(ParameterLocation::Path),
        "query" => Ok(ParameterLocation::Query),
        "header" => Ok(ParameterLocation::Header),
        "cookie" => Ok(ParameterLocation::Cookie),
        other => Err(meta.error(format!("unknown parameter location `{}`", other))),
    }
}

/// `status = 404`, `status = "5XX"` or `status = "default"`
fn parse_status(meta: &ParseNestedMeta) -> syn::Result<ResponseKey> {
    let raw = match meta.value()?.parse::<Lit>()? {
        Lit::Int(int) => int.base10_digits().to_string(),
        Lit::Str(s) => s.value(),
        _ => return Err(meta.error("expected a status code, class or `default`")),
    };
    raw.parse::<ResponseKey>()
        .map_err(|err| meta.error(err.to_string()))
}
