//! OpenAPI value objects.
//!
//! Every type here validates on construction and owns its serialization rules (which keys are
//! omitted, in which order they are written). Maps are [`IndexMap`]s so output follows insertion
//! order and is reproducible across runs.
//!
//! [`IndexMap`]: indexmap::IndexMap

pub mod document;
pub mod operation;
pub mod parameter;
pub mod request_body;
pub mod response;
pub mod schema;

pub use document::{Components, Document, Info, PartialDocument, PathItem, Server};
pub use operation::{ExternalDocs, Operation, OperationObject, SecurityRequirement};
pub use parameter::{Parameter, ParameterLocation};
pub use request_body::RequestBody;
pub use response::{Content, Response};
pub use schema::{InlineSchema, Schema, SchemaReference, COMPONENT_SCHEMA_PREFIX};

use crate::error::ConfigurationError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// HTTP verbs an [`Operation`] may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    /// Lower-case form used as the path item key.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// GET and DELETE operations never carry a request body.
    pub fn allows_request_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl FromStr for HttpMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "put" => Ok(HttpMethod::Put),
            "post" => Ok(HttpMethod::Post),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            _ => Err(ConfigurationError::InvalidHttpMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Key of an entry in an operation's `responses` map.
///
/// OpenAPI lets exact status codes, status classes such as `5XX`, and `default` share one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKey {
    /// An exact status code, 100 through 599.
    Status(u16),
    /// A status class, the leading digit 1 through 5.
    Class(u8),
    Default,
}

impl ResponseKey {
    /// True for 200-299 and the `2XX` class.
    pub fn is_success(&self) -> bool {
        match self {
            ResponseKey::Status(code) => (200..300).contains(code),
            ResponseKey::Class(class) => *class == 2,
            ResponseKey::Default => false,
        }
    }

    pub fn status(code: u16) -> Result<Self, ConfigurationError> {
        if (100..600).contains(&code) {
            Ok(ResponseKey::Status(code))
        } else {
            Err(ConfigurationError::InvalidResponseKey(code.to_string()))
        }
    }
}

impl FromStr for ResponseKey {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::InvalidResponseKey(s.to_string());
        let trimmed = s.trim();

        if trimmed.eq_ignore_ascii_case("default") {
            return Ok(ResponseKey::Default);
        }

        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 {
            return Err(invalid());
        }
        if bytes[1].eq_ignore_ascii_case(&b'x') && bytes[2].eq_ignore_ascii_case(&b'x') {
            return match bytes[0] {
                b'1'..=b'5' => Ok(ResponseKey::Class(bytes[0] - b'0')),
                _ => Err(invalid()),
            };
        }

        let code: u16 = trimmed.parse().map_err(|_| invalid())?;
        ResponseKey::status(code).map_err(|_| invalid())
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseKey::Status(code) => write!(f, "{}", code),
            ResponseKey::Class(class) => write!(f, "{}XX", class),
            ResponseKey::Default => f.write_str("default"),
        }
    }
}

impl Serialize for ResponseKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResponseKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResponseKeyVisitor;

        impl<'de> Visitor<'de> for ResponseKeyVisitor {
            type Value = ResponseKey;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a status code, a status class such as 5XX, or `default`")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ResponseKey, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ResponseKey, E> {
                u16::try_from(v)
                    .map_err(|_| E::custom(ConfigurationError::InvalidResponseKey(v.to_string())))
                    .and_then(|code| ResponseKey::status(code).map_err(E::custom))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ResponseKey, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(ConfigurationError::InvalidResponseKey(v.to_string())))
                    .and_then(|code| self.visit_u64(code))
            }
        }

        deserializer.deserialize_any(ResponseKeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse_is_case_insensitive() {
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
    }

    #[test]
    fn test_http_method_rejects_other_verbs() {
        for verb in ["OPTIONS", "HEAD", "TRACE", "CONNECT", "FOO", ""] {
            assert_eq!(
                verb.parse::<HttpMethod>(),
                Err(ConfigurationError::InvalidHttpMethod(verb.to_string()))
            );
        }
    }

    #[test]
    fn test_request_body_allowed() {
        assert!(!HttpMethod::Get.allows_request_body());
        assert!(!HttpMethod::Delete.allows_request_body());
        assert!(HttpMethod::Post.allows_request_body());
        assert!(HttpMethod::Put.allows_request_body());
        assert!(HttpMethod::Patch.allows_request_body());
    }

    #[test]
    fn test_response_key_parse() {
        assert_eq!("404".parse::<ResponseKey>().unwrap(), ResponseKey::Status(404));
        assert_eq!("5XX".parse::<ResponseKey>().unwrap(), ResponseKey::Class(5));
        assert_eq!("2xx".parse::<ResponseKey>().unwrap(), ResponseKey::Class(2));
        assert_eq!("default".parse::<ResponseKey>().unwrap(), ResponseKey::Default);
    }

    #[test]
    fn test_response_key_rejects_invalid() {
        for key in ["6XX", "0XX", "99", "600", "abc", "2X0", ""] {
            assert!(key.parse::<ResponseKey>().is_err(), "accepted {}", key);
        }
    }

    #[test]
    fn test_response_key_display_round_trips() {
        for key in [ResponseKey::Status(201), ResponseKey::Class(4), ResponseKey::Default] {
            assert_eq!(key.to_string().parse::<ResponseKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_response_key_success() {
        assert!(ResponseKey::Status(200).is_success());
        assert!(ResponseKey::Status(204).is_success());
        assert!(ResponseKey::Class(2).is_success());
        assert!(!ResponseKey::Status(302).is_success());
        assert!(!ResponseKey::Class(5).is_success());
        assert!(!ResponseKey::Default.is_success());
    }

    #[test]
    fn test_response_key_deserializes_from_yaml_integer() {
        let keys: Vec<ResponseKey> = serde_yaml::from_str("[200, '5XX', default]").unwrap();
        assert_eq!(
            keys,
            vec![ResponseKey::Status(200), ResponseKey::Class(5), ResponseKey::Default]
        );
    }
}
