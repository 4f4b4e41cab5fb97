use super::schema::Schema;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        })
    }
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    pub schema: Schema,
}

impl Parameter {
    pub fn new(
        name: &str,
        location: ParameterLocation,
        schema: Schema,
        required: bool,
    ) -> Result<Self, ConfigurationError> {
        if name.trim().is_empty() {
            return Err(ConfigurationError::EmptyParameterName);
        }
        Ok(Self {
            name: name.to_string(),
            location,
            description: None,
            // path parameters are always required
            required: required || location == ParameterLocation::Path,
            deprecated: false,
            schema,
        })
    }

    /// A path parameter typed by naming convention: `id`, `*_id` and `*Id` are 64-bit integers,
    /// everything else is a string.
    pub fn path(name: &str) -> Result<Self, ConfigurationError> {
        Self::new(name, ParameterLocation::Path, conventional_schema(name), true)
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Identity used for uniqueness within one operation.
    pub fn identity(&self) -> (&str, ParameterLocation) {
        (&self.name, self.location)
    }
}

fn conventional_schema(name: &str) -> Schema {
    let is_id = name.eq_ignore_ascii_case("id") || name.ends_with("_id") || name.ends_with("Id");
    if is_id {
        Schema::with_format("integer", "int64")
    } else {
        Schema::of_type("string")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_path_parameter_id_is_int64() {
        let param = Parameter::path("id").unwrap();
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({
                "name": "id",
                "in": "path",
                "required": true,
                "schema": {"type": "integer", "format": "int64"}
            })
        );
    }

    #[test]
    fn test_path_parameter_naming_convention() {
        for name in ["department_id", "employeeId", "ID"] {
            let param = Parameter::path(name).unwrap();
            assert_eq!(param.schema, Schema::with_format("integer", "int64"), "{}", name);
        }
        for name in ["slug", "paid", "identity"] {
            let param = Parameter::path(name).unwrap();
            assert_eq!(param.schema, Schema::of_type("string"), "{}", name);
        }
    }

    #[test]
    fn test_path_parameters_are_always_required() {
        let param =
            Parameter::new("slug", ParameterLocation::Path, Schema::of_type("string"), false)
                .unwrap();
        assert!(param.required);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(
            Parameter::new(" ", ParameterLocation::Query, Schema::of_type("string"), false),
            Err(ConfigurationError::EmptyParameterName)
        );
    }
}
