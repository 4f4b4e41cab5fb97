use super::response::Content;
use super::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// OpenAPI Request Body object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, Content>,
    /// Suppresses inference of the body from the resource's entity schema.
    #[serde(skip)]
    pub ignore_base_schema: bool,
}

impl RequestBody {
    pub fn new(required: bool) -> Self {
        Self {
            description: None,
            required,
            content: IndexMap::new(),
            ignore_base_schema: false,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Sets the same schema for every MIME type, replacing existing entries.
    pub fn with_schema_for<'a, I>(mut self, mime_types: I, schema: &Schema) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        for mime_type in mime_types {
            self.content
                .insert(mime_type.clone(), Content::new(schema.clone()));
        }
        self
    }

    pub fn content_by_mime_type(&self, mime_type: &str) -> Option<&Content> {
        self.content.get(mime_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_ignore_flag_is_not_serialized() {
        let mut body = RequestBody::new(true)
            .with_schema_for(&["application/json".to_string()], &Schema::component("Pet"));
        body.ignore_base_schema = true;

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "required": true,
                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
            })
        );
    }
}
