use super::schema::Schema;
use super::ResponseKey;
use crate::response_merger::ResponseMerger;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// OpenAPI Media Type object. Keyed by MIME type in its owning content map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub schema: Schema,
}

impl Content {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }
}

/// OpenAPI Response object.
///
/// The key is implied by the response's position in the `responses` map and is never written.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    key: ResponseKey,
    description: Option<String>,
    content: IndexMap<String, Content>,
}

/// Wire form of a response, as found in a partial document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, Content>,
}

impl Response {
    pub fn new(key: ResponseKey) -> Self {
        Self {
            key,
            description: None,
            content: IndexMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds content for a MIME type, replacing any content already stored under it.
    pub fn with_content(mut self, mime_type: &str, schema: Schema) -> Self {
        self.push_content(mime_type, Content::new(schema));
        self
    }

    pub fn push_content(&mut self, mime_type: &str, content: Content) {
        self.content.insert(mime_type.to_string(), content);
    }

    pub fn from_object(key: ResponseKey, object: ResponseObject) -> Self {
        Self {
            key,
            description: object.description,
            content: object.content,
        }
    }

    pub fn key(&self) -> ResponseKey {
        self.key
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn content(&self) -> &IndexMap<String, Content> {
        &self.content
    }

    pub fn content_by_mime_type(&self, mime_type: &str) -> Option<&Content> {
        self.content.get(mime_type)
    }

    pub fn is_success(&self) -> bool {
        self.key.is_success()
    }

    /// Folds `incoming` into this response. See [`ResponseMerger::merge`].
    pub fn merge(self, incoming: Response) -> Response {
        ResponseMerger::merge(self, incoming)
    }

    pub(crate) fn into_parts(self) -> (ResponseKey, Option<String>, IndexMap<String, Content>) {
        (self.key, self.description, self.content)
    }

    pub(crate) fn from_parts(
        key: ResponseKey,
        description: Option<String>,
        content: IndexMap<String, Content>,
    ) -> Self {
        Self {
            key,
            description,
            content,
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = usize::from(self.description.is_some()) + usize::from(!self.content.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if !self.content.is_empty() {
            map.serialize_entry("content", &self.content)?;
        }
        map.end()
    }
}
