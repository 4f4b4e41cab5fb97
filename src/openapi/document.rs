use super::operation::{Operation, OperationObject};
use super::schema::{Schema, COMPONENT_SCHEMA_PREFIX};
use super::HttpMethod;
use crate::error::ConfigurationError;
use anyhow::Context;
use indexmap::IndexMap;
use log::debug;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.0";

/// Path item keys that are not operations. They are accepted in partial documents and ignored.
const PATH_ITEM_FIELDS: [&str; 5] = ["summary", "description", "parameters", "servers", "$ref"];

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, serde_json::Value>,
}

/// All operations of one path, keyed by verb in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    pub fn get(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    pub fn get_mut(&mut self, method: HttpMethod) -> Option<&mut Operation> {
        self.operations.get_mut(&method)
    }

    pub fn contains(&self, method: HttpMethod) -> bool {
        self.operations.contains_key(&method)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    fn insert(&mut self, operation: Operation) {
        self.operations.insert(operation.http_method(), operation);
    }
}

impl Serialize for PathItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.operations.len()))?;
        for (method, operation) in &self.operations {
            map.serialize_entry(method.as_str(), operation)?;
        }
        map.end()
    }
}

/// The assembled OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
}

impl Document {
    pub fn new(info: Info) -> Self {
        Self {
            openapi: DEFAULT_OPENAPI_VERSION.to_string(),
            info,
            servers: Vec::new(),
            paths: IndexMap::new(),
            components: Components::default(),
        }
    }

    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(method))
    }

    pub fn operation_mut(&mut self, path: &str, method: HttpMethod) -> Option<&mut Operation> {
        self.paths.get_mut(path).and_then(|item| item.get_mut(method))
    }

    pub fn contains_operation(&self, path: &str, method: HttpMethod) -> bool {
        self.operation(path, method).is_some()
    }

    /// Places an operation at `path`, replacing one with the same verb.
    pub fn insert_operation(&mut self, path: &str, operation: Operation) {
        self.paths
            .entry(path.to_string())
            .or_default()
            .insert(operation);
    }

    /// Every operation with its path, in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &Operation)> {
        self.paths
            .iter()
            .flat_map(|(path, item)| item.operations().map(move |op| (path.as_str(), op)))
    }

    /// Checks that every `$ref` points at a schema present in `components.schemas`.
    pub fn validate_references(&self) -> Result<(), ConfigurationError> {
        for (name, schema) in &self.components.schemas {
            self.check_schema(schema, || format!("components.schemas.{}", name))?;
        }

        for (path, operation) in self.operations() {
            let method = operation.http_method().as_str();
            for parameter in operation.parameters() {
                self.check_schema(&parameter.schema, || {
                    format!("{} {} parameter `{}`", method, path, parameter.name)
                })?;
            }
            if let Some(body) = operation.request_body() {
                for (mime_type, content) in &body.content {
                    self.check_schema(&content.schema, || {
                        format!("{} {} request body {}", method, path, mime_type)
                    })?;
                }
            }
            for (key, response) in operation.responses() {
                for (mime_type, content) in response.content() {
                    self.check_schema(&content.schema, || {
                        format!("{} {} response {} {}", method, path, key, mime_type)
                    })?;
                }
            }
        }
        Ok(())
    }

    fn check_schema(
        &self,
        schema: &Schema,
        context: impl Fn() -> String,
    ) -> Result<(), ConfigurationError> {
        let mut references = Vec::new();
        schema.collect_references(&mut references);
        for reference in references {
            let resolved = reference
                .strip_prefix(COMPONENT_SCHEMA_PREFIX)
                .is_some_and(|name| self.components.schemas.contains_key(name));
            if !resolved {
                return Err(ConfigurationError::UnresolvedReference {
                    reference: reference.to_string(),
                    context: context(),
                });
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let partial = PartialDocument::deserialize(deserializer)?;
        Document::try_from(partial).map_err(de::Error::custom)
    }
}

/// A hand-written document fragment.
///
/// Operation fields stay optional so merging can tell which ones the author supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialDocument {
    #[serde(default)]
    pub openapi: Option<String>,
    #[serde(default)]
    pub info: Option<Info>,
    #[serde(default)]
    pub servers: Option<Vec<Server>>,
    #[serde(default)]
    pub paths: IndexMap<String, PartialPathItem>,
    #[serde(default)]
    pub components: Option<Components>,
}

/// Operations of one path in a partial document, keyed by the verb as written.
#[derive(Debug, Clone, Default)]
pub struct PartialPathItem {
    pub operations: IndexMap<String, OperationObject>,
}

impl PartialDocument {
    /// Reads a partial document. `.yml`/`.yaml` files are parsed as YAML, anything else as JSON.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading partial document: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read partial document: {}", path.display()))?;
        Self::parse(&content, is_yaml(path))
            .with_context(|| format!("Failed to parse partial document: {}", path.display()))
    }

    pub fn parse(content: &str, yaml: bool) -> anyhow::Result<Self> {
        let document = if yaml {
            serde_yaml::from_str(content)?
        } else {
            serde_json::from_str(content)?
        };
        Ok(document)
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

impl TryFrom<PartialDocument> for Document {
    type Error = ConfigurationError;

    fn try_from(partial: PartialDocument) -> Result<Self, Self::Error> {
        let info = partial.info.unwrap_or(Info {
            title: String::new(),
            version: String::new(),
            description: None,
        });
        let mut document = Document::new(info);
        if let Some(openapi) = partial.openapi {
            document.openapi = openapi;
        }
        document.servers = partial.servers.unwrap_or_default();
        document.components = partial.components.unwrap_or_default();

        for (path, item) in partial.paths {
            for (verb, object) in item.operations {
                let operation = Operation::from_object(verb.parse()?, object)?;
                document.insert_operation(&path, operation);
            }
        }
        Ok(document)
    }
}

impl<'de> Deserialize<'de> for PartialPathItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathItemVisitor;

        impl<'de> Visitor<'de> for PathItemVisitor {
            type Value = PartialPathItem;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a path item object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PartialPathItem, A::Error> {
                let mut operations = IndexMap::new();
                while let Some(key) = map.next_key::<String>()? {
                    if PATH_ITEM_FIELDS.contains(&key.as_str()) || key.starts_with("x-") {
                        map.next_value::<IgnoredAny>()?;
                        continue;
                    }
                    let operation = map.next_value::<OperationObject>()?;
                    operations.insert(key, operation);
                }
                Ok(PartialPathItem { operations })
            }
        }

        deserializer.deserialize_map(PathItemVisitor)
    }
}
