use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix every resolvable schema reference carries.
pub const COMPONENT_SCHEMA_PREFIX: &str = "#/components/schemas/";

/// OpenAPI Schema object: either a reference to a component schema or an inline definition.
///
/// The two shapes are mutually exclusive. A `$ref` object never carries inline fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schema {
    Reference(SchemaReference),
    Inline(Box<InlineSchema>),
}

/// `{"$ref": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReference {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// Inline schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl Schema {
    /// Reference to `#/components/schemas/{name}`.
    pub fn component(name: &str) -> Self {
        Schema::Reference(SchemaReference {
            reference: format!("{}{}", COMPONENT_SCHEMA_PREFIX, name),
        })
    }

    /// Reference taken verbatim. A bare name (no `#`) is expanded to a component reference.
    pub fn reference(raw: &str) -> Self {
        if raw.starts_with('#') {
            Schema::Reference(SchemaReference {
                reference: raw.to_string(),
            })
        } else {
            Schema::component(raw)
        }
    }

    pub fn of_type(schema_type: &str) -> Self {
        Schema::Inline(Box::new(InlineSchema {
            schema_type: Some(schema_type.to_string()),
            ..InlineSchema::default()
        }))
    }

    pub fn with_format(schema_type: &str, format: &str) -> Self {
        Schema::Inline(Box::new(InlineSchema {
            schema_type: Some(schema_type.to_string()),
            format: Some(format.to_string()),
            ..InlineSchema::default()
        }))
    }

    pub fn array(items: Schema) -> Self {
        Schema::Inline(Box::new(InlineSchema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..InlineSchema::default()
        }))
    }

    pub fn object() -> Self {
        Schema::of_type("object")
    }

    pub fn all_of(parts: Vec<Schema>) -> Self {
        Schema::Inline(Box::new(InlineSchema {
            all_of: parts,
            ..InlineSchema::default()
        }))
    }

    /// Adds a property to an inline schema, optionally marking it required.
    ///
    /// References are returned unchanged: they cannot carry inline fields.
    pub fn with_property(mut self, name: &str, schema: Schema, required: bool) -> Self {
        if let Schema::Inline(inline) = &mut self {
            inline.properties.insert(name.to_string(), schema);
            if required {
                inline.push_required(name);
            }
        }
        self
    }

    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Schema::Inline(inline) = &mut self {
            for name in names {
                inline.push_required(name.as_ref());
            }
        }
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        if let Schema::Inline(inline) = &mut self {
            inline.description = description;
        }
        self
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Schema::Reference(r) => Some(&r.reference),
            Schema::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&InlineSchema> {
        match self {
            Schema::Reference(_) => None,
            Schema::Inline(inline) => Some(inline),
        }
    }

    /// Name of the component schema this references, if it is a component reference.
    pub fn component_name(&self) -> Option<&str> {
        self.as_reference()
            .and_then(|r| r.strip_prefix(COMPONENT_SCHEMA_PREFIX))
    }

    /// Collects every `$ref` reachable from this schema, depth first.
    pub fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Schema::Reference(r) => out.push(&r.reference),
            Schema::Inline(inline) => {
                for property in inline.properties.values() {
                    property.collect_references(out);
                }
                if let Some(items) = &inline.items {
                    items.collect_references(out);
                }
                for part in &inline.all_of {
                    part.collect_references(out);
                }
            }
        }
    }
}

impl InlineSchema {
    fn push_required(&mut self, name: &str) {
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_component_reference_serialization() {
        let schema = Schema::component("Employee");
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"$ref": "#/components/schemas/Employee"})
        );
        assert_eq!(schema.component_name(), Some("Employee"));
    }

    #[test]
    fn test_reference_expands_bare_names() {
        assert_eq!(Schema::reference("Pet"), Schema::component("Pet"));
        assert_eq!(
            Schema::reference("#/components/schemas/Pet").as_reference(),
            Some("#/components/schemas/Pet")
        );
    }

    #[test]
    fn test_array_of_entity() {
        let schema = Schema::array(Schema::component("Employee"));
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "array", "items": {"$ref": "#/components/schemas/Employee"}})
        );
    }

    #[test]
    fn test_object_properties_keep_insertion_order() {
        let schema = Schema::object()
            .with_property("last_name", Schema::of_type("string"), true)
            .with_property("first_name", Schema::of_type("string"), true)
            .with_property("age", Schema::with_format("integer", "int32"), false);

        let json = serde_json::to_string(&schema).unwrap();
        let last = json.find("last_name").unwrap();
        let first = json.find("first_name").unwrap();
        let age = json.find("age").unwrap();
        assert!(last < first && first < age);

        let inline = schema.as_inline().unwrap();
        assert_eq!(inline.required, vec!["last_name", "first_name"]);
    }

    #[test]
    fn test_required_has_no_duplicates() {
        let schema = Schema::object()
            .with_property("name", Schema::of_type("string"), true)
            .with_required(["name", "name", "email"]);
        assert_eq!(schema.as_inline().unwrap().required, vec!["name", "email"]);
    }

    #[test]
    fn test_reference_ignores_inline_builders() {
        let schema = Schema::component("Pet").with_property("x", Schema::object(), true);
        assert_eq!(schema, Schema::component("Pet"));
    }

    #[test]
    fn test_deserialize_reference_or_inline() {
        let reference: Schema =
            serde_json::from_value(json!({"$ref": "#/components/schemas/Pet"})).unwrap();
        assert!(matches!(reference, Schema::Reference(_)));

        let inline: Schema = serde_json::from_value(json!({
            "type": "object",
            "properties": {"id": {"type": "integer", "format": "int64"}},
            "required": ["id"]
        }))
        .unwrap();
        let inline = inline.as_inline().unwrap();
        assert_eq!(inline.schema_type.as_deref(), Some("object"));
        assert_eq!(inline.required, vec!["id"]);
    }

    #[test]
    fn test_collect_references_walks_nested_schemas() {
        let schema = Schema::all_of(vec![
            Schema::component("Employee"),
            Schema::object().with_property("manager", Schema::component("Manager"), false),
        ])
        .with_property("tags", Schema::array(Schema::component("Tag")), false);

        let mut refs = Vec::new();
        schema.collect_references(&mut refs);
        assert_eq!(
            refs,
            vec![
                "#/components/schemas/Tag",
                "#/components/schemas/Employee",
                "#/components/schemas/Manager",
            ]
        );
    }
}
