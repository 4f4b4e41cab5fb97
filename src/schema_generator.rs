use crate::annotation::FieldDirective;
use crate::openapi::{InlineSchema, Schema};
use crate::route::{EntityModel, EntityRegistry};
use indexmap::IndexMap;
use log::debug;

/// Schema generator - converts entity models and declared field types to OpenAPI schemas
pub struct SchemaGenerator<'a> {
    entities: &'a EntityRegistry,
}

/// Scalar types understood by the generator, from Rust source or from entity column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Int32,
    Int64,
    Float,
    Double,
    Number,
    Bool,
    Date,
    DateTime,
    Uuid,
    Binary,
    Object,
}

impl PrimitiveType {
    /// Parse a Rust primitive or a database column type name
    pub fn parse(type_name: &str) -> Option<Self> {
        let lowered = type_name.to_ascii_lowercase();
        let primitive = match lowered.as_str() {
            "string" | "str" | "&str" | "char" | "text" | "time" => PrimitiveType::String,
            "i8" | "i16" | "i32" | "u8" | "u16" | "u32" | "integer" | "int" | "tinyinteger"
            | "smallinteger" => PrimitiveType::Int32,
            "i64" | "i128" | "u64" | "u128" | "isize" | "usize" | "biginteger" => {
                PrimitiveType::Int64
            }
            "f32" | "float" => PrimitiveType::Float,
            "f64" | "double" => PrimitiveType::Double,
            "number" | "decimal" => PrimitiveType::Number,
            "bool" | "boolean" => PrimitiveType::Bool,
            "date" => PrimitiveType::Date,
            "datetime" | "datetimefractional" | "timestamp" | "timestampfractional" => {
                PrimitiveType::DateTime
            }
            "uuid" => PrimitiveType::Uuid,
            "binary" | "blob" => PrimitiveType::Binary,
            "object" | "json" => PrimitiveType::Object,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn to_schema(self) -> Schema {
        let (schema_type, format) = match self {
            PrimitiveType::String => ("string", None),
            PrimitiveType::Int32 => ("integer", Some("int32")),
            PrimitiveType::Int64 => ("integer", Some("int64")),
            PrimitiveType::Float => ("number", Some("float")),
            PrimitiveType::Double => ("number", Some("double")),
            PrimitiveType::Number => ("number", None),
            PrimitiveType::Bool => ("boolean", None),
            PrimitiveType::Date => ("string", Some("date")),
            PrimitiveType::DateTime => ("string", Some("date-time")),
            PrimitiveType::Uuid => ("string", Some("uuid")),
            PrimitiveType::Binary => ("string", Some("binary")),
            PrimitiveType::Object => ("object", None),
        };
        match format {
            Some(format) => Schema::with_format(schema_type, format),
            None => Schema::of_type(schema_type),
        }
    }
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(entities: &'a EntityRegistry) -> Self {
        Self { entities }
    }

    /// Generate component schemas for every known entity, in registry order
    pub fn generate_components(&self) -> IndexMap<String, Schema> {
        self.entities
            .iter()
            .map(|entity| (entity.name.clone(), Self::entity_schema(entity)))
            .collect()
    }

    /// Object schema with one property per column
    pub fn entity_schema(entity: &EntityModel) -> Schema {
        debug!("Generating entity schema for: {}", entity.name);

        let mut inline = InlineSchema {
            title: Some(entity.name.clone()),
            schema_type: Some("object".to_string()),
            ..InlineSchema::default()
        };
        for column in &entity.columns {
            let mut property = Self::type_schema(&column.column_type)
                .with_description(column.description.clone());
            if column.nullable {
                if let Schema::Inline(inline) = &mut property {
                    inline.nullable = Some(true);
                }
            }
            inline.properties.insert(column.name.clone(), property);
        }
        Schema::Inline(Box::new(inline))
    }

    /// Names the client must supply when writing `entity`
    pub fn required_fields(entity: &EntityModel) -> Vec<String> {
        entity.required_columns().map(|c| c.name.clone()).collect()
    }

    /// Whether an entity with this name is known
    pub fn is_entity(&self, name: &str) -> bool {
        self.entities.get(name).is_some()
    }

    pub fn entity(&self, name: &str) -> Option<&'a EntityModel> {
        self.entities.get(name)
    }

    /// Schema for a declared type name.
    ///
    /// `Option<T>` unwraps to `T`, `Vec<T>` and `T[]` become arrays, known primitives map to
    /// their type and format. Anything else is an untyped object.
    pub fn type_schema(type_name: &str) -> Schema {
        let type_name = type_name.trim();

        if let Some(inner) = generic_argument(type_name, "Option") {
            return Self::type_schema(inner);
        }
        if let Some(inner) = generic_argument(type_name, "Vec") {
            return Schema::array(Self::type_schema(inner));
        }
        if let Some(inner) = type_name.strip_suffix("[]") {
            return Schema::array(Self::type_schema(inner));
        }
        if type_name.eq_ignore_ascii_case("array") {
            return Schema::array(Schema::of_type("string"));
        }

        match PrimitiveType::parse(type_name) {
            Some(primitive) => primitive.to_schema(),
            None => {
                debug!("Unknown type: {}, using object placeholder", type_name);
                Schema::object()
            }
        }
    }

    /// Schema for one form or DTO field. An explicit format replaces the inferred one.
    pub fn field_schema(field: &FieldDirective) -> Schema {
        let mut schema =
            Self::type_schema(&field.field_type).with_description(field.description.clone());
        if let (Some(format), Schema::Inline(inline)) = (&field.format, &mut schema) {
            inline.format = Some(format.clone());
        }
        schema
    }

    /// Object schema with one property per field, `required` from the fields marked required
    pub fn fields_schema(fields: &[FieldDirective]) -> Schema {
        fields.iter().fold(Schema::object(), |schema, field| {
            schema.with_property(&field.name, Self::field_schema(field), field.required)
        })
    }

    /// Default exception schema: `{code: integer, message: string}`
    pub fn exception_schema() -> Schema {
        Schema::object()
            .with_property("code", Schema::with_format("integer", "int32"), false)
            .with_property("message", Schema::of_type("string"), false)
    }
}

fn generic_argument<'t>(type_name: &'t str, wrapper: &str) -> Option<&'t str> {
    type_name
        .strip_prefix(wrapper)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Column;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn column(name: &str, column_type: &str, nullable: bool, primary_key: bool) -> Column {
        Column {
            name: name.to_string(),
            column_type: column_type.to_string(),
            nullable,
            primary_key,
            description: None,
        }
    }

    fn employee() -> EntityModel {
        EntityModel {
            name: "Employee".to_string(),
            columns: vec![
                column("id", "integer", false, true),
                column("first_name", "string", false, false),
                column("birth_date", "date", true, false),
            ],
        }
    }

    #[test]
    fn test_primitive_types() {
        let cases = vec![
            ("String", json!({"type": "string"})),
            ("i32", json!({"type": "integer", "format": "int32"})),
            ("u64", json!({"type": "integer", "format": "int64"})),
            ("f32", json!({"type": "number", "format": "float"})),
            ("f64", json!({"type": "number", "format": "double"})),
            ("bool", json!({"type": "boolean"})),
            ("biginteger", json!({"type": "integer", "format": "int64"})),
            ("datetime", json!({"type": "string", "format": "date-time"})),
            ("uuid", json!({"type": "string", "format": "uuid"})),
        ];
        for (type_name, expected) in cases {
            assert_eq!(
                serde_json::to_value(SchemaGenerator::type_schema(type_name)).unwrap(),
                expected,
                "type {}",
                type_name
            );
        }
    }

    #[test]
    fn test_option_and_vec() {
        assert_eq!(
            SchemaGenerator::type_schema("Option<i64>"),
            SchemaGenerator::type_schema("i64")
        );
        assert_eq!(
            serde_json::to_value(SchemaGenerator::type_schema("Vec<String>")).unwrap(),
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            serde_json::to_value(SchemaGenerator::type_schema("integer[]")).unwrap(),
            json!({"type": "array", "items": {"type": "integer", "format": "int32"}})
        );
    }

    #[test]
    fn test_unknown_type_is_object() {
        assert_eq!(SchemaGenerator::type_schema("Mystery"), Schema::object());
    }

    #[test]
    fn test_entity_schema() {
        assert_eq!(
            serde_json::to_value(SchemaGenerator::entity_schema(&employee())).unwrap(),
            json!({
                "title": "Employee",
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "format": "int32"},
                    "first_name": {"type": "string"},
                    "birth_date": {"type": "string", "format": "date", "nullable": true}
                }
            })
        );
        assert_eq!(SchemaGenerator::required_fields(&employee()), vec!["first_name"]);
    }

    #[test]
    fn test_generate_components_in_registry_order() {
        let registry = EntityRegistry::new(vec![
            employee(),
            EntityModel {
                name: "Department".to_string(),
                columns: vec![],
            },
        ]);
        let generator = SchemaGenerator::new(&registry);
        let names: Vec<String> = generator.generate_components().into_keys().collect();
        assert_eq!(names, vec!["Employee", "Department"]);
        assert!(generator.is_entity("Department"));
        assert!(!generator.is_entity("Salary"));
    }

    #[test]
    fn test_fields_schema() {
        let mut email = FieldDirective::new("email", "string", true);
        email.format = Some("email".to_string());
        let fields = vec![email, FieldDirective::new("age", "integer", false)];

        assert_eq!(
            serde_json::to_value(SchemaGenerator::fields_schema(&fields)).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "email": {"type": "string", "format": "email"},
                    "age": {"type": "integer", "format": "int32"}
                },
                "required": ["email"]
            })
        );
    }
}
