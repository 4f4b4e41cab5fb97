//! Route records and the route source boundary.
//!
//! Routes are produced by the host application's routing layer. This crate only consumes them,
//! either through a [`RouteSource`] implementation or by loading a [`RouteManifest`] file.

use crate::annotation::{AnnotationRecord, AnnotationRegistry};
use crate::openapi::document::is_yaml;
use anyhow::Context;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Yields the application's routes in a stable order.
pub trait RouteSource {
    fn routes(&self) -> Vec<RouteRecord>;
}

/// Identity of the code that handles a route: `[Namespace/]Controller::action`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HandlerId {
    pub namespace: Option<String>,
    pub controller: String,
    pub action: String,
}

impl HandlerId {
    pub fn new(controller: &str, action: &str) -> Self {
        Self {
            namespace: None,
            controller: controller.to_string(),
            action: action.to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|n| !n.is_empty());
        self
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{}/", namespace)?;
        }
        write!(f, "{}::{}", self.controller, self.action)
    }
}

impl FromStr for HandlerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (qualified, action) = s
            .rsplit_once("::")
            .ok_or_else(|| format!("handler `{}` must look like Controller::action", s))?;
        let (namespace, controller) = match qualified.rsplit_once('/') {
            Some((namespace, controller)) => (Some(namespace.to_string()), controller),
            None => (None, qualified),
        };
        if controller.is_empty() || action.is_empty() {
            return Err(format!("handler `{}` must look like Controller::action", s));
        }
        Ok(HandlerId::new(controller, action).with_namespace(namespace))
    }
}

impl TryFrom<String> for HandlerId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HandlerId> for String {
    fn from(id: HandlerId) -> Self {
        id.to_string()
    }
}

/// One route as reported by the routing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Route name, e.g. `employees:index`. Defaults to `{controller}:{action}`.
    #[serde(default)]
    pub name: Option<String>,
    /// Path template in routing syntax, e.g. `/employees/:id`.
    pub template: String,
    /// Declared HTTP verbs in declaration order.
    #[serde(default)]
    pub methods: Vec<String>,
    pub handler: HandlerId,
    /// Routing prefix, e.g. `Admin` for controllers under an admin namespace.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    /// Plugin the controller lives in.
    pub plugin: Option<String>,
    /// Resource the route belongs to. Defaults to the handler's controller.
    #[serde(default)]
    pub resource: Option<String>,
    /// Base entity of the resource. Defaults to the singular of the resource name.
    #[serde(default)]
    pub entity: Option<String>,
}

impl RouteRecord {
    pub fn new(template: &str, methods: &[&str], handler: HandlerId) -> Self {
        Self {
            name: None,
            template: template.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            handler,
            prefix: None,
            plugin: None,
            resource: None,
            entity: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            format!(
                "{}:{}",
                underscore(&self.handler.controller),
                self.handler.action
            )
        })
    }

    /// The handler with its namespace resolved. An explicit namespace on the handler wins,
    /// otherwise it is `plugin/prefix` with either part optional.
    pub fn handler_id(&self) -> HandlerId {
        if self.handler.namespace.is_some() {
            return self.handler.clone();
        }
        let parts: Vec<&str> = [self.plugin.as_deref(), self.prefix.as_deref()]
            .into_iter()
            .flatten()
            .map(|part| part.trim_matches('/'))
            .filter(|part| !part.is_empty())
            .collect();
        let namespace = (!parts.is_empty()).then(|| parts.join("/"));
        self.handler.clone().with_namespace(namespace)
    }

    /// Whether the route answers `verb` (case-insensitive).
    pub fn declares(&self, verb: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(verb))
    }

    pub fn action(&self) -> &str {
        &self.handler.action
    }

    pub fn resource(&self) -> &str {
        self.resource
            .as_deref()
            .unwrap_or(&self.handler.controller)
    }

    pub fn entity_name(&self) -> String {
        self.entity
            .clone()
            .unwrap_or_else(|| singularize(&camelize(self.resource())))
    }

    /// Tag every operation of this route carries first.
    pub fn default_tag(&self) -> String {
        humanize(self.resource())
    }
}

/// A column of an entity's backing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// The base entity behind a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityModel {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl EntityModel {
    /// Columns a client must supply when writing the entity.
    pub fn required_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| !c.nullable && !c.primary_key)
    }
}

/// Entities known to the build, by name.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: IndexMap<String, EntityModel>,
}

impl EntityRegistry {
    pub fn new(entities: Vec<EntityModel>) -> Self {
        Self {
            entities: entities.into_iter().map(|e| (e.name.clone(), e)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityModel> {
        self.entities.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityModel> {
        self.entities.values()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// File form of everything the routing and model layers export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteManifest {
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
    #[serde(default)]
    pub entities: Vec<EntityModel>,
    #[serde(default)]
    pub annotations: IndexMap<HandlerId, AnnotationRecord>,
    /// Handlers that exist. When absent every handler is assumed to exist.
    #[serde(default)]
    pub handlers: Option<Vec<HandlerId>>,
}

impl RouteManifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading route manifest: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read route manifest: {}", path.display()))?;
        Self::parse(&content, is_yaml(path))
            .with_context(|| format!("Failed to parse route manifest: {}", path.display()))
    }

    pub fn parse(content: &str, yaml: bool) -> anyhow::Result<Self> {
        let manifest = if yaml {
            serde_yaml::from_str(content)?
        } else {
            serde_json::from_str(content)?
        };
        Ok(manifest)
    }

    pub fn entity_registry(&self) -> EntityRegistry {
        EntityRegistry::new(self.entities.clone())
    }

    pub fn annotation_registry(&self) -> AnnotationRegistry {
        let known = self
            .handlers
            .as_ref()
            .map(|handlers| handlers.iter().cloned().collect::<HashSet<_>>());
        AnnotationRegistry::new(self.annotations.clone(), known)
    }
}

impl RouteSource for RouteManifest {
    fn routes(&self) -> Vec<RouteRecord> {
        self.routes.clone()
    }
}

/// `employee_salaries` / `employee-salaries` -> `EmployeeSalaries`
pub fn camelize(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `EmployeeSalaries` -> `employee_salaries`
pub fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// `EmployeeSalaries` -> `Employee Salaries`
pub fn humanize(name: &str) -> String {
    underscore(name)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| camelize(part))
        .collect::<Vec<_>>()
        .join(" ")
}

/// English singular of the last word: `Categories` -> `Category`, `Addresses` -> `Address`,
/// `Employees` -> `Employee`.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_handler_id_round_trip() {
        let id: HandlerId = "Admin/Employees::index".parse().unwrap();
        assert_eq!(id.namespace.as_deref(), Some("Admin"));
        assert_eq!(id.controller, "Employees");
        assert_eq!(id.action, "index");
        assert_eq!(id.to_string(), "Admin/Employees::index");

        let id: HandlerId = "Employees::view".parse().unwrap();
        assert_eq!(id, HandlerId::new("Employees", "view"));
    }

    #[test]
    fn test_handler_id_rejects_malformed() {
        assert!("Employees".parse::<HandlerId>().is_err());
        assert!("::index".parse::<HandlerId>().is_err());
        assert!("Employees::".parse::<HandlerId>().is_err());
    }

    #[test]
    fn test_handler_namespace_from_plugin_and_prefix() {
        let mut route = RouteRecord::new("/admin/employees", &["GET"], HandlerId::new("Employees", "index"));
        assert_eq!(route.handler_id(), HandlerId::new("Employees", "index"));

        route.prefix = Some("Admin".to_string());
        assert_eq!(route.handler_id().to_string(), "Admin/Employees::index");

        route.plugin = Some("Hr".to_string());
        assert_eq!(route.handler_id().to_string(), "Hr/Admin/Employees::index");

        route.prefix = Some("/".to_string());
        assert_eq!(route.handler_id().to_string(), "Hr/Employees::index");

        route.handler = "Payroll/Employees::index".parse().unwrap();
        assert_eq!(route.handler_id().to_string(), "Payroll/Employees::index");
    }

    #[test]
    fn test_route_defaults() {
        let route = RouteRecord::new(
            "/employee-salaries",
            &["GET"],
            HandlerId::new("EmployeeSalaries", "index"),
        );
        assert_eq!(route.name(), "employee_salaries:index");
        assert_eq!(route.resource(), "EmployeeSalaries");
        assert_eq!(route.entity_name(), "EmployeeSalary");
        assert_eq!(route.default_tag(), "Employee Salaries");
        assert!(route.declares("get"));
        assert!(!route.declares("POST"));
    }

    #[test]
    fn test_explicit_route_metadata_wins() {
        let mut route =
            RouteRecord::new("/people", &["GET"], HandlerId::new("People", "index"))
                .with_name("people:index");
        route.entity = Some("Person".to_string());
        assert_eq!(route.name(), "people:index");
        assert_eq!(route.entity_name(), "Person");
    }

    #[test]
    fn test_inflection_helpers() {
        assert_eq!(camelize("employee_salaries"), "EmployeeSalaries");
        assert_eq!(camelize("department-employees"), "DepartmentEmployees");
        assert_eq!(underscore("DepartmentEmployees"), "department_employees");
        assert_eq!(humanize("employees"), "Employees");
        assert_eq!(singularize("Categories"), "Category");
        assert_eq!(singularize("Addresses"), "Address");
        assert_eq!(singularize("Boxes"), "Box");
        assert_eq!(singularize("Status"), "Status");
        assert_eq!(singularize("Employees"), "Employee");
    }

    #[test]
    fn test_required_columns_skip_nullable_and_primary_key() {
        let entity = EntityModel {
            name: "Employee".to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    column_type: "integer".to_string(),
                    nullable: false,
                    primary_key: true,
                    description: None,
                },
                Column {
                    name: "first_name".to_string(),
                    column_type: "string".to_string(),
                    nullable: false,
                    primary_key: false,
                    description: None,
                },
                Column {
                    name: "nickname".to_string(),
                    column_type: "string".to_string(),
                    nullable: true,
                    primary_key: false,
                    description: None,
                },
            ],
        };
        let names: Vec<&str> = entity.required_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first_name"]);
    }

    #[test]
    fn test_manifest_parse_yaml() {
        let yaml = r#"
routes:
  - name: employees:index
    template: /employees
    methods: [GET]
    handler: Employees::index
entities:
  - name: Employee
    columns:
      - {name: id, type: integer, primary_key: true}
annotations:
  Employees::index:
    tags: [CustomTag]
"#;
        let manifest = RouteManifest::parse(yaml, true).unwrap();
        assert_eq!(manifest.routes().len(), 1);
        assert_eq!(manifest.routes[0].handler, HandlerId::new("Employees", "index"));
        assert!(manifest.entity_registry().get("Employee").is_some());
        assert_eq!(
            manifest.annotations[&HandlerId::new("Employees", "index")].tags,
            vec!["CustomTag"]
        );
        assert!(manifest.handlers.is_none());
    }
}
