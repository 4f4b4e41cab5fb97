//! Annotation extraction from controller source files.
//!
//! Handlers are found in two shapes:
//!
//! - free functions in a controller file: the controller name is the file stem without a
//!   `_controller` suffix, camel-cased (`employee_salaries_controller.rs` -> `EmployeeSalaries`)
//! - methods of an `impl XController` block: the controller name is `X`
//!
//! The namespace is the camel-cased directory path relative to the scanned root. Doc comments
//! supply the summary, description and `@tag` lines; `openapi_*` attributes supply the
//! structured directives (see [`attributes`]).
//!
//! # Example
//!
//! ```no_run
//! use openapi_assemble::extractor::AnnotationExtractor;
//! use openapi_assemble::parser::AstParser;
//! use openapi_assemble::scanner::FileScanner;
//! use std::path::PathBuf;
//!
//! let scan = FileScanner::new(PathBuf::from("./src/controllers")).scan().unwrap();
//! let parsed: Vec<_> = AstParser::parse_files(&scan.sources)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//! let registry = AnnotationExtractor::extract(&parsed);
//! println!("Found {} annotated handlers", registry.len());
//! ```

pub mod attributes;

use crate::annotation::{AnnotationRecord, AnnotationRegistry, FieldDirective};
use crate::operation_builder::doc_block::DocBlock;
use crate::parser::ParsedFile;
use crate::route::{camelize, HandlerId};
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use syn::visit::Visit;
use syn::{Attribute, Expr, Lit, Meta, Visibility};

const CONTROLLER_FILE_SUFFIX: &str = "_controller";
const CONTROLLER_TYPE_SUFFIX: &str = "Controller";

pub struct AnnotationExtractor;

impl AnnotationExtractor {
    /// Extracts annotation records for every public handler in `parsed_files`.
    ///
    /// The returned registry knows exactly the handlers that were found, so routes pointing
    /// anywhere else resolve as unresolved.
    pub fn extract(parsed_files: &[ParsedFile]) -> AnnotationRegistry {
        let mut visitor = HandlerVisitor::default();

        for parsed_file in parsed_files {
            visitor.enter_file(parsed_file);
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        let HandlerVisitor {
            mut records,
            structs,
            ..
        } = visitor;

        // Resolve DTO fields once every file has been seen.
        for record in records.values_mut() {
            if let Some(dto) = record.dto.as_mut().filter(|dto| dto.fields.is_empty()) {
                match structs.get(&dto.name) {
                    Some(fields) => dto.fields = fields.clone(),
                    None => debug!("DTO {} not found in scanned sources", dto.name),
                }
            }
        }

        debug!("Extracted annotations for {} handlers", records.len());
        let known: HashSet<HandlerId> = records.keys().cloned().collect();
        AnnotationRegistry::new(records, Some(known))
    }
}

#[derive(Default)]
struct HandlerVisitor {
    namespace: Option<String>,
    file_controller: String,
    records: IndexMap<HandlerId, AnnotationRecord>,
    structs: HashMap<String, Vec<FieldDirective>>,
}

impl HandlerVisitor {
    fn enter_file(&mut self, parsed_file: &ParsedFile) {
        self.namespace = namespace_of(&parsed_file.relative);
        self.file_controller = controller_of_file(&parsed_file.relative);
        debug!(
            "Scanning {} (controller {}, namespace {:?})",
            parsed_file.path.display(),
            self.file_controller,
            self.namespace
        );
    }

    fn add_handler(&mut self, controller: &str, action: &str, attrs: &[Attribute]) {
        let handler = HandlerId::new(controller, action).with_namespace(self.namespace.clone());
        let record = annotation_record(attrs, &handler.to_string());
        debug!("Found handler {}", handler);
        self.records.insert(handler, record);
    }
}

impl<'ast> Visit<'ast> for HandlerVisitor {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        if is_public(&node.vis) && !self.file_controller.is_empty() {
            let controller = self.file_controller.clone();
            self.add_handler(&controller, &node.sig.ident.to_string(), &node.attrs);
        }
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        if node.trait_.is_some() {
            return;
        }
        let Some(controller) = controller_of_type(&node.self_ty) else {
            return;
        };
        for item in &node.items {
            if let syn::ImplItem::Fn(method) = item {
                if is_public(&method.vis) {
                    self.add_handler(&controller, &method.sig.ident.to_string(), &method.attrs);
                }
            }
        }
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        if let syn::Fields::Named(fields) = &node.fields {
            let fields = fields
                .named
                .iter()
                .filter_map(|field| {
                    let name = field.ident.as_ref()?.to_string();
                    let field_type = type_name(&field.ty);
                    let required = !field_type.starts_with("Option<");
                    let mut directive = FieldDirective::new(&name, &field_type, required);
                    directive.description = doc_text(&field.attrs)
                        .map(|doc| DocBlock::parse(&doc))
                        .and_then(|block| block.summary);
                    Some(directive)
                })
                .collect();
            self.structs.insert(node.ident.to_string(), fields);
        }
        syn::visit::visit_item_struct(self, node);
    }
}

fn annotation_record(attrs: &[Attribute], handler: &str) -> AnnotationRecord {
    let mut record = AnnotationRecord::default();

    if let Some(doc) = doc_text(attrs) {
        let block = DocBlock::parse(&doc);
        record.throws = block.throws();
        record.summary = block.summary;
        record.description = block.description;
        record.doc_tags = block
            .tags
            .into_iter()
            .filter(|tag| tag.name != "throws")
            .collect();
    }

    attributes::apply(attrs, &mut record, handler);
    record
}

/// Joined `///` lines, with the single leading space rustdoc adds removed.
fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(lit_str) => Some(lit_str.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').unwrap_or(&line).to_string())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

fn controller_of_type(ty: &syn::Type) -> Option<String> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let name = type_path.path.segments.last()?.ident.to_string();
    name.strip_suffix(CONTROLLER_TYPE_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// `admin/employees_controller.rs` -> `Employees`; `mod.rs` and `lib.rs` have no controller.
fn controller_of_file(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if matches!(stem.as_str(), "mod" | "lib" | "main") {
        return String::new();
    }
    camelize(stem.strip_suffix(CONTROLLER_FILE_SUFFIX).unwrap_or(&stem))
}

/// `admin/hr/employees_controller.rs` -> `Admin/Hr`
fn namespace_of(relative: &Path) -> Option<String> {
    let parts: Vec<String> = relative
        .parent()?
        .components()
        .map(|c| camelize(&c.as_os_str().to_string_lossy()))
        .filter(|part| !part.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Renders a field type the way [`SchemaGenerator::type_schema`] reads it.
///
/// [`SchemaGenerator::type_schema`]: crate::schema_generator::SchemaGenerator::type_schema
fn type_name(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return "object".to_string();
            };
            let ident = segment.ident.to_string();
            match &segment.arguments {
                syn::PathArguments::AngleBracketed(args) => {
                    let inner: Vec<String> = args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            syn::GenericArgument::Type(inner) => Some(type_name(inner)),
                            _ => None,
                        })
                        .collect();
                    format!("{}<{}>", ident, inner.join(", "))
                }
                _ => ident,
            }
        }
        syn::Type::Reference(reference) => type_name(&reference.elem),
        syn::Type::Slice(slice) => format!("Vec<{}>", type_name(&slice.elem)),
        syn::Type::Array(array) => format!("Vec<{}>", type_name(&array.elem)),
        _ => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationSource, DocTag, Lookup};
    use crate::parser::AstParser;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn parsed(relative: &str, code: &str) -> ParsedFile {
        ParsedFile {
            path: PathBuf::from(relative),
            relative: PathBuf::from(relative),
            syntax_tree: AstParser::parse_str(code).unwrap(),
        }
    }

    fn record<'a>(registry: &'a AnnotationRegistry, id: &str) -> &'a AnnotationRecord {
        match registry.lookup(&id.parse().unwrap()) {
            Lookup::Annotated(record) => record,
            other => panic!("{} not annotated: {:?}", id, other),
        }
    }

    #[test]
    fn test_free_functions_in_controller_file() {
        let code = r#"
            /// List employees.
            ///
            /// Ordered by last name.
            ///
            /// @see https://example.com/employees Guide
            /// @throws NotFoundException when the department is missing
            #[openapi_tag("Staff")]
            pub fn index() {}

            fn helper() {}
        "#;
        let registry = AnnotationExtractor::extract(&[parsed("employee_salaries_controller.rs", code)]);

        let index = record(&registry, "EmployeeSalaries::index");
        assert_eq!(index.summary.as_deref(), Some("List employees."));
        assert_eq!(index.description.as_deref(), Some("Ordered by last name."));
        assert_eq!(index.tags, vec!["Staff"]);
        assert_eq!(
            index.doc_tags,
            vec![DocTag::new("see", "https://example.com/employees Guide")]
        );
        assert_eq!(index.throws[0].exception, "NotFoundException");

        assert_eq!(
            registry.lookup(&"EmployeeSalaries::helper".parse().unwrap()),
            Lookup::Unresolved
        );
    }

    #[test]
    fn test_impl_controller_methods_and_namespace() {
        let code = r#"
            pub struct UsersController;

            impl UsersController {
                /// Show one user.
                pub fn view(&self) {}
                fn private(&self) {}
            }

            impl Default for UsersController {
                fn default() -> Self { UsersController }
            }
        "#;
        let registry = AnnotationExtractor::extract(&[parsed("admin/users.rs", code)]);

        assert_eq!(
            record(&registry, "Admin/Users::view").summary.as_deref(),
            Some("Show one user.")
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dto_fields_resolved_across_files() {
        let controller = r#"
            #[openapi_dto(EmployeeInput)]
            pub fn add() {}
        "#;
        let dto = r#"
            pub struct EmployeeInput {
                /// Given name
                pub first_name: String,
                pub birth_date: Option<String>,
                pub skills: Vec<String>,
            }
        "#;
        let registry = AnnotationExtractor::extract(&[
            parsed("employees_controller.rs", controller),
            parsed("dto/employee_input.rs", dto),
        ]);

        let fields = &record(&registry, "Employees::add").dto.as_ref().unwrap().fields;
        let summary: Vec<(&str, &str, bool)> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.field_type.as_str(), f.required))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("first_name", "String", true),
                ("birth_date", "Option<String>", false),
                ("skills", "Vec<String>", true),
            ]
        );
        assert_eq!(fields[0].description.as_deref(), Some("Given name"));
    }

    #[test]
    fn test_controller_and_namespace_naming() {
        assert_eq!(controller_of_file(Path::new("employees_controller.rs")), "Employees");
        assert_eq!(controller_of_file(Path::new("mod.rs")), "");
        assert_eq!(namespace_of(Path::new("admin/hr/x.rs")).as_deref(), Some("Admin/Hr"));
        assert_eq!(namespace_of(Path::new("x.rs")), None);
    }
}
