//! Builds one [`Operation`] per route and verb.
//!
//! Responses from several sources can share a status key. They are pushed in a fixed order
//! (route defaults, thrown exceptions, response attributes) and merged by
//! [`ResponseMerger`](crate::response_merger::ResponseMerger), so the most specific source wins.

pub mod doc_block;
pub mod exception;
pub mod request_body;

use crate::annotation::{AnnotationRecord, ParameterDirective, ResponseDirective};
use crate::config::GeneratorConfig;
use crate::error::ConfigurationError;
use crate::openapi::{
    HttpMethod, Operation, Parameter, ParameterLocation, Response, ResponseKey, Schema,
    SecurityRequirement,
};
use crate::path_template;
use crate::route::{EntityRegistry, RouteRecord};
use crate::schema_generator::SchemaGenerator;
use log::debug;

pub struct OperationBuilder<'a> {
    config: &'a GeneratorConfig,
    schemas: SchemaGenerator<'a>,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(config: &'a GeneratorConfig, entities: &'a EntityRegistry) -> Self {
        Self {
            config,
            schemas: SchemaGenerator::new(entities),
        }
    }

    /// Build the operation for `verb` on `route`.
    ///
    /// # Arguments
    ///
    /// * `route` - The route to document
    /// * `verb` - One of the route's declared verbs
    /// * `annotations` - The handler's annotations, if any
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the route does not declare `verb`, the operation otherwise
    pub fn build(
        &self,
        route: &RouteRecord,
        verb: HttpMethod,
        annotations: Option<&AnnotationRecord>,
    ) -> Result<Option<Operation>, ConfigurationError> {
        if !route.declares(verb.as_str()) {
            return Ok(None);
        }

        let operation_id = format!("{}:{}", route.name(), verb.as_str()).to_lowercase();
        debug!("Building operation {}", operation_id);

        let mut operation = Operation::with_method(verb, &operation_id);
        operation.push_tag(&route.default_tag());

        self.add_path_parameters(&mut operation, &route.template)?;
        self.add_default_responses(&mut operation, route);

        if let Some(annotations) = annotations {
            self.apply_annotations(&mut operation, annotations)?;
        }

        if verb.allows_request_body() {
            if let Some(body) =
                request_body::infer(route, annotations, self.config, &self.schemas)
            {
                operation.set_request_body(body)?;
            }
        }

        Ok(Some(operation))
    }

    fn add_path_parameters(
        &self,
        operation: &mut Operation,
        template: &str,
    ) -> Result<(), ConfigurationError> {
        for name in path_template::placeholders(&path_template::normalize(template)) {
            operation.push_parameter(Parameter::path(&name)?)?;
        }
        Ok(())
    }

    /// CRUD responses for routes whose entity is known.
    fn add_default_responses(&self, operation: &mut Operation, route: &RouteRecord) {
        let entity_name = route.entity_name();
        if !self.schemas.is_entity(&entity_name) {
            return;
        }
        let entity = Schema::component(&entity_name);

        let (key, schema) = match route.action() {
            "index" => (ResponseKey::Status(200), Some(Schema::array(entity))),
            "view" | "add" | "edit" => (ResponseKey::Status(200), Some(entity)),
            "delete" => (ResponseKey::Status(204), None),
            _ => return,
        };

        let mut response = Response::new(key).with_description(exception::default_description(key));
        if let Some(schema) = schema {
            for mime_type in &self.config.response_content_types {
                response = response.with_content(mime_type, schema.clone());
            }
        }
        operation.push_response(response);
    }

    fn apply_annotations(
        &self,
        operation: &mut Operation,
        annotations: &AnnotationRecord,
    ) -> Result<(), ConfigurationError> {
        for tag in &annotations.tags {
            operation.push_tag(tag);
        }
        operation.set_summary(annotations.summary.clone());
        operation.set_description(annotations.description.clone());

        for directive in &annotations.parameters {
            apply_parameter(operation, directive)?;
        }

        for throws in &annotations.throws {
            operation.push_response(exception::exception_response(throws, self.config));
        }
        for directive in &annotations.responses {
            operation.push_response(self.directive_response(directive));
        }

        if doc_block::is_deprecated(&annotations.doc_tags) {
            operation.set_deprecated(true);
        }
        operation.set_external_docs(doc_block::external_docs(&annotations.doc_tags));

        for security in &annotations.security {
            operation.push_security(SecurityRequirement::new(
                &security.name,
                security.scopes.clone(),
            ));
        }
        Ok(())
    }

    fn directive_response(&self, directive: &ResponseDirective) -> Response {
        let mut response = Response::new(directive.status);
        if let Some(description) = &directive.description {
            response = response.with_description(description.clone());
        }

        let schema = match (&directive.reference, &directive.schema_type) {
            (Some(reference), _) => Some(Schema::reference(reference)),
            (None, Some(schema_type)) => Some(SchemaGenerator::type_schema(schema_type)),
            (None, None) => None,
        };
        let Some(schema) = schema else {
            return response;
        };

        match &directive.mime_type {
            Some(mime_type) => response.with_content(mime_type, schema),
            None => self
                .config
                .response_content_types
                .iter()
                .fold(response, |response, mime_type| {
                    response.with_content(mime_type, schema.clone())
                }),
        }
    }
}

/// Path directives refine the generated path parameter of the same name, everything else is
/// appended.
fn apply_parameter(
    operation: &mut Operation,
    directive: &ParameterDirective,
) -> Result<(), ConfigurationError> {
    let schema = match &directive.format {
        Some(format) => Schema::with_format(&directive.schema_type, format),
        None => SchemaGenerator::type_schema(&directive.schema_type),
    };

    if directive.location == ParameterLocation::Path {
        if let Some(existing) = operation
            .parameter_mut(&directive.name)
            .filter(|p| p.location == ParameterLocation::Path)
        {
            existing.schema = schema;
            if directive.description.is_some() {
                existing.description = directive.description.clone();
            }
            existing.deprecated = directive.deprecated;
            return Ok(());
        }
    }

    let mut parameter = Parameter::new(
        &directive.name,
        directive.location,
        schema,
        directive.required,
    )?
    .with_description(directive.description.clone());
    parameter.deprecated = directive.deprecated;
    operation.push_parameter(parameter)
}
