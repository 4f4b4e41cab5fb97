//! Top-level document assembly.
//!
//! Routes are expanded into `(route, verb)` jobs in manifest and declaration order. Each job is
//! built independently, sequentially or on the rayon pool, and the results are placed into the
//! document in job order, so both modes produce the same output.

use crate::annotation::{AnnotationRecord, AnnotationSource, Lookup};
use crate::config::GeneratorConfig;
use crate::error::{ConfigurationError, Error, Result, Warning};
use crate::openapi::{
    Document, HttpMethod, Operation, OperationObject, PartialDocument, Response,
};
use crate::operation_builder::OperationBuilder;
use crate::path_template;
use crate::route::{EntityRegistry, RouteRecord};
use crate::schema_generator::SchemaGenerator;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashMap;

/// A finished document with the non-fatal diagnostics gathered while building it.
#[derive(Debug)]
pub struct Assembly {
    pub document: Document,
    pub warnings: Vec<Warning>,
}

pub struct DocumentAssembler<'a> {
    config: &'a GeneratorConfig,
    entities: &'a EntityRegistry,
    annotations: &'a dyn AnnotationSource,
}

/// One operation to build.
struct Job<'r> {
    route_index: usize,
    route: &'r RouteRecord,
    path: String,
    verb: HttpMethod,
    annotations: Option<&'r AnnotationRecord>,
}

/// Which route claimed an operationId first.
struct Owner {
    route_index: Option<usize>,
    label: String,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        entities: &'a EntityRegistry,
        annotations: &'a dyn AnnotationSource,
    ) -> Self {
        Self {
            config,
            entities,
            annotations,
        }
    }

    /// Assemble the document from routes and an optional hand-written partial document.
    ///
    /// # Arguments
    ///
    /// * `routes` - Routes in manifest order
    /// * `partial` - Hand-written document fragment that takes precedence over generated content
    ///
    /// # Returns
    ///
    /// The document and its warnings, or the first fatal error
    pub fn assemble(
        &self,
        routes: &[RouteRecord],
        partial: Option<PartialDocument>,
    ) -> Result<Assembly> {
        let mut warnings = Vec::new();

        // Step 1: Expand routes into jobs
        let jobs = self.plan(routes, &mut warnings)?;
        info!("Building {} operations from {} routes", jobs.len(), routes.len());

        // Step 2: Build operations
        let builder = OperationBuilder::new(self.config, self.entities);
        let build = |job: &Job<'_>| builder.build(job.route, job.verb, job.annotations);
        let built: Vec<std::result::Result<Option<Operation>, ConfigurationError>> =
            if self.config.parallel {
                debug!("Building operations on {} threads", rayon::current_num_threads());
                jobs.par_iter().map(build).collect()
            } else {
                jobs.iter().map(build).collect()
            };

        // Step 3: Place operations
        let mut document = Document::new(self.config.info());
        let mut owners: HashMap<String, Owner> = HashMap::new();
        for (job, operation) in jobs.iter().zip(built) {
            let Some(operation) = operation? else {
                continue;
            };
            if document.contains_operation(&job.path, job.verb) {
                let warning = Warning::DuplicateRoute {
                    path: job.path.clone(),
                    method: job.verb.to_string(),
                    route: job.route.name(),
                };
                warn!("{}", warning);
                warnings.push(warning);
                continue;
            }
            claim(
                &mut owners,
                operation.operation_id(),
                Owner {
                    route_index: Some(job.route_index),
                    label: route_label(job),
                },
            )?;
            document.insert_operation(&job.path, operation);
        }

        // Step 4: Components
        self.add_components(&mut document, partial.as_ref());

        // Step 5: Merge the partial document
        if let Some(partial) = partial {
            info!("Merging partial document");
            merge_partial(&mut document, partial, &mut owners)?;
        }

        // Step 6: Validate references
        document.validate_references()?;

        // Step 7: Report operations without a success response
        for (path, operation) in document.operations() {
            if !operation.has_success_response() {
                let warning = Warning::MissingSuccessResponse {
                    path: path.to_string(),
                    method: operation.http_method().to_string(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        info!(
            "Assembled {} paths with {} warnings",
            document.paths.len(),
            warnings.len()
        );
        Ok(Assembly { document, warnings })
    }

    fn plan<'r>(
        &'r self,
        routes: &'r [RouteRecord],
        warnings: &mut Vec<Warning>,
    ) -> Result<Vec<Job<'r>>> {
        let mut jobs = Vec::new();
        for (route_index, route) in routes.iter().enumerate() {
            if !self.config.covers(&route.template) {
                debug!("Skipping route {} outside prefix {}", route.template, self.config.prefix);
                continue;
            }

            let handler = route.handler_id();
            let annotations = match self.annotations.lookup(&handler) {
                Lookup::Annotated(record) => Some(record),
                Lookup::Unannotated => None,
                Lookup::Unresolved => {
                    let warning = Warning::HandlerUnresolved {
                        route: route.name(),
                        handler: handler.to_string(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    None
                }
            };

            let path = path_template::normalize(&route.template);
            for method in &route.methods {
                let verb: HttpMethod = method.parse()?;
                jobs.push(Job {
                    route_index,
                    route,
                    path: path.clone(),
                    verb,
                    annotations,
                });
            }
        }
        Ok(jobs)
    }

    /// Entity schemas, then the exception schema if missing, then the partial's components.
    fn add_components(&self, document: &mut Document, partial: Option<&PartialDocument>) {
        let generator = SchemaGenerator::new(self.entities);
        document.components.schemas = generator.generate_components();

        if !document
            .components
            .schemas
            .contains_key(&self.config.exception_schema)
        {
            document.components.schemas.insert(
                self.config.exception_schema.clone(),
                SchemaGenerator::exception_schema(),
            );
        }

        if let Some(components) = partial.and_then(|p| p.components.as_ref()) {
            for (name, schema) in &components.schemas {
                document
                    .components
                    .schemas
                    .insert(name.clone(), schema.clone());
            }
            for (name, scheme) in &components.security_schemes {
                document
                    .components
                    .security_schemes
                    .insert(name.clone(), scheme.clone());
            }
        }
        debug!("{} component schemas", document.components.schemas.len());
    }
}

/// `employees:list (GET /staff -> Employees::index)`
fn route_label(job: &Job<'_>) -> String {
    format!(
        "{} ({} {} -> {})",
        job.route.name(),
        job.verb,
        job.route.template,
        job.route.handler_id()
    )
}

fn claim(owners: &mut HashMap<String, Owner>, operation_id: &str, owner: Owner) -> Result<()> {
    if operation_id.is_empty() {
        return Ok(());
    }
    match owners.get(operation_id) {
        Some(first) if first.route_index.is_none() || first.route_index != owner.route_index => {
            Err(Error::Ambiguity {
                operation_id: operation_id.to_string(),
                first: first.label.clone(),
                second: owner.label,
            })
        }
        Some(_) => Ok(()),
        None => {
            owners.insert(operation_id.to_string(), owner);
            Ok(())
        }
    }
}

fn merge_partial(
    document: &mut Document,
    partial: PartialDocument,
    owners: &mut HashMap<String, Owner>,
) -> Result<()> {
    if let Some(openapi) = partial.openapi {
        document.openapi = openapi;
    }
    if let Some(info) = partial.info {
        document.info = info;
    }
    if let Some(servers) = partial.servers {
        document.servers = servers;
    }

    for (raw_path, item) in partial.paths {
        let path = path_template::normalize(&raw_path);
        for (verb, object) in item.operations {
            let verb: HttpMethod = verb.parse()?;
            match document.operation_mut(&path, verb) {
                Some(operation) => {
                    debug!("Merging partial operation {} {}", verb, path);
                    merge_operation(operation, object)?;
                }
                None => {
                    debug!("Adding partial-only operation {} {}", verb, path);
                    let operation = Operation::from_object(verb, object)?;
                    claim(
                        owners,
                        operation.operation_id(),
                        Owner {
                            route_index: None,
                            label: format!("partial document {} {}", verb, path),
                        },
                    )?;
                    document.insert_operation(&path, operation);
                }
            }
        }
    }
    Ok(())
}

/// Applies the fields the partial document supplies. Tags and operationId stay generated.
fn merge_operation(
    operation: &mut Operation,
    object: OperationObject,
) -> std::result::Result<(), ConfigurationError> {
    if object.summary.is_some() {
        operation.set_summary(object.summary);
    }
    if object.description.is_some() {
        operation.set_description(object.description);
    }
    if object.external_docs.is_some() {
        operation.set_external_docs(object.external_docs);
    }
    if let Some(deprecated) = object.deprecated {
        operation.set_deprecated(deprecated);
    }
    if let Some(security) = object.security {
        operation.set_security(security);
    }
    if let Some(parameters) = object.parameters {
        operation.replace_parameters(parameters)?;
    }
    if let Some(body) = object.request_body {
        operation.attach_request_body_lenient(body);
    }
    for (key, response) in object.responses.unwrap_or_default() {
        operation.push_response(Response::from_object(key, response));
    }
    Ok(())
}
