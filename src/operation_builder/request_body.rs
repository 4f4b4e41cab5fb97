//! Request body inference.
//!
//! Sources in order of precedence:
//!
//! 1. `ignore_base_schema` on the request-body directive: no body
//! 2. a raw schema reference
//! 3. a DTO type
//! 4. form fields, unless the route writes a known entity
//! 5. for `add`/`edit` on a known entity, `allOf` of the entity and any extra form fields

use crate::annotation::AnnotationRecord;
use crate::config::GeneratorConfig;
use crate::openapi::{RequestBody, Schema};
use crate::route::RouteRecord;
use crate::schema_generator::SchemaGenerator;
use log::debug;

const WRITE_ACTIONS: &[&str] = &["add", "edit"];

/// Infers the request body for a route, `None` when no schema applies.
pub fn infer(
    route: &RouteRecord,
    annotations: Option<&AnnotationRecord>,
    config: &GeneratorConfig,
    schemas: &SchemaGenerator<'_>,
) -> Option<RequestBody> {
    let directive = annotations.and_then(|a| a.request_body.as_ref());
    if directive.is_some_and(|d| d.ignore_base_schema) {
        debug!("Request body of `{}` ignored", route.name());
        return None;
    }

    let schema = body_schema(route, annotations, schemas)?;

    let mime_types = match directive {
        Some(d) if !d.mime_types.is_empty() => &d.mime_types,
        _ => &config.request_accepts,
    };
    let required = directive.and_then(|d| d.required).unwrap_or(true);
    let description = directive.and_then(|d| d.description.clone());

    Some(
        RequestBody::new(required)
            .with_description(description)
            .with_schema_for(mime_types, &schema),
    )
}

fn body_schema(
    route: &RouteRecord,
    annotations: Option<&AnnotationRecord>,
    schemas: &SchemaGenerator<'_>,
) -> Option<Schema> {
    let reference = annotations
        .and_then(|a| a.request_body.as_ref())
        .and_then(|d| d.reference.as_deref());
    if let Some(reference) = reference {
        return Some(Schema::reference(reference));
    }

    if let Some(dto) = annotations.and_then(|a| a.dto.as_ref()) {
        debug!("Request body of `{}` from DTO {}", route.name(), dto.name);
        return Some(SchemaGenerator::fields_schema(&dto.fields));
    }

    let form_fields = annotations.map(|a| a.form_fields.as_slice()).unwrap_or_default();
    let entity = schemas.entity(&route.entity_name());

    match entity {
        Some(entity) if WRITE_ACTIONS.contains(&route.action()) => {
            let mut parts = vec![Schema::component(&entity.name)];
            if !form_fields.is_empty() {
                parts.push(SchemaGenerator::fields_schema(form_fields));
            }
            Some(Schema::all_of(parts).with_required(SchemaGenerator::required_fields(entity)))
        }
        _ if !form_fields.is_empty() => Some(SchemaGenerator::fields_schema(form_fields)),
        _ => None,
    }
}
