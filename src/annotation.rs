//! Typed annotation records attached to handler code, and the lookup boundary the builder uses
//! to find them.

use crate::openapi::{ParameterLocation, ResponseKey};
use crate::route::HandlerId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A `@name body` line of a handler's doc comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    #[serde(default)]
    pub body: String,
}

impl DocTag {
    pub fn new(name: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            body: body.to_string(),
        }
    }
}

/// An exception type the handler documents as thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrowsDirective {
    pub exception: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_type() -> String {
    "string".to_string()
}

fn default_location() -> ParameterLocation {
    ParameterLocation::Query
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDirective {
    pub name: String,
    #[serde(rename = "in", default = "default_location")]
    pub location: ParameterLocation,
    #[serde(rename = "type", default = "default_type")]
    pub schema_type: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
}

/// Overrides for the request body of an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBodyDirective {
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `true` when not set.
    #[serde(default)]
    pub required: Option<bool>,
    /// Produce no request body at all.
    #[serde(default)]
    pub ignore_base_schema: bool,
    /// Schema reference used verbatim; a bare name means a component schema.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub mime_types: Vec<String>,
}

/// A single field of a form or DTO body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDirective {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub field_type: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl FieldDirective {
    pub fn new(name: &str, field_type: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            format: None,
            required,
            description: None,
        }
    }
}

/// A data-transfer type whose fields make up the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtoDirective {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDirective>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDirective {
    pub status: ResponseKey,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Schema reference for the response content.
    #[serde(default)]
    pub reference: Option<String>,
    /// Primitive schema type when no reference is given.
    #[serde(rename = "type", default)]
    pub schema_type: Option<String>,
}

impl ResponseDirective {
    pub fn new(status: ResponseKey) -> Self {
        Self {
            status,
            description: None,
            mime_type: None,
            reference: None,
            schema_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDirective {
    pub name: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Everything known about one handler beyond its route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub doc_tags: Vec<DocTag>,
    #[serde(default)]
    pub throws: Vec<ThrowsDirective>,
    #[serde(default)]
    pub parameters: Vec<ParameterDirective>,
    #[serde(default)]
    pub request_body: Option<RequestBodyDirective>,
    #[serde(default)]
    pub dto: Option<DtoDirective>,
    #[serde(default)]
    pub form_fields: Vec<FieldDirective>,
    #[serde(default)]
    pub responses: Vec<ResponseDirective>,
    #[serde(default)]
    pub security: Vec<SecurityDirective>,
}

impl AnnotationRecord {
    pub fn is_empty(&self) -> bool {
        self == &AnnotationRecord::default()
    }

    /// Applies `other` on top of this record: fields it sets replace ours, lists are appended.
    /// A parameter with the same name and location as one of ours replaces it in place.
    pub fn overlay(&mut self, other: AnnotationRecord) {
        if other.summary.is_some() {
            self.summary = other.summary;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
        self.tags.extend(other.tags);
        self.doc_tags.extend(other.doc_tags);
        self.throws.extend(other.throws);
        for parameter in other.parameters {
            match self
                .parameters
                .iter_mut()
                .find(|p| p.name == parameter.name && p.location == parameter.location)
            {
                Some(existing) => *existing = parameter,
                None => self.parameters.push(parameter),
            }
        }
        if other.request_body.is_some() {
            self.request_body = other.request_body;
        }
        if other.dto.is_some() {
            self.dto = other.dto;
        }
        self.form_fields.extend(other.form_fields);
        self.responses.extend(other.responses);
        self.security.extend(other.security);
    }
}

/// Result of resolving a handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Annotated(&'a AnnotationRecord),
    /// The handler exists but carries no annotations.
    Unannotated,
    /// The handler does not exist.
    Unresolved,
}

impl<'a> Lookup<'a> {
    pub fn record(&self) -> Option<&'a AnnotationRecord> {
        match self {
            Lookup::Annotated(record) => Some(record),
            _ => None,
        }
    }
}

/// Resolves handler identities to annotation records. Shared across build threads.
pub trait AnnotationSource: Sync {
    fn lookup(&self, handler: &HandlerId) -> Lookup<'_>;
}

/// Annotation records keyed by handler, plus the set of handlers known to exist.
#[derive(Debug, Clone, Default)]
pub struct AnnotationRegistry {
    records: IndexMap<HandlerId, AnnotationRecord>,
    known: Option<HashSet<HandlerId>>,
}

impl AnnotationRegistry {
    /// `known = None` treats every handler as existing.
    pub fn new(
        records: IndexMap<HandlerId, AnnotationRecord>,
        known: Option<HashSet<HandlerId>>,
    ) -> Self {
        Self { records, known }
    }

    pub fn insert(&mut self, handler: HandlerId, record: AnnotationRecord) {
        if let Some(known) = self.known.as_mut() {
            known.insert(handler.clone());
        }
        match self.records.get_mut(&handler) {
            Some(existing) => existing.overlay(record),
            None => {
                self.records.insert(handler, record);
            }
        }
    }

    /// Adds every record and known handler of `other`. When only `other` knows its full
    /// handler set, that set becomes ours.
    pub fn extend(&mut self, other: AnnotationRegistry) {
        match (self.known.as_mut(), other.known) {
            (Some(known), Some(other_known)) => known.extend(other_known),
            (None, Some(other_known)) => self.known = Some(other_known),
            (_, None) => {}
        }
        for (handler, record) in other.records {
            self.insert(handler, record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AnnotationSource for AnnotationRegistry {
    fn lookup(&self, handler: &HandlerId) -> Lookup<'_> {
        if self.known.as_ref().is_some_and(|known| !known.contains(handler)) {
            return Lookup::Unresolved;
        }
        match self.records.get(handler) {
            Some(record) => Lookup::Annotated(record),
            None => Lookup::Unannotated,
        }
    }
}

/// Source for builds that use route defaults only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnnotations;

impl AnnotationSource for NoAnnotations {
    fn lookup(&self, _handler: &HandlerId) -> Lookup<'_> {
        Lookup::Unannotated
    }
}
