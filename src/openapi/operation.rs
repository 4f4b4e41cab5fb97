use super::parameter::Parameter;
use super::request_body::RequestBody;
use super::response::{Response, ResponseObject};
use super::{HttpMethod, ResponseKey};
use crate::error::ConfigurationError;
use indexmap::IndexMap;
use log::warn;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// OpenAPI Security Requirement object: scheme name -> scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRequirement(pub IndexMap<String, Vec<String>>);

impl SecurityRequirement {
    pub fn new(name: &str, scopes: Vec<String>) -> Self {
        let mut map = IndexMap::new();
        map.insert(name.to_string(), scopes);
        Self(map)
    }
}

/// OpenAPI External Documentation object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One HTTP verb on one path.
///
/// Mutated only while the document is being assembled. Setters enforce the invariants:
/// unique `(name, location)` parameters, no request body on GET or DELETE, one response per key.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    http_method: HttpMethod,
    tags: Vec<String>,
    summary: Option<String>,
    description: Option<String>,
    operation_id: String,
    parameters: Vec<Parameter>,
    request_body: Option<RequestBody>,
    responses: IndexMap<ResponseKey, Response>,
    security: Vec<SecurityRequirement>,
    external_docs: Option<ExternalDocs>,
    deprecated: bool,
}

/// Wire form of an operation. Every field is optional so a partial document can tell
/// "not supplied" apart from "supplied empty".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationObject {
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    pub request_body: Option<RequestBody>,
    pub responses: Option<IndexMap<ResponseKey, ResponseObject>>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub external_docs: Option<ExternalDocs>,
    pub deprecated: Option<bool>,
}

impl Operation {
    /// Creates an operation from a verb string. Fails on anything but get, put, post, patch
    /// and delete.
    pub fn new(http_method: &str, operation_id: &str) -> Result<Self, ConfigurationError> {
        Ok(Self::with_method(http_method.parse()?, operation_id))
    }

    pub fn with_method(http_method: HttpMethod, operation_id: &str) -> Self {
        Self {
            http_method,
            tags: Vec::new(),
            summary: None,
            description: None,
            operation_id: operation_id.to_string(),
            parameters: Vec::new(),
            request_body: None,
            responses: IndexMap::new(),
            security: Vec::new(),
            external_docs: None,
            deprecated: false,
        }
    }

    /// Builds an operation from its wire form. The verb comes from the enclosing path item.
    ///
    /// A request body on GET or DELETE is dropped with a warning.
    pub fn from_object(
        http_method: HttpMethod,
        object: OperationObject,
    ) -> Result<Self, ConfigurationError> {
        let mut operation = Self::with_method(
            http_method,
            object.operation_id.as_deref().unwrap_or_default(),
        );
        operation.tags = object.tags.unwrap_or_default();
        operation.summary = object.summary;
        operation.description = object.description;
        if let Some(parameters) = object.parameters {
            operation.replace_parameters(parameters)?;
        }
        if let Some(body) = object.request_body {
            operation.attach_request_body_lenient(body);
        }
        for (key, response) in object.responses.unwrap_or_default() {
            operation.push_response(Response::from_object(key, response));
        }
        operation.security = object.security.unwrap_or_default();
        operation.external_docs = object.external_docs;
        operation.deprecated = object.deprecated.unwrap_or(false);
        Ok(operation)
    }

    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn push_tag(&mut self, tag: &str) {
        self.tags.push(tag.to_string());
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn set_summary(&mut self, summary: Option<String>) {
        self.summary = summary;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    pub fn push_parameter(&mut self, parameter: Parameter) -> Result<(), ConfigurationError> {
        if self
            .parameters
            .iter()
            .any(|p| p.identity() == parameter.identity())
        {
            return Err(ConfigurationError::DuplicateParameter {
                name: parameter.name,
                location: parameter.location.to_string(),
            });
        }
        self.parameters.push(parameter);
        Ok(())
    }

    /// Replaces all parameters at once. Fails without modifying the operation on duplicates.
    pub fn replace_parameters(
        &mut self,
        parameters: Vec<Parameter>,
    ) -> Result<(), ConfigurationError> {
        let previous = std::mem::take(&mut self.parameters);
        for parameter in parameters {
            if let Err(err) = self.push_parameter(parameter) {
                self.parameters = previous;
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn request_body(&self) -> Option<&RequestBody> {
        self.request_body.as_ref()
    }

    pub fn set_request_body(&mut self, body: RequestBody) -> Result<(), ConfigurationError> {
        if !self.http_method.allows_request_body() {
            return Err(ConfigurationError::RequestBodyNotAllowed(
                self.http_method.to_string(),
            ));
        }
        self.request_body = Some(body);
        Ok(())
    }

    pub fn clear_request_body(&mut self) {
        self.request_body = None;
    }

    /// Attaches a body supplied by a hand-written document, dropping it on GET or DELETE.
    pub(crate) fn attach_request_body_lenient(&mut self, body: RequestBody) {
        if let Err(err) = self.set_request_body(body) {
            warn!("Operation `{}`: {}, body dropped", self.operation_id, err);
        }
    }

    pub fn responses(&self) -> &IndexMap<ResponseKey, Response> {
        &self.responses
    }

    pub fn response(&self, key: ResponseKey) -> Option<&Response> {
        self.responses.get(&key)
    }

    /// Adds a response, merging it into an existing one with the same key.
    pub fn push_response(&mut self, response: Response) {
        let key = response.key();
        match self.responses.get_mut(&key) {
            Some(existing) => {
                let current = std::mem::replace(existing, Response::new(key));
                *existing = current.merge(response);
            }
            None => {
                self.responses.insert(key, response);
            }
        }
    }

    pub fn has_success_response(&self) -> bool {
        self.responses.keys().any(ResponseKey::is_success)
    }

    pub fn security(&self) -> &[SecurityRequirement] {
        &self.security
    }

    pub fn push_security(&mut self, requirement: SecurityRequirement) {
        self.security.push(requirement);
    }

    pub fn set_security(&mut self, security: Vec<SecurityRequirement>) {
        self.security = security;
    }

    pub fn external_docs(&self) -> Option<&ExternalDocs> {
        self.external_docs.as_ref()
    }

    pub fn set_external_docs(&mut self, external_docs: Option<ExternalDocs>) {
        self.external_docs = external_docs;
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn set_deprecated(&mut self, deprecated: bool) {
        self.deprecated = deprecated;
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("tags", &self.tags)?;
        if let Some(summary) = &self.summary {
            map.serialize_entry("summary", summary)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if !self.operation_id.is_empty() {
            map.serialize_entry("operationId", &self.operation_id)?;
        }
        map.serialize_entry("parameters", &self.parameters)?;
        // re-checked here: the method is implied by the path item key and never written
        if self.http_method.allows_request_body() {
            if let Some(body) = &self.request_body {
                map.serialize_entry("requestBody", body)?;
            }
        }
        map.serialize_entry("responses", &self.responses)?;
        if !self.security.is_empty() {
            map.serialize_entry("security", &self.security)?;
        }
        if let Some(external_docs) = &self.external_docs {
            map.serialize_entry("externalDocs", external_docs)?;
        }
        map.serialize_entry("deprecated", &self.deprecated)?;
        map.end()
    }
}
