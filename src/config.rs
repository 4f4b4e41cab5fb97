//! Generator configuration.

use crate::openapi::document::is_yaml;
use crate::openapi::{Info, ResponseKey};
use anyhow::Context;
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Settings that shape the generated document. Every field has a default, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `info.title` when the partial document supplies no `info`
    pub title: String,
    /// `info.version` when the partial document supplies no `info`
    pub version: String,
    pub description: Option<String>,
    /// Only routes whose template starts with this prefix are documented
    pub prefix: String,
    /// Component schema referenced by exception responses
    pub exception_schema: String,
    /// Response key for thrown exceptions with no known status code
    pub exception_fallback: ResponseKey,
    /// Request body content types when a directive names none
    pub request_accepts: Vec<String>,
    /// Content types of generated responses
    pub response_content_types: Vec<String>,
    /// Build operations on the rayon thread pool
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            title: "API Documentation".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            prefix: "/".to_string(),
            exception_schema: "Exception".to_string(),
            exception_fallback: ResponseKey::Class(5),
            request_accepts: vec!["application/json".to_string()],
            response_content_types: vec!["application/json".to_string()],
            parallel: false,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML (`.yml`/`.yaml`) or JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The configuration with unspecified fields left at their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading configuration: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid configuration: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid configuration: {}", path.display()))?
        };
        Ok(config)
    }

    pub fn info(&self) -> Info {
        Info {
            title: self.title.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
        }
    }

    /// Whether a route template falls under the configured prefix.
    pub fn covers(&self, template: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        template == prefix
            || template
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}
