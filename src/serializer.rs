//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! This module turns an assembled [`Document`] into bytes and hands them to an
//! [`ArtifactSink`]. Key order in the output follows insertion order, so the same inputs always
//! produce byte-identical artifacts.

use crate::error::Result;
use crate::openapi::Document;
use anyhow::Context;
use clap::ValueEnum;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Yaml => "application/yaml",
        }
    }

    /// Format implied by a file extension; `.yml`/`.yaml` are YAML, everything else JSON.
    pub fn from_path(path: &Path) -> Self {
        if crate::openapi::document::is_yaml(path) {
            OutputFormat::Yaml
        } else {
            OutputFormat::Json
        }
    }
}

/// Serializes a document in the requested format.
///
/// # Errors
///
/// Returns [`Error::Serialization`](crate::error::Error::Serialization) if the encoder fails.
pub fn serialize(doc: &Document, format: OutputFormat) -> Result<Vec<u8>> {
    let content = match format {
        OutputFormat::Yaml => serialize_yaml(doc)?,
        OutputFormat::Json => serialize_json(doc)?,
    };
    Ok(content.into_bytes())
}

/// Serializes a document to YAML format.
pub fn serialize_yaml(doc: &Document) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes a document to JSON format with pretty printing.
///
/// The output is formatted with indentation for readability, making it suitable
/// for human review and version control.
pub fn serialize_json(doc: &Document) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Destination of the serialized document.
pub trait ArtifactSink {
    fn write(&mut self, bytes: &[u8], media_type: &str) -> anyhow::Result<()>;
}

/// Writes the artifact to a file, creating parent directories as needed.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactSink for FileSink {
    fn write(&mut self, bytes: &[u8], media_type: &str) -> anyhow::Result<()> {
        debug!("Writing {} to file: {}", media_type, self.path.display());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(&self.path, bytes)
            .with_context(|| format!("Failed to write to file: {}", self.path.display()))?;

        debug!("Successfully wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

/// Writes the artifact to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ArtifactSink for StdoutSink {
    fn write(&mut self, bytes: &[u8], media_type: &str) -> anyhow::Result<()> {
        debug!("Writing {} to stdout", media_type);
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(bytes)
            .and_then(|_| stdout.write_all(b"\n"))
            .and_then(|_| stdout.flush())
            .context("Failed to write to stdout")
    }
}
