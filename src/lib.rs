//! openapi-assemble - One OpenAPI document from routes, annotations and a hand-written partial.
//!
//! Three sources describe an HTTP API: the routes the application's routing layer exports,
//! annotations attached to handler code, and a partial OpenAPI document written by hand. This
//! library merges them into a single, internally consistent OpenAPI 3 document with a fixed
//! precedence: route defaults, then doc comments, then attributes, then the partial document.
//!
//! # Architecture
//!
//! 1. [`route`] - Route records, entities and the route manifest
//! 2. [`annotation`] - Annotation records and the handler lookup boundary
//! 3. [`scanner`], [`parser`], [`extractor`] - Read annotations from controller sources
//! 4. [`path_template`] - Converts routing templates to OpenAPI paths
//! 5. [`schema_generator`] - Entity and field schemas
//! 6. [`operation_builder`] - One operation per route and verb
//! 7. [`response_merger`] - Merges responses sharing a status key
//! 8. [`assembler`] - Builds, merges and validates the whole document
//! 9. [`serializer`] - Serializes the document to YAML or JSON and writes it out
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_assemble::{
//!     assembler::DocumentAssembler,
//!     config::GeneratorConfig,
//!     openapi::PartialDocument,
//!     route::{RouteManifest, RouteSource},
//!     serializer::{serialize, OutputFormat},
//! };
//! use std::path::Path;
//!
//! let manifest = RouteManifest::load(Path::new("routes.yaml")).unwrap();
//! let partial = PartialDocument::load(Path::new("partial.yaml")).unwrap();
//! let config = GeneratorConfig::default();
//!
//! let entities = manifest.entity_registry();
//! let annotations = manifest.annotation_registry();
//! let assembly = DocumentAssembler::new(&config, &entities, &annotations)
//!     .assemble(&manifest.routes(), Some(partial))
//!     .unwrap();
//!
//! for warning in &assembly.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! let yaml = serialize(&assembly.document, OutputFormat::Yaml).unwrap();
//! println!("{}", String::from_utf8_lossy(&yaml));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod annotation;
pub mod assembler;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod openapi;
pub mod operation_builder;
pub mod parser;
pub mod path_template;
pub mod response_merger;
pub mod route;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;

pub use assembler::{Assembly, DocumentAssembler};
pub use error::{ConfigurationError, Error, Result, Warning};
