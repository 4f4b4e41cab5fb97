use crate::annotation::AnnotationRegistry;
use crate::assembler::DocumentAssembler;
use crate::config::GeneratorConfig;
use crate::extractor::AnnotationExtractor;
use crate::openapi::PartialDocument;
use crate::parser::{AstParser, ParsedFile};
use crate::route::{RouteManifest, RouteSource};
use crate::scanner::FileScanner;
use crate::serializer::{serialize, ArtifactSink, FileSink, OutputFormat, StdoutSink};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Assemble an OpenAPI document from a route manifest, handler annotations and a hand-written
/// partial document
#[derive(Parser, Debug)]
#[command(name = "openapi-assemble")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route manifest (YAML or JSON) exported by the application
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Hand-written partial OpenAPI document that takes precedence over generated content
    #[arg(short = 'p', long = "partial", value_name = "FILE")]
    pub partial: Option<PathBuf>,

    /// Directory of controller sources to read doc comments and openapi attributes from
    #[arg(short = 's', long = "source", value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Generator configuration file (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// API title, overrides the configuration
    #[arg(long = "title")]
    pub title: Option<String>,

    /// API version, overrides the configuration
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// Build operations in parallel
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    require_file(&args.manifest, "Route manifest")?;
    if let Some(partial) = &args.partial {
        require_file(partial, "Partial document")?;
    }
    if let Some(config) = &args.config {
        require_file(config, "Configuration")?;
    }
    if let Some(source_dir) = &args.source_dir {
        if !source_dir.is_dir() {
            anyhow::bail!("Source path is not a directory: {}", source_dir.display());
        }
    }

    info!("Manifest: {}", args.manifest.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{} does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        anyhow::bail!("{} is not a file: {}", what, path.display());
    }
    Ok(())
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document assembly...");

    // Step 1: Load configuration
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    if let Some(version) = &args.api_version {
        config.version = version.clone();
    }
    config.parallel |= args.parallel;
    debug!("Configuration: {:?}", config);

    // Step 2: Load routes, entities and manifest annotations
    info!("Loading route manifest...");
    let manifest = RouteManifest::load(&args.manifest)?;
    let routes = manifest.routes();
    let entities = manifest.entity_registry();
    let mut annotations = manifest.annotation_registry();
    info!(
        "Loaded {} routes and {} entities",
        routes.len(),
        manifest.entities.len()
    );

    // Step 3: Extract annotations from controller sources
    if let Some(source_dir) = &args.source_dir {
        let extracted = extract_annotations(source_dir)?;
        info!("Extracted annotations for {} handlers", extracted.len());
        annotations.extend(extracted);
    }

    // Step 4: Load the partial document
    let partial = match &args.partial {
        Some(path) => {
            info!("Loading partial document...");
            Some(PartialDocument::load(path)?)
        }
        None => None,
    };

    // Step 5: Assemble
    info!("Assembling OpenAPI document...");
    let assembly = DocumentAssembler::new(&config, &entities, &annotations)
        .assemble(&routes, partial)
        .context("Failed to assemble OpenAPI document")?;

    // Step 6: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let bytes = serialize(&assembly.document, args.output_format)
        .context("Failed to serialize OpenAPI document")?;

    // Step 7: Output to file or stdout
    let media_type = args.output_format.media_type();
    match &args.output_path {
        Some(output_path) => {
            info!("Writing output to: {}", output_path.display());
            FileSink::new(output_path).write(&bytes, media_type)?;
        }
        None => StdoutSink.write(&bytes, media_type)?,
    }

    // Step 8: Display summary
    info!("Assembly complete!");
    info!("Summary:");
    info!("  - Routes: {}", routes.len());
    info!("  - Paths: {}", assembly.document.paths.len());
    info!("  - Operations: {}", assembly.document.operations().count());
    info!("  - Component schemas: {}", assembly.document.components.schemas.len());
    if !assembly.warnings.is_empty() {
        warn!("  - Warnings: {}", assembly.warnings.len());
    }

    Ok(())
}

fn extract_annotations(source_dir: &Path) -> Result<AnnotationRegistry> {
    info!("Scanning controller sources...");
    let scan_result = FileScanner::new(source_dir.to_path_buf()).scan()?;
    info!("Found {} source files", scan_result.sources.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }

    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.sources)
        .into_iter()
        .filter_map(|result| match result {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {}", e);
                None
            }
        })
        .collect();
    info!("Successfully parsed {} files", parsed_files.len());

    Ok(AnnotationExtractor::extract(&parsed_files))
}
