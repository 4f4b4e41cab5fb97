//! openapi-assemble - Command-line tool for assembling OpenAPI documentation.
//!
//! Reads the route manifest exported by an application, optionally reads handler annotations
//! from controller sources and a hand-written partial document, and writes one merged
//! OpenAPI 3 document.
//!
//! # Usage
//!
//! ```bash
//! openapi-assemble [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-assemble routes.yaml -o openapi.yaml
//! ```
//!
//! Merge a partial document and read controller annotations:
//! ```bash
//! openapi-assemble routes.yaml -p partial.yaml -s src/controllers -f json -o openapi.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-assemble routes.yaml -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_assemble::cli;

fn main() -> Result<()> {
    // Parse once so the verbose flag can configure the logger before validation logs anything
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-assemble starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("OpenAPI document assembly completed successfully");

    Ok(())
}
