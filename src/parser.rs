use crate::scanner::SourceFile;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// AST (Abstract Syntax Tree) parser for controller source files.
///
/// The `AstParser` uses the `syn` crate to parse Rust source code into a syntax tree from which
/// handler doc comments and `openapi_*` attributes are read.
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Path relative to the scanned root, used to derive the handler namespace
    pub relative: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the Rust source file to parse
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        let relative = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf());
        Self::parse_source(&SourceFile {
            path: path.to_path_buf(),
            relative,
        })
    }

    /// Parses a scanned source file, keeping its position relative to the scan root.
    pub fn parse_source(source: &SourceFile) -> Result<ParsedFile> {
        debug!("Parsing file: {}", source.path.display());

        let content = fs::read_to_string(&source.path)
            .with_context(|| format!("Failed to read file: {}", source.path.display()))?;
        let syntax_tree = Self::parse_str(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", source.path.display()))?;

        Ok(ParsedFile {
            path: source.path.clone(),
            relative: source.relative.clone(),
            syntax_tree,
        })
    }

    pub fn parse_str(content: &str) -> syn::Result<syn::File> {
        syn::parse_file(content)
    }

    /// Parses multiple source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings and returned as `Err`, so a single
    /// broken controller does not prevent the rest from being documented.
    pub fn parse_files(sources: &[SourceFile]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", sources.len());

        let results: Vec<Result<ParsedFile>> = sources
            .iter()
            .map(|source| {
                Self::parse_source(source).map_err(|e| {
                    warn!("Failed to parse {}: {:#}", source.path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(dir: &TempDir, relative: &str, content: &str) -> SourceFile {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        SourceFile {
            path,
            relative: PathBuf::from(relative),
        }
    }

    #[test]
    fn test_parse_controller_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            /// List employees.
            #[openapi_tag("Staff")]
            pub fn index() {}

            pub struct EmployeesController;

            impl EmployeesController {
                pub fn view(&self, id: u64) {}
            }
        "#;
        let source = source(&temp_dir, "admin/employees_controller.rs", code);
        let parsed = AstParser::parse_source(&source).unwrap();

        assert_eq!(parsed.path, source.path);
        assert_eq!(parsed.relative, PathBuf::from("admin/employees_controller.rs"));
        assert_eq!(parsed.syntax_tree.items.len(), 3);
    }

    #[test]
    fn test_parse_invalid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = source(&temp_dir, "invalid.rs", "fn broken( {\n let x = ;\n}");

        let err_msg = AstParser::parse_source(&source).unwrap_err().to_string();
        assert!(err_msg.contains("Failed to parse Rust syntax"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let err_msg = AstParser::parse_file(Path::new("/nonexistent/file.rs"))
            .unwrap_err()
            .to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_parse_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = source(&temp_dir, "empty.rs", "");
        let parsed = AstParser::parse_file(&source.path).unwrap();
        assert!(parsed.syntax_tree.items.is_empty());
        assert_eq!(parsed.relative, PathBuf::from("empty.rs"));
    }

    #[test]
    fn test_parse_files_batch_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let sources = vec![
            source(&temp_dir, "file1.rs", "pub fn hello() {}"),
            source(&temp_dir, "file2.rs", "pub struct World;"),
            source(&temp_dir, "file3.rs", "pub fn broken( {"),
        ];

        let results = AstParser::parse_files(&sources);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().path, sources[0].path);
        assert_eq!(results[1].as_ref().unwrap().path, sources[1].path);
        assert!(results[2].is_err());
    }

    #[test]
    fn test_parse_files_empty_list() {
        assert!(AstParser::parse_files(&[]).is_empty());
    }
}
