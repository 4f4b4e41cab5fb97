use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing a controller source tree.
///
/// The `FileScanner` recursively walks a directory to find Rust source files that may contain
/// annotated handlers. It skips `target` and hidden directories (those starting with `.`) and
/// visits entries in file-name order, so results are the same on every platform.
///
/// # Example
///
/// ```no_run
/// use openapi_assemble::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./src/controllers"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} source files", result.sources.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the scan root
    pub relative: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    pub sources: Vec<SourceFile>,
    /// Warning messages for entries that could not be read
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all `.rs` files.
    ///
    /// Inaccessible entries are logged and added to the result's warnings; scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a readable directory.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = std::fs::metadata(&self.root_path)
            .with_context(|| format!("Cannot access source directory: {}", self.root_path.display()))?;
        if !metadata.is_dir() {
            anyhow::bail!("Source path is not a directory: {}", self.root_path.display());
        }

        let mut sources = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e.file_name().to_string_lossy().as_ref()));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        sources.push(SourceFile {
                            path: path.to_path_buf(),
                            relative: relative_to(path, &self.root_path),
                        });
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!("Found {} source files under {}", sources.len(), self.root_path.display());
        Ok(ScanResult { sources, warnings })
    }
}

fn is_ignored(file_name: &str) -> bool {
    file_name.starts_with('.') || file_name == "target"
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn relative_names(result: &ScanResult) -> Vec<String> {
        result
            .sources
            .iter()
            .map(|s| s.relative.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_scan_nested_directories_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("admin")).unwrap();
        fs::write(root.join("employees_controller.rs"), "fn index() {}").unwrap();
        fs::write(root.join("admin/users_controller.rs"), "fn index() {}").unwrap();
        fs::write(root.join("departments_controller.rs"), "fn index() {}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(
            relative_names(&result),
            vec![
                "admin/users_controller.rs",
                "departments_controller.rs",
                "employees_controller.rs",
            ]
        );
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::new(temp_dir.path().to_path_buf()).scan().unwrap();
        assert!(result.sources.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.rs"), "// config").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();
        assert_eq!(relative_names(&result), vec!["main.rs"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(FileScanner::new(missing).scan().is_err());
    }

    #[test]
    fn test_scan_file_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("main.rs");
        fs::write(&file, "fn main() {}").unwrap();
        assert!(FileScanner::new(file).scan().is_err());
    }
}
