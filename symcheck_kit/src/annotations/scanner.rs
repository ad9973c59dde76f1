//! Source tree scanner
//!
//! Walks a directory tree and collects annotations from every source file
//! with an allowed extension. Files are visited in sorted order so checks come
//! out file-then-line, the same on every run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use super::parser::{scan_bytes, ParseError};
use super::types::{AnnotationSyntax, SymbolCheck, DEFAULT_EXTENSIONS};

/// Errors that abort a scan
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Collects annotations from source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationScanner {
    syntaxes: Vec<AnnotationSyntax>,
    extensions: Vec<String>,
}

impl Default for AnnotationScanner {
    fn default() -> Self {
        Self {
            syntaxes: vec![AnnotationSyntax::default()],
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl AnnotationScanner {
    pub fn new(syntaxes: Vec<AnnotationSyntax>, extensions: Vec<String>) -> Self {
        Self {
            syntaxes,
            extensions,
        }
    }

    /// Whether a path has one of the scanned extensions
    ///
    /// Extensions are configured with their leading dot (`.cc`).
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.strip_prefix('.').unwrap_or(allowed) == ext)
    }

    /// Scan every matching file below `root`
    pub fn scan_tree(&self, root: &Path) -> Result<Vec<SymbolCheck>, ScanError> {
        let mut checks = Vec::new();
        let mut files = 0usize;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            // Symlinked files count; symlinked directories are not descended.
            if !entry.path().is_file() || !self.accepts(entry.path()) {
                continue;
            }

            files += 1;
            let found = self.scan_file(entry.path())?;
            if !found.is_empty() {
                log::debug!("{}: {} annotation(s)", entry.path().display(), found.len());
            }
            checks.extend(found);
        }

        log::info!(
            "found {} symbol check(s) in {} source file(s) under {}",
            checks.len(),
            files,
            root.display()
        );
        Ok(checks)
    }

    /// Scan a single file regardless of its extension
    pub fn scan_file(&self, path: &Path) -> Result<Vec<SymbolCheck>, ScanError> {
        let file = File::open(path).map_err(|source| ScanError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.scan_reader(BufReader::new(file), path)
    }

    /// Scan already opened text, attributing checks to `path`
    pub fn scan_reader<R: BufRead>(
        &self,
        reader: R,
        path: &Path,
    ) -> Result<Vec<SymbolCheck>, ScanError> {
        let mut checks = Vec::new();

        for (index, line) in reader.split(b'\n').enumerate() {
            let line = line.map_err(|source| ScanError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            for syntax in &self.syntaxes {
                if let Some(check) = scan_bytes(&line, index + 1, path, syntax)? {
                    checks.push(check);
                }
            }
        }

        Ok(checks)
    }
}

// ============================================================================
// Tests
// ============================================================================
