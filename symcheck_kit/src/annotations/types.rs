//! Shared types for annotation scanning

use std::fmt;
use std::path::PathBuf;

/// Where an annotation was found
///
/// Line and column are 1-based. The column points at the first byte of the
/// marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(path: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}

/// One annotation: "one of these symbols must exist in `library` for every
/// release between `start` and `end`"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolCheck {
    pub location: SourceLocation,
    pub library: String,
    /// Lower bound, never the wildcard
    pub start: String,
    /// Upper bound, may be the wildcard
    pub end: String,
    /// Candidates; the check passes if any of them resolves
    pub symbols: Vec<String>,
}

impl SymbolCheck {
    /// Symbols formatted as `[a b c]` for diagnostics
    pub fn symbol_list(&self) -> String {
        format!("[{}]", self.symbols.join(" "))
    }
}

/// A marker literal and the library its annotations target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSyntax {
    pub marker: String,
    pub library: String,
}

impl AnnotationSyntax {
    pub fn new(marker: impl Into<String>, library: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            library: library.into(),
        }
    }
}

impl Default for AnnotationSyntax {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, DEFAULT_LIBRARY)
    }
}

/// Marker used by patch sources
pub const DEFAULT_MARKER: &str = "//libnickel";

/// Library checked by annotations using the default marker
pub const DEFAULT_LIBRARY: &str = "libnickel.so.1.0.0";

/// Source file extensions scanned by default
pub const DEFAULT_EXTENSIONS: &[&str] = &[".c", ".cc", ".cpp", ".h"];
