//! Output generation module
//!
//! The driver's outcome stream feeds independent sinks:
//! - Console (human-readable progress and failure list)
//! - GitHub Actions annotations (CI only)
//! - JSON summary (written after the run when `--output` is given)
//!
//! ```text
//! validate()
//!     └── ObserverSet
//!             ├── ConsoleReporter    → stdout, streaming
//!             └── GithubAnnotations  → stdout, at the end
//! ValidationReport ──► build_summary() → --output file
//! ```

mod console;
mod github;
mod summary;

pub use console::{print_matrix, ConsoleReporter};
pub use github::GithubAnnotations;
pub use summary::build_summary;

use std::path::Path;
use std::time::Duration;

use symcheck_kit::driver::ValidationReport;
use symcheck_kit::matrix::CheckMatrix;

/// Serialize the run summary and write it to `path`
pub fn save_summary(
    path: &Path,
    root: &Path,
    matrix: &CheckMatrix,
    report: &ValidationReport,
    duration: Duration,
) -> Result<(), OutputError> {
    let summary = build_summary(root, matrix, report, duration);
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| OutputError::Serialization(e.to_string()))?;

    std::fs::write(path, json).map_err(|e| OutputError::WriteFile(path.display().to_string(), e))?;
    log::debug!("summary written to {}", path.display());
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during output generation
#[derive(Debug)]
pub enum OutputError {
    /// Failed to serialize the summary
    Serialization(String),
    /// Failed to write the output file
    WriteFile(String, std::io::Error),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Serialization(msg) => write!(f, "Failed to serialize output: {}", msg),
            OutputError::WriteFile(path, e) => write!(f, "Failed to write {}: {}", path, e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Serialization(_) => None,
            OutputError::WriteFile(_, e) => Some(e),
        }
    }
}
