//! Core run logic
//!
//! Scans the source tree, expands the checks and validates every group.

use std::time::Instant;

use symcheck_kit::driver::{validate, ObserverSet};
use symcheck_kit::matrix::CheckMatrix;
use symcheck_kit::symbols::ElfResolver;
use symcheck_kit::SymcheckError;

use crate::config::RunConfig;
use crate::output::{self, ConsoleReporter, GithubAnnotations};

/// Run the checks with the given configuration, returning the exit code
pub fn run_checks(config: &RunConfig) -> Result<i32, RunError> {
    let start = Instant::now();

    let catalog = config.settings.catalog().map_err(SymcheckError::from)?;
    let checks = config
        .settings
        .scanner()
        .scan_tree(&config.root)
        .map_err(SymcheckError::from)?;
    let matrix = CheckMatrix::build(&checks, &catalog);

    if config.dry_run {
        output::print_matrix(&matrix);
        return Ok(0);
    }

    if !config.quiet {
        println!(
            "Checking {} symbol check(s) across {} release/library group(s)",
            checks.len(),
            matrix.len()
        );
    }

    let mut provider = config.settings.provider();
    let mut console = ConsoleReporter::new(matrix.len(), config.quiet);
    let mut github = GithubAnnotations::new();

    let report = {
        let mut observers = ObserverSet::new().with(&mut console);
        if config.github_annotations {
            observers.push(&mut github);
        }
        validate(&matrix, &mut provider, &ElfResolver, &mut observers)?
    };

    if let Some(path) = &config.output_file {
        output::save_summary(path, &config.root, &matrix, &report, start.elapsed())?;
        if !config.quiet {
            println!("Results saved to: {}", path.display());
        }
    }

    Ok(report.exit_code())
}

/// Errors that abort a run
#[derive(Debug)]
pub enum RunError {
    /// Scanning, fetching or symbol extraction failed
    Check(SymcheckError),
    /// Failed to write the summary
    Output(output::OutputError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Check(e) => write!(f, "{}", e),
            RunError::Output(e) => write!(f, "Output generation failed: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Check(e) => Some(e),
            RunError::Output(e) => Some(e),
        }
    }
}

impl From<SymcheckError> for RunError {
    fn from(e: SymcheckError) -> Self {
        RunError::Check(e)
    }
}

impl From<output::OutputError> for RunError {
    fn from(e: output::OutputError) -> Self {
        RunError::Output(e)
    }
}
