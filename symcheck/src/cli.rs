//! Command-line interface parsing

use std::path::PathBuf;

use clap::Parser;

/// Check that annotated symbols exist in every supported firmware release
#[derive(Debug, Parser)]
#[command(name = "symcheck", version, about, long_about = None)]
#[command(after_help = "EXIT CODES:\n    0    All checks passed (or there were none)\n    1    A check failed, or the run could not complete")]
pub struct Cli {
    /// Source tree to scan for annotations
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Settings file (default: <ROOT>/symcheck.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the firmware dump archives
    #[arg(long, value_name = "URL", conflicts_with = "archive_dir")]
    pub archive_url: Option<String>,

    /// Read <DIR>/<release>.tar.xz instead of downloading
    #[arg(long, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Write a JSON summary of the run
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit GitHub Actions error annotations (automatic when GITHUB_ACTIONS=true)
    #[arg(long)]
    pub github_annotations: bool,

    /// Scan and expand checks, print the release/library groups, fetch nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Only print failures
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Default log filter for the selected verbosity
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
