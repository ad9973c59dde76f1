//! Run configuration
//!
//! Merges the settings file with command-line overrides.

use std::path::PathBuf;

use symcheck_kit::settings::Settings;
use symcheck_kit::SymcheckError;

use crate::cli::Cli;

/// Settings file looked up in the source root when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "symcheck.toml";

/// Configuration for a run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Source tree to scan
    pub root: PathBuf,

    /// Engine settings after CLI overrides
    pub settings: Settings,

    /// JSON summary path (None means console-only output)
    pub output_file: Option<PathBuf>,

    /// Emit CI annotations for failures
    pub github_annotations: bool,

    /// Stop after expanding the checks
    pub dry_run: bool,

    /// Suppress progress output
    pub quiet: bool,
}

impl RunConfig {
    /// Build the configuration from parsed arguments
    ///
    /// `github_env` is the value of `GITHUB_ACTIONS`.
    pub fn from_cli(cli: Cli, github_env: Option<&str>) -> Result<Self, SymcheckError> {
        let config_path = match cli.config {
            Some(path) => Some(path),
            None => {
                let candidate = cli.root.join(DEFAULT_CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        };

        let mut settings = match &config_path {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(url) = cli.archive_url {
            settings.archive_url = url;
            settings.archive_dir = None;
        }
        if let Some(dir) = cli.archive_dir {
            settings.archive_dir = Some(dir);
        }

        Ok(Self {
            root: cli.root,
            settings,
            output_file: cli.output,
            github_annotations: cli.github_annotations || github_env == Some("true"),
            dry_run: cli.dry_run,
            quiet: cli.quiet,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
