//! Run settings
//!
//! Optional TOML file describing where dumps come from, which files are
//! scanned and which releases are known. Every key has a default, so an
//! empty file (or no file) yields the stock configuration.
//!
//! ```toml
//! archive_url = "https://github.com/pgaskin/kobopatch-testdata/raw/v1/"
//! archive_dir = "dumps"          # read <dir>/<release>.tar.xz instead
//! timeout_secs = 300
//! extensions = [".c", ".cc", ".cpp", ".h"]
//! releases = ["4.6.9960", "4.6.9995"]
//!
//! [[annotations]]
//! marker = "//libnickel"
//! library = "libnickel.so.1.0.0"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::annotations::{
    AnnotationScanner, AnnotationSyntax, DEFAULT_EXTENSIONS, DEFAULT_LIBRARY, DEFAULT_MARKER,
};
use crate::binary::{
    BinaryProvider, DirectoryArchiveProvider, HttpArchiveProvider, DEFAULT_ARCHIVE_URL,
};
use crate::catalog::{CatalogError, ReleaseCatalog};

/// Errors loading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Marker/library pair as written in the settings file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationEntry {
    pub marker: String,
    #[serde(default = "default_library")]
    pub library: String,
}

impl From<&AnnotationEntry> for AnnotationSyntax {
    fn from(entry: &AnnotationEntry) -> Self {
        AnnotationSyntax::new(entry.marker.clone(), entry.library.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_archive_url")]
    pub archive_url: String,

    /// Local directory of dump archives; takes precedence over `archive_url`
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Replaces the built-in release catalog
    #[serde(default)]
    pub releases: Option<Vec<String>>,

    #[serde(default = "default_annotations")]
    pub annotations: Vec<AnnotationEntry>,
}

fn default_archive_url() -> String {
    DEFAULT_ARCHIVE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_library() -> String {
    DEFAULT_LIBRARY.to_string()
}

fn default_annotations() -> Vec<AnnotationEntry> {
    vec![AnnotationEntry {
        marker: DEFAULT_MARKER.to_string(),
        library: DEFAULT_LIBRARY.to_string(),
    }]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            archive_url: default_archive_url(),
            archive_dir: None,
            timeout_secs: default_timeout_secs(),
            extensions: default_extensions(),
            releases: None,
            annotations: default_annotations(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// A relative `archive_dir` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            toml::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let (Some(dir), Some(base)) = (settings.archive_dir.as_ref(), path.parent()) {
            if dir.is_relative() {
                settings.archive_dir = Some(base.join(dir));
            }
        }

        settings.validate()?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: PathBuf::from("<string>"),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.annotations.is_empty() {
            return Err(SettingsError::Invalid(
                "at least one [[annotations]] entry is required".to_string(),
            ));
        }
        if let Some(entry) = self.annotations.iter().find(|a| a.marker.trim().is_empty()) {
            return Err(SettingsError::Invalid(format!(
                "annotation marker for library {:?} is empty",
                entry.library
            )));
        }
        if self.extensions.is_empty() {
            return Err(SettingsError::Invalid(
                "extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Release catalog, built-in unless overridden
    pub fn catalog(&self) -> Result<ReleaseCatalog, CatalogError> {
        match &self.releases {
            Some(releases) => ReleaseCatalog::new(releases.iter().cloned()),
            None => Ok(ReleaseCatalog::default()),
        }
    }

    pub fn scanner(&self) -> AnnotationScanner {
        AnnotationScanner::new(
            self.annotations.iter().map(AnnotationSyntax::from).collect(),
            self.extensions.clone(),
        )
    }

    /// Directory provider if `archive_dir` is set, HTTP otherwise
    pub fn provider(&self) -> Box<dyn BinaryProvider> {
        match &self.archive_dir {
            Some(dir) => {
                log::info!("reading firmware dumps from {}", dir.display());
                Box::new(DirectoryArchiveProvider::new(dir.clone()))
            }
            None => {
                log::info!("fetching firmware dumps from {}", self.archive_url);
                Box::new(HttpArchiveProvider::new(
                    self.archive_url.clone(),
                    self.timeout(),
                ))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
