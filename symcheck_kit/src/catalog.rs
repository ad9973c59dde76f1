//! Release catalog
//!
//! The fixed, ordered list of firmware releases that version ranges are
//! matched against. Supporting a new firmware release means appending it to
//! [`DEFAULT_RELEASES`] (or to `releases` in the config file).

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::version;

/// Known firmware releases, oldest first
pub const DEFAULT_RELEASES: &[&str] = &[
    "4.6.9960", "4.6.9995", "4.7.10075", "4.7.10364", "4.7.10413",
    "4.8.10956", "4.8.11073", "4.8.11090", "4.9.11311", "4.9.11314",
    "4.10.11591", "4.10.11655", "4.11.11911", "4.11.11976", "4.11.11980",
    "4.11.11982", "4.11.12019", "4.12.12111", "4.13.12638", "4.14.12777",
    "4.15.12920", "4.16.13162", "4.17.13651", "4.17.13694", "4.18.13737",
    "4.19.14123", "4.20.14601", "4.20.14617", "4.20.14622", "4.21.15015",
    "4.22.15190", "4.22.15268", "4.23.15505", "4.24.15672", "4.24.15676",
    "4.25.15875", "4.26.16704", "4.28.17623", "4.28.17820", "4.28.17826",
    "4.28.17925", "4.28.18220", "4.29.18730", "4.30.18838", "4.31.19086",
    "4.32.19501", "4.33.19608", "4.33.19611", "4.33.19759", "4.34.20097",
    "4.35.20400", "4.36.21095",
];

/// A firmware release identifier
///
/// Ordered and compared with [`version::compare`]. Never the wildcard.
#[derive(Debug, Clone)]
pub struct Release(String);

impl Release {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq for Release {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Release {}

impl PartialOrd for Release {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Release {
    fn cmp(&self, other: &Self) -> Ordering {
        version::compare(&self.0, &other.0)
    }
}

/// Invalid catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("release catalog entry {index} is empty")]
    Empty { index: usize },

    #[error("release catalog entry {index} is the wildcard")]
    Wildcard { index: usize },

    #[error("release catalog entry {release:?} duplicates {existing:?}")]
    Duplicate { release: String, existing: String },
}

/// Ordered set of known releases
#[derive(Debug, Clone)]
pub struct ReleaseCatalog {
    releases: Vec<Release>,
}

impl ReleaseCatalog {
    /// Build a catalog from release strings
    ///
    /// Entries keep their given order. Entries that compare equal to an
    /// earlier one are rejected, so every release maps to its own group.
    pub fn new<I, S>(releases: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<Release> = Vec::new();

        for (index, release) in releases.into_iter().enumerate() {
            let release = release.into();
            if release.trim().is_empty() {
                return Err(CatalogError::Empty { index });
            }
            if version::is_wildcard(&release) {
                return Err(CatalogError::Wildcard { index });
            }
            if version::has_non_numeric_segment(&release) {
                log::warn!(
                    "release {:?} has a non-numeric segment which compares as 0",
                    release
                );
            }

            let release = Release(release);
            if let Some(existing) = out.iter().find(|r| **r == release) {
                return Err(CatalogError::Duplicate {
                    release: release.0,
                    existing: existing.0.clone(),
                });
            }
            out.push(release);
        }

        Ok(Self { releases: out })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Release> {
        self.releases.iter()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Count entries that `endpoint` names exactly or as a dotted prefix
    ///
    /// `4.6` matches `4.6.9960` but not `4.60.1`.
    pub fn exact_match_count(&self, endpoint: &str) -> usize {
        let prefix = format!("{}.", endpoint);
        self.releases
            .iter()
            .filter(|r| format!("{}.", r.as_str()).starts_with(&prefix))
            .count()
    }
}

impl Default for ReleaseCatalog {
    fn default() -> Self {
        Self {
            releases: DEFAULT_RELEASES
                .iter()
                .map(|r| Release((*r).to_string()))
                .collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
