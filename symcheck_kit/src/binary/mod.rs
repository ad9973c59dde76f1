//! Binary provider
//!
//! Supplies the library binary for a given release. Firmware dumps are kept
//! as one `<release>.tar.xz` archive per release, either behind an HTTP base
//! URL or in a local directory.
//!
//! A release without an archive is not an error: the provider answers
//! [`Fetched::NotAvailable`] and the driver skips that release.

mod archive;

pub use archive::{extract_member, normalize_path, DirectoryArchiveProvider, HttpArchiveProvider};

use std::fmt;
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::catalog::Release;

/// Default location of the firmware dump archives
pub const DEFAULT_ARCHIVE_URL: &str = "https://github.com/pgaskin/kobopatch-testdata/raw/v1/";

/// A library binary extracted from a firmware dump
#[derive(Clone)]
pub struct BinaryImage {
    pub release: Release,
    pub library: String,
    pub data: Vec<u8>,
    /// Hex SHA-256 of `data`
    pub sha256: String,
}

impl BinaryImage {
    pub fn new(release: Release, library: impl Into<String>, data: Vec<u8>) -> Self {
        let sha256 = hex::encode(Sha256::digest(&data));
        Self {
            release,
            library: library.into(),
            data,
            sha256,
        }
    }
}

impl fmt::Debug for BinaryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryImage")
            .field("release", &self.release)
            .field("library", &self.library)
            .field("size", &self.data.len())
            .field("sha256", &self.sha256)
            .finish()
    }
}

/// Result of a fetch
#[derive(Debug)]
pub enum Fetched {
    Binary(BinaryImage),
    /// No dump exists for the release
    NotAvailable,
}

/// Errors that abort the run while fetching a binary
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("get testdata for {release:?} from {url}: {source}")]
    Transport {
        release: String,
        url: String,
        source: Box<ureq::Error>,
    },

    #[error("get testdata for {release:?} from {url}: response status {status}")]
    Status {
        release: String,
        url: String,
        status: u16,
    },

    #[error("open testdata {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("read testdata for {release:?}: {source}")]
    Archive {
        release: String,
        source: std::io::Error,
    },

    #[error("read testdata for {release:?}: file {library:?} not found")]
    MemberNotFound { release: String, library: String },
}

/// Source of library binaries, one per (release, library)
pub trait BinaryProvider {
    /// Fetch `library` as shipped in `release`
    fn fetch(&mut self, release: &Release, library: &str) -> Result<Fetched, ProviderError>;
}

impl<P: BinaryProvider + ?Sized> BinaryProvider for Box<P> {
    fn fetch(&mut self, release: &Release, library: &str) -> Result<Fetched, ProviderError> {
        (**self).fetch(release, library)
    }
}
