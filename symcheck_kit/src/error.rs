//! Error type for a whole validation run
//!
//! Every variant is fatal: the run stops and exits non-zero. Advisory
//! problems (range warnings, skipped releases) and failed checks are not
//! errors; they are carried by the matrix and the validation report.

use thiserror::Error;

use crate::annotations::ScanError;
use crate::binary::ProviderError;
use crate::catalog::CatalogError;
use crate::settings::SettingsError;
use crate::symbols::ResolveError;

#[derive(Debug, Error)]
pub enum SymcheckError {
    #[error("find symbol checks: {0}")]
    Scan(#[from] ScanError),

    #[error("release catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("get binary: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("load settings: {0}")]
    Settings(#[from] SettingsError),
}

/// Result type for run-level operations
pub type SymcheckResult<T> = Result<T, SymcheckError>;
