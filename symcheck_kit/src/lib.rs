//! # Symcheck Kit
//!
//! Engine for checking that the symbols a patch set depends on exist in
//! every firmware release the patches claim to support.
//!
//! ## Modules
//!
//! - `version` - Dotted-numeric version comparison with a `*` wildcard
//! - `annotations` - Annotation parser and source tree scanner
//! - `catalog` - Known firmware releases
//! - `matrix` - Expands version ranges into (release, library) groups
//! - `binary` - Fetches library binaries from firmware dump archives
//! - `symbols` - Dynamic symbol tables
//! - `driver` - Runs every group and reports outcomes
//! - `settings` - TOML configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use symcheck_kit::driver::{validate, NoopObserver};
//! use symcheck_kit::matrix::CheckMatrix;
//! use symcheck_kit::settings::Settings;
//! use symcheck_kit::symbols::ElfResolver;
//!
//! let settings = Settings::default();
//! let checks = settings.scanner().scan_tree(Path::new("src"))?;
//! let matrix = CheckMatrix::build(&checks, &settings.catalog()?);
//!
//! let mut provider = settings.provider();
//! let report = validate(&matrix, &mut provider, &ElfResolver, &mut NoopObserver)?;
//! std::process::exit(report.exit_code());
//! ```

pub mod annotations;
pub mod binary;
pub mod catalog;
pub mod driver;
pub mod error;
pub mod matrix;
pub mod settings;
pub mod symbols;
pub mod version;

pub use error::{SymcheckError, SymcheckResult};
