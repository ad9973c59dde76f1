//! Symbol check annotations
//!
//! Patch sources declare the symbols they depend on with one-line
//! annotations:
//!
//! ```text
//! //libnickel <start_version> <end_version|*> <symbol>...
//! ```
//!
//! The check passes for a release if any one of the listed symbols exists in
//! the library. [`parser`] turns the fields into a typed [`SymbolCheck`];
//! [`scanner`] finds annotations in a source tree.

pub mod parser;
pub mod scanner;
mod types;

pub use parser::{parse_fields, scan_bytes, scan_line, ParseError};
pub use scanner::{AnnotationScanner, ScanError};
pub use types::{
    AnnotationSyntax, SourceLocation, SymbolCheck, DEFAULT_EXTENSIONS, DEFAULT_LIBRARY,
    DEFAULT_MARKER,
};
