//! Annotation parser
//!
//! Turns the fields following a marker into a [`SymbolCheck`]. The parser
//! knows nothing about comments or files; [`scan_line`] only locates the
//! marker literal inside a line of text.

use thiserror::Error;

use super::types::{AnnotationSyntax, SourceLocation, SymbolCheck};
use crate::version;

/// Malformed annotation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "parse {location}: expected comment to be in the format \
     '{marker} <start_version> <end_version|*> <sym>...'"
)]
pub struct ParseError {
    pub location: SourceLocation,
    pub marker: String,
}

/// Build a check from already split annotation fields
///
/// Requires at least three fields and a concrete start version.
pub fn parse_fields<S: AsRef<str>>(
    fields: &[S],
    syntax: &AnnotationSyntax,
    location: SourceLocation,
) -> Result<SymbolCheck, ParseError> {
    let fields: Vec<&str> = fields.iter().map(|f| f.as_ref()).collect();

    match fields.as_slice() {
        [start, end, symbols @ ..] if !symbols.is_empty() && !version::is_wildcard(start) => {
            Ok(SymbolCheck {
                location,
                library: syntax.library.clone(),
                start: (*start).to_string(),
                end: (*end).to_string(),
                symbols: symbols.iter().map(|s| (*s).to_string()).collect(),
            })
        }
        _ => Err(ParseError {
            location,
            marker: syntax.marker.clone(),
        }),
    }
}

/// Look for an annotation in a single line
///
/// Returns `Ok(None)` if the marker does not occur in the line. The marker
/// may appear anywhere; only its first occurrence is considered.
pub fn scan_line(
    line: &str,
    line_number: usize,
    path: &std::path::Path,
    syntax: &AnnotationSyntax,
) -> Result<Option<SymbolCheck>, ParseError> {
    scan_bytes(line.as_bytes(), line_number, path, syntax)
}

/// Like [`scan_line`] for a raw line that need not be valid UTF-8
///
/// The column is the byte offset of the marker plus one. Only the text after
/// the marker is decoded, lossily.
pub fn scan_bytes(
    line: &[u8],
    line_number: usize,
    path: &std::path::Path,
    syntax: &AnnotationSyntax,
) -> Result<Option<SymbolCheck>, ParseError> {
    let marker = syntax.marker.as_bytes();
    if marker.is_empty() {
        return Ok(None);
    }
    let Some(index) = line.windows(marker.len()).position(|w| w == marker) else {
        return Ok(None);
    };

    let rest = String::from_utf8_lossy(&line[index + marker.len()..]);
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let location = SourceLocation::new(path, line_number, index + 1);

    parse_fields(&fields, syntax, location).map(Some)
}

// ============================================================================
// Tests
// ============================================================================
