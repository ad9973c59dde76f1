//! Dotted-numeric version comparison
//!
//! Versions are compared segment by segment as integers. The wildcard `*`
//! compares equal to every version so it can stand for an open range bound.

use std::cmp::Ordering;
use std::num::IntErrorKind;

/// Wildcard accepted as a range endpoint
pub const WILDCARD: &str = "*";

/// Check whether a version string is the wildcard
pub fn is_wildcard(version: &str) -> bool {
    version == WILDCARD
}

/// Compare two version strings
///
/// Either side being the wildcard yields `Equal`. A segment that does not
/// parse as an integer counts as `0`; one that is out of range saturates at
/// `i64::MAX` (or `i64::MIN`). When one version runs out of segments
/// first, it sorts before the other (`4.6` < `4.6.9960`).
pub fn compare(a: &str, b: &str) -> Ordering {
    if is_wildcard(a) || is_wildcard(b) {
        return Ordering::Equal;
    }

    let a = segments(a);
    let b = segments(b);

    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    a.len().cmp(&b.len())
}

/// Whether any segment of the version fails to parse as an integer
///
/// Such segments silently compare as `0`, which is usually a typo.
pub fn has_non_numeric_segment(version: &str) -> bool {
    !is_wildcard(version) && version.split('.').any(|s| parse_segment(s).is_none())
}

fn segments(version: &str) -> Vec<i64> {
    version
        .split('.')
        .map(|s| parse_segment(s).unwrap_or(0))
        .collect()
}

/// `None` if the segment is not an integer at all
fn parse_segment(segment: &str) -> Option<i64> {
    match segment.parse::<i64>() {
        Ok(value) => Some(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
