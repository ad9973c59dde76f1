//! Check expansion
//!
//! Expands every check's version range against the release catalog and
//! groups the checks by (release, library). Each group later costs exactly
//! one binary fetch and one symbol table load.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::annotations::{SourceLocation, SymbolCheck};
use crate::catalog::{Release, ReleaseCatalog};
use crate::version;

/// Which end of a range a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

/// Range endpoint that does not name any catalog release
///
/// Usually a typo or a stale annotation. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeWarning {
    pub location: SourceLocation,
    pub endpoint: Endpoint,
    pub version: String,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: no exact match for the base version in specifier {:?}",
            self.location, self.version
        )
    }
}

/// Checks grouped by release, then library
#[derive(Debug, Clone, Default)]
pub struct CheckMatrix {
    groups: BTreeMap<Release, BTreeMap<String, Vec<SymbolCheck>>>,
    warnings: Vec<RangeWarning>,
    checks: usize,
}

impl CheckMatrix {
    /// Expand `checks` against `catalog`
    pub fn build(checks: &[SymbolCheck], catalog: &ReleaseCatalog) -> Self {
        let mut matrix = Self {
            checks: checks.len(),
            ..Self::default()
        };

        for check in checks {
            for (endpoint, value) in [(Endpoint::Start, &check.start), (Endpoint::End, &check.end)] {
                if version::is_wildcard(value) {
                    continue;
                }
                if version::has_non_numeric_segment(value) {
                    log::warn!(
                        "{}: {} version {:?} has a non-numeric segment which compares as 0",
                        check.location,
                        endpoint,
                        value
                    );
                }
                if catalog.exact_match_count(value) == 0 {
                    let warning = RangeWarning {
                        location: check.location.clone(),
                        endpoint,
                        version: value.clone(),
                    };
                    log::warn!("{}", warning);
                    matrix.warnings.push(warning);
                }
            }

            let mut matched = 0usize;
            for release in catalog.iter().filter(|r| in_range(check, r)) {
                matrix
                    .groups
                    .entry(release.clone())
                    .or_default()
                    .entry(check.library.clone())
                    .or_default()
                    .push(check.clone());
                matched += 1;
            }

            if matched == 0 {
                log::debug!("{}: range matches no known release", check.location);
            }
        }

        log::info!(
            "expanded {} check(s) into {} release/library group(s)",
            matrix.checks,
            matrix.len()
        );
        matrix
    }

    /// Groups in release-ascending, library-lexical order
    pub fn groups(&self) -> impl Iterator<Item = (&Release, &str, &[SymbolCheck])> {
        self.groups.iter().flat_map(|(release, libraries)| {
            libraries
                .iter()
                .map(move |(library, checks)| (release, library.as_str(), checks.as_slice()))
        })
    }

    /// Number of (release, library) groups
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of checks the matrix was built from
    pub fn check_count(&self) -> usize {
        self.checks
    }

    pub fn warnings(&self) -> &[RangeWarning] {
        &self.warnings
    }
}

/// `start <= release <= end`, where a wildcard bound is open
fn in_range(check: &SymbolCheck, release: &Release) -> bool {
    version::compare(&check.start, release.as_str()) != Ordering::Greater
        && version::compare(release.as_str(), &check.end) != Ordering::Greater
}

// ============================================================================
// Tests
// ============================================================================

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn check(start: &str, end: &str, symbols: &[&str]) -> SymbolCheck {
        SymbolCheck {
            location: SourceLocation::new("src/test.c", 1, 1),
            library: "libnickel.so.1.0.0".to_string(),
            start: start.to_string(),
            end: end.to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn releases_of(matrix: &CheckMatrix) -> Vec<String> {
        matrix.groups().map(|(r, _, _)| r.to_string()).collect()
    }

    #[test]
    fn test_inclusive_range_membership() {
        let matrix = CheckMatrix::build(
            &[check("4.6.9960", "4.8.11090", &["sym"])],
            &ReleaseCatalog::default(),
        );

        assert_eq!(
            releases_of(&matrix),
            vec![
                "4.6.9960", "4.6.9995", "4.7.10075", "4.7.10364", "4.7.10413", "4.8.10956",
                "4.8.11073", "4.8.11090",
            ]
        );
        assert!(matrix.warnings().is_empty());
    }

    #[test]
    fn test_open_ended_range() {
        let catalog = ReleaseCatalog::new(["1.0.0", "2.0.0", "3.0.0"]).unwrap();
        let matrix = CheckMatrix::build(&[check("2.0.0", "*", &["sym"])], &catalog);
        assert_eq!(releases_of(&matrix), vec!["2.0.0", "3.0.0"]);
    }

    #[test]
    fn test_no_exact_match_warning() {
        let catalog = ReleaseCatalog::new(["4.6.9960", "4.7.10075"]).unwrap();

        let matrix = CheckMatrix::build(&[check("4.6", "*", &["sym"])], &catalog);
        assert_eq!(matrix.warnings().len(), 0, "4.6 prefixes 4.6.9960");

        let matrix = CheckMatrix::build(&[check("4.5.1", "4.6.9960", &["sym"])], &catalog);
        assert_eq!(matrix.warnings().len(), 1);
        assert_eq!(matrix.warnings()[0].endpoint, Endpoint::Start);
        assert_eq!(matrix.warnings()[0].version, "4.5.1");

        let matrix = CheckMatrix::build(&[check("4.6.9960", "*", &["sym"])], &catalog);
        assert!(matrix.warnings().is_empty());
    }

    #[test]
    fn test_base_version_not_in_catalog_warns() {
        let catalog = ReleaseCatalog::new(["4.6.9960", "4.60.1"]).unwrap();
        let matrix = CheckMatrix::build(&[check("4.6.1", "4.60", &["sym"])], &catalog);

        assert_eq!(matrix.warnings().len(), 1);
        assert_eq!(matrix.warnings()[0].version, "4.6.1");
        assert_eq!(
            matrix.warnings()[0].to_string(),
            "src/test.c:1:1: no exact match for the base version in specifier \"4.6.1\""
        );
    }

    #[test]
    fn test_check_matching_nothing_is_legal() {
        let catalog = ReleaseCatalog::new(["1.0.0"]).unwrap();
        let matrix = CheckMatrix::build(&[check("5.0.0", "*", &["sym"])], &catalog);
        assert!(matrix.is_empty());
        assert_eq!(matrix.check_count(), 1);
    }

    #[test]
    fn test_groups_by_library_in_lexical_order() {
        let catalog = ReleaseCatalog::new(["2.0.0", "1.0.0"]).unwrap();
        let mut other = check("1.0.0", "*", &["other"]);
        other.library = "libadobe.so".to_string();
        let checks = vec![
            check("1.0.0", "*", &["first"]),
            other,
            check("1.0.0", "1.0.0", &["second"]),
        ];

        let matrix = CheckMatrix::build(&checks, &catalog);
        let groups: Vec<(String, String, usize)> = matrix
            .groups()
            .map(|(r, l, c)| (r.to_string(), l.to_string(), c.len()))
            .collect();

        assert_eq!(
            groups,
            vec![
                ("1.0.0".to_string(), "libadobe.so".to_string(), 1),
                ("1.0.0".to_string(), "libnickel.so.1.0.0".to_string(), 2),
                ("2.0.0".to_string(), "libadobe.so".to_string(), 1),
                ("2.0.0".to_string(), "libnickel.so.1.0.0".to_string(), 1),
            ]
        );

        let (_, _, group) = matrix
            .groups()
            .find(|(r, l, _)| r.as_str() == "1.0.0" && *l == "libnickel.so.1.0.0")
            .unwrap();
        assert_eq!(group[0].symbols, vec!["first"]);
        assert_eq!(group[1].symbols, vec!["second"]);
        assert_eq!(matrix.len(), 4);
    }
}
