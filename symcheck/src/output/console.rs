//! Console output formatting
//!
//! Streams progress while the driver runs and prints the consolidated failure
//! list at the end.

use std::io::{self, IsTerminal, Write};

use symcheck_kit::catalog::Release;
use symcheck_kit::driver::{CheckOutcome, ValidationObserver, ValidationReport};
use symcheck_kit::matrix::CheckMatrix;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Human-readable progress and failure report
///
/// Write errors on the console are ignored.
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
    total_groups: usize,
    group: usize,
    quiet: bool,
    color: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn new(total_groups: usize, quiet: bool) -> Self {
        let color = io::stdout().is_terminal();
        Self::with_writer(io::stdout(), total_groups, quiet, color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn with_writer(out: W, total_groups: usize, quiet: bool, color: bool) -> Self {
        Self {
            out,
            total_groups,
            group: 0,
            quiet,
            color,
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

impl<W: Write> ValidationObserver for ConsoleReporter<W> {
    fn group_started(&mut self, release: &Release, library: &str, checks: usize) {
        self.group += 1;
        if self.quiet {
            return;
        }
        let _ = writeln!(
            self.out,
            "[{}/{}] checking {}@{} ({} check{})",
            self.group,
            self.total_groups,
            library,
            release,
            checks,
            if checks == 1 { "" } else { "s" }
        );
    }

    fn group_skipped(&mut self, _release: &Release, _library: &str) {
        if !self.quiet {
            let icon = self.paint(YELLOW, "-");
            let _ = writeln!(self.out, "       {} no data available, skipping", icon);
        }
    }

    fn check_evaluated(&mut self, outcome: &CheckOutcome) {
        let passed = outcome.passed();
        if self.quiet && passed {
            return;
        }

        let icon = if passed {
            self.paint(GREEN, "✓")
        } else {
            self.paint(RED, "✗")
        };
        let _ = writeln!(
            self.out,
            "       {} {}: checking for one of {}",
            icon,
            outcome.check.location,
            outcome.check.symbol_list()
        );

        for resolution in &outcome.resolutions {
            let _ = match resolution.offset {
                Some(offset) => {
                    writeln!(self.out, "           {} found at {:#x}", resolution.name, offset)
                }
                None => writeln!(self.out, "           {} not found", resolution.name),
            };
        }
    }

    fn finished(&mut self, report: &ValidationReport) {
        if report.is_success() {
            return;
        }

        let heading = self.paint(RED, "check failed");
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "{}", heading);
        for failure in &report.failures {
            let _ = writeln!(self.out, "    {}", failure);
        }
        let _ = writeln!(self.out);
        let _ = writeln!(
            self.out,
            "{} evaluated, {} passed, {} failed, {} release(s) skipped",
            report.evaluated,
            report.passed,
            report.failures.len(),
            report.skipped.len()
        );
    }
}

/// Print the release/library groups of a matrix without validating them
pub fn print_matrix(matrix: &CheckMatrix) {
    let _ = write_matrix(&mut io::stdout().lock(), matrix);
}

fn write_matrix<W: Write>(out: &mut W, matrix: &CheckMatrix) -> io::Result<()> {
    if matrix.is_empty() {
        return writeln!(out, "No symbol checks apply to any known release");
    }

    for (release, library, checks) in matrix.groups() {
        writeln!(out, "{}@{}: {} check(s)", library, release, checks.len())?;
        for check in checks {
            writeln!(out, "    {} {}", check.location, check.symbol_list())?;
        }
    }
    writeln!(out)?;
    writeln!(
        out,
        "{} check(s) in {} release/library group(s), {} warning(s)",
        matrix.check_count(),
        matrix.len(),
        matrix.warnings().len()
    )
}

// ============================================================================
// Tests
// ============================================================================

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use symcheck_kit::annotations::{SourceLocation, SymbolCheck};
    use symcheck_kit::catalog::ReleaseCatalog;
    use symcheck_kit::driver::{CheckFailure, SymbolResolution};

    const LIB: &str = "libnickel.so.1.0.0";

    fn check(line: usize, symbols: &[&str]) -> SymbolCheck {
        SymbolCheck {
            location: SourceLocation::new("src/menu.c", line, 1),
            library: LIB.to_string(),
            start: "1.0.0".to_string(),
            end: "*".to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn release(catalog: &ReleaseCatalog, version: &str) -> Release {
        catalog.iter().find(|r| r.as_str() == version).cloned().unwrap()
    }

    fn outcome(check: SymbolCheck, release: Release, offsets: &[Option<u64>]) -> CheckOutcome {
        let resolutions = check
            .symbols
            .iter()
            .zip(offsets)
            .map(|(name, offset)| SymbolResolution {
                name: name.clone(),
                offset: *offset,
            })
            .collect();
        CheckOutcome {
            check,
            release,
            library: LIB.to_string(),
            resolutions,
        }
    }

    fn text(reporter: ConsoleReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.out).unwrap()
    }

    #[test]
    fn test_progress_lines() {
        let catalog = ReleaseCatalog::new(["1.0.0", "2.0.0"]).unwrap();
        let v1 = release(&catalog, "1.0.0");
        let v2 = release(&catalog, "2.0.0");
        let mut reporter = ConsoleReporter::with_writer(Vec::new(), 2, false, false);

        reporter.group_started(&v1, LIB, 1);
        reporter.check_evaluated(&outcome(check(3, &["a", "b"]), v1.clone(), &[None, Some(0x1f00)]));
        reporter.group_started(&v2, LIB, 1);
        reporter.group_skipped(&v2, LIB);
        reporter.finished(&ValidationReport::default());

        assert_eq!(
            text(reporter),
            "[1/2] checking libnickel.so.1.0.0@1.0.0 (1 check)\n\
             \x20      ✓ src/menu.c:3:1: checking for one of [a b]\n\
             \x20          a not found\n\
             \x20          b found at 0x1f00\n\
             [2/2] checking libnickel.so.1.0.0@2.0.0 (1 check)\n\
             \x20      - no data available, skipping\n"
        );
    }

    #[test]
    fn test_failure_summary() {
        let catalog = ReleaseCatalog::new(["2.0.0"]).unwrap();
        let v2 = release(&catalog, "2.0.0");
        let mut reporter = ConsoleReporter::with_writer(Vec::new(), 1, false, false);

        let failed = check(7, &["gone"]);
        reporter.check_evaluated(&outcome(failed.clone(), v2.clone(), &[None]));
        reporter.finished(&ValidationReport {
            evaluated: 1,
            failures: vec![CheckFailure {
                check: failed,
                release: v2,
                library: LIB.to_string(),
            }],
            ..ValidationReport::default()
        });

        let output = text(reporter);
        assert!(output.contains("✗ src/menu.c:7:1: checking for one of [gone]"));
        assert!(output.contains(
            "check failed\n    src/menu.c:7:1: one of [gone] not found in libnickel.so.1.0.0@2.0.0\n"
        ));
        assert!(output.ends_with("1 evaluated, 0 passed, 1 failed, 0 release(s) skipped\n"));
    }

    #[test]
    fn test_quiet_prints_only_failures() {
        let catalog = ReleaseCatalog::new(["1.0.0"]).unwrap();
        let v1 = release(&catalog, "1.0.0");
        let mut reporter = ConsoleReporter::with_writer(Vec::new(), 1, true, false);

        reporter.group_started(&v1, LIB, 2);
        reporter.check_evaluated(&outcome(check(1, &["ok"]), v1.clone(), &[Some(0x10)]));
        reporter.check_evaluated(&outcome(check(2, &["gone"]), v1.clone(), &[None]));
        reporter.group_skipped(&v1, LIB);

        assert_eq!(
            text(reporter),
            "       ✗ src/menu.c:2:1: checking for one of [gone]\n           gone not found\n"
        );
    }

    #[test]
    fn test_color_only_when_enabled() {
        let catalog = ReleaseCatalog::new(["1.0.0"]).unwrap();
        let v1 = release(&catalog, "1.0.0");
        let mut reporter = ConsoleReporter::with_writer(Vec::new(), 1, false, true);

        reporter.check_evaluated(&outcome(check(1, &["ok"]), v1, &[Some(0x10)]));
        assert!(text(reporter).contains("\x1b[32m✓\x1b[0m"));
    }

    #[test]
    fn test_write_matrix() {
        let catalog = ReleaseCatalog::new(["1.0.0", "2.0.0"]).unwrap();
        let matrix = CheckMatrix::build(&[check(4, &["a"])], &catalog);
        let mut out = Vec::new();

        write_matrix(&mut out, &matrix).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "libnickel.so.1.0.0@1.0.0: 1 check(s)\n    src/menu.c:4:1 [a]\n\
             libnickel.so.1.0.0@2.0.0: 1 check(s)\n    src/menu.c:4:1 [a]\n\
             \n1 check(s) in 2 release/library group(s), 0 warning(s)\n"
        );

        let mut out = Vec::new();
        write_matrix(&mut out, &CheckMatrix::build(&[], &catalog)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No symbol checks apply to any known release\n");
    }
}
