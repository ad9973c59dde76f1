//! GitHub Actions annotations
//!
//! One `::error` line per source location; failures reported against the
//! same location share a line, with messages joined by an encoded newline.

use std::collections::BTreeMap;

use symcheck_kit::annotations::SourceLocation;
use symcheck_kit::driver::{CheckOutcome, ValidationObserver, ValidationReport};

/// Collects failures by location and prints workflow commands at the end
#[derive(Debug, Default)]
pub struct GithubAnnotations {
    failures: BTreeMap<SourceLocation, Vec<String>>,
}

impl GithubAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotation lines in location order
    pub fn lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|(location, messages)| {
                format!(
                    "::error file={},line={},col={}::{}",
                    location.path.display(),
                    location.line,
                    location.column,
                    messages.join("%0A")
                )
            })
            .collect()
    }
}

impl ValidationObserver for GithubAnnotations {
    fn check_evaluated(&mut self, outcome: &CheckOutcome) {
        if outcome.passed() {
            return;
        }

        self.failures
            .entry(outcome.check.location.clone())
            .or_default()
            .push(format!(
                "one of symbols {} not found in {}@{}",
                outcome.check.symbol_list(),
                outcome.library,
                outcome.release
            ));
    }

    fn finished(&mut self, _report: &ValidationReport) {
        for line in self.lines() {
            println!("{}", line);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
