//! Validation driver
//!
//! Walks the check matrix in release, library, scan order. Every
//! (release, library) group costs one fetch and one symbol table load, shared
//! by all checks in the group. Progress is reported to a
//! [`ValidationObserver`] as it happens; the returned [`ValidationReport`]
//! carries the aggregated result.
//!
//! ```text
//! CheckMatrix ──► for each (release, library)
//!                   ├── BinaryProvider::fetch   (NotAvailable → skip group)
//!                   ├── SymbolResolver::load
//!                   └── for each check: resolve every candidate
//!                           └── observer.check_evaluated(outcome)
//! ```

use crate::annotations::SymbolCheck;
use crate::binary::{BinaryProvider, Fetched};
use crate::catalog::Release;
use crate::error::SymcheckError;
use crate::matrix::CheckMatrix;
use crate::symbols::{SymbolResolver, SymbolTable};

/// Resolution of one candidate symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolResolution {
    pub name: String,
    pub offset: Option<u64>,
}

/// Result of one check against one (release, library)
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub check: SymbolCheck,
    pub release: Release,
    pub library: String,
    pub resolutions: Vec<SymbolResolution>,
}

impl CheckOutcome {
    /// Resolve every candidate of `check` against `table`
    pub fn evaluate(
        check: &SymbolCheck,
        release: &Release,
        library: &str,
        table: &dyn SymbolTable,
    ) -> Self {
        let resolutions = check
            .symbols
            .iter()
            .map(|name| SymbolResolution {
                name: name.clone(),
                offset: table.resolve(name),
            })
            .collect();

        Self {
            check: check.clone(),
            release: release.clone(),
            library: library.to_string(),
            resolutions,
        }
    }

    /// At least one candidate resolved
    pub fn passed(&self) -> bool {
        self.resolutions.iter().any(|r| r.offset.is_some())
    }
}

/// A check where no candidate resolved
#[derive(Debug, Clone)]
pub struct CheckFailure {
    pub check: SymbolCheck,
    pub release: Release,
    pub library: String,
}

impl CheckFailure {
    /// `one of [a b] not found in lib@release`
    pub fn message(&self) -> String {
        format!(
            "one of {} not found in {}@{}",
            self.check.symbol_list(),
            self.library,
            self.release
        )
    }
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.check.location, self.message())
    }
}

/// Binary that was analysed during the run
#[derive(Debug, Clone)]
pub struct AnalysedBinary {
    pub release: Release,
    pub library: String,
    pub sha256: String,
    pub symbols: usize,
}

/// Group skipped because no binary was available
#[derive(Debug, Clone)]
pub struct SkippedGroup {
    pub release: Release,
    pub library: String,
    pub checks: usize,
}

/// Aggregated result of a validation run
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub evaluated: usize,
    pub passed: usize,
    pub failures: Vec<CheckFailure>,
    pub skipped: Vec<SkippedGroup>,
    pub binaries: Vec<AnalysedBinary>,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// 0 if every evaluated check passed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Receives validation progress as it happens
///
/// All methods default to doing nothing.
pub trait ValidationObserver {
    fn group_started(&mut self, _release: &Release, _library: &str, _checks: usize) {}

    fn group_skipped(&mut self, _release: &Release, _library: &str) {}

    fn check_evaluated(&mut self, _outcome: &CheckOutcome) {}

    fn finished(&mut self, _report: &ValidationReport) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ValidationObserver for NoopObserver {}

/// Forwards every event to each observer in order
#[derive(Default)]
pub struct ObserverSet<'a> {
    observers: Vec<&'a mut dyn ValidationObserver>,
}

impl<'a> ObserverSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: &'a mut dyn ValidationObserver) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push(&mut self, observer: &'a mut dyn ValidationObserver) {
        self.observers.push(observer);
    }
}

impl ValidationObserver for ObserverSet<'_> {
    fn group_started(&mut self, release: &Release, library: &str, checks: usize) {
        for observer in &mut self.observers {
            observer.group_started(release, library, checks);
        }
    }

    fn group_skipped(&mut self, release: &Release, library: &str) {
        for observer in &mut self.observers {
            observer.group_skipped(release, library);
        }
    }

    fn check_evaluated(&mut self, outcome: &CheckOutcome) {
        for observer in &mut self.observers {
            observer.check_evaluated(outcome);
        }
    }

    fn finished(&mut self, report: &ValidationReport) {
        for observer in &mut self.observers {
            observer.finished(report);
        }
    }
}

/// Validate every group of `matrix`
///
/// Fetch and load errors abort the run; nothing is reported to
/// `observer.finished` in that case.
pub fn validate(
    matrix: &CheckMatrix,
    provider: &mut dyn BinaryProvider,
    resolver: &dyn SymbolResolver,
    observer: &mut dyn ValidationObserver,
) -> Result<ValidationReport, SymcheckError> {
    let mut report = ValidationReport::default();

    for (release, library, checks) in matrix.groups() {
        if checks.is_empty() {
            continue;
        }

        log::debug!("checking {}@{} ({} check(s))", library, release, checks.len());
        observer.group_started(release, library, checks.len());

        let image = match provider.fetch(release, library)? {
            Fetched::Binary(image) => image,
            Fetched::NotAvailable => {
                log::warn!("{}@{}: no data available, skipping", library, release);
                report.skipped.push(SkippedGroup {
                    release: release.clone(),
                    library: library.to_string(),
                    checks: checks.len(),
                });
                observer.group_skipped(release, library);
                continue;
            }
        };

        let table = resolver.load(&image)?;
        report.binaries.push(AnalysedBinary {
            release: release.clone(),
            library: library.to_string(),
            sha256: image.sha256.clone(),
            symbols: table.len(),
        });

        for check in checks {
            let outcome = CheckOutcome::evaluate(check, release, library, table.as_ref());
            report.evaluated += 1;

            if outcome.passed() {
                report.passed += 1;
            } else {
                let failure = CheckFailure {
                    check: check.clone(),
                    release: release.clone(),
                    library: library.to_string(),
                };
                log::debug!("{}", failure);
                report.failures.push(failure);
            }

            observer.check_evaluated(&outcome);
        }
    }

    log::info!(
        "validated {} check outcome(s): {} passed, {} failed, {} group(s) skipped",
        report.evaluated,
        report.passed,
        report.failures.len(),
        report.skipped.len()
    );
    observer.finished(&report);
    Ok(report)
}

// ============================================================================
// Tests
// ============================================================================

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::SourceLocation;
    use crate::binary::{BinaryImage, ProviderError};
    use crate::catalog::ReleaseCatalog;
    use crate::symbols::ResolveError;
    use std::cell::Cell;
    use std::collections::{HashMap, HashSet};

    const LIB: &str = "libnickel.so.1.0.0";

    /// Serves one fake binary per release; the "binary" is the list of
    /// symbol names it defines, newline separated
    #[derive(Default)]
    struct FakeProvider {
        binaries: HashMap<String, Vec<&'static str>>,
        fetches: Vec<String>,
        fail_on: Option<String>,
    }

    impl FakeProvider {
        fn with(mut self, release: &str, symbols: &[&'static str]) -> Self {
            self.binaries.insert(release.to_string(), symbols.to_vec());
            self
        }
    }

    impl BinaryProvider for FakeProvider {
        fn fetch(&mut self, release: &Release, library: &str) -> Result<Fetched, ProviderError> {
            self.fetches.push(format!("{}@{}", library, release));
            if self.fail_on.as_deref() == Some(release.as_str()) {
                return Err(ProviderError::Status {
                    release: release.to_string(),
                    url: "http://test".to_string(),
                    status: 500,
                });
            }
            Ok(match self.binaries.get(release.as_str()) {
                Some(symbols) => Fetched::Binary(BinaryImage::new(
                    release.clone(),
                    library,
                    symbols.join("\n").into_bytes(),
                )),
                None => Fetched::NotAvailable,
            })
        }
    }

    struct FakeTable(HashSet<String>);

    impl SymbolTable for FakeTable {
        fn resolve(&self, name: &str) -> Option<u64> {
            self.0.contains(name).then_some(0x1000)
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    #[derive(Default)]
    struct FakeResolver {
        loads: Cell<usize>,
    }

    impl SymbolResolver for FakeResolver {
        fn load(&self, image: &BinaryImage) -> Result<Box<dyn SymbolTable>, ResolveError> {
            self.loads.set(self.loads.get() + 1);
            let text = String::from_utf8(image.data.clone()).unwrap();
            Ok(Box::new(FakeTable(
                text.lines().filter(|l| !l.is_empty()).map(String::from).collect(),
            )))
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        finished: bool,
    }

    impl ValidationObserver for Recorder {
        fn group_started(&mut self, release: &Release, library: &str, checks: usize) {
            self.events.push(format!("start {}@{} {}", library, release, checks));
        }

        fn group_skipped(&mut self, release: &Release, library: &str) {
            self.events.push(format!("skip {}@{}", library, release));
        }

        fn check_evaluated(&mut self, outcome: &CheckOutcome) {
            self.events.push(format!(
                "{} {} {}",
                if outcome.passed() { "pass" } else { "fail" },
                outcome.check.symbols.join(","),
                outcome.release
            ));
        }

        fn finished(&mut self, _report: &ValidationReport) {
            self.finished = true;
        }
    }

    fn check(line: usize, start: &str, end: &str, symbols: &[&str]) -> SymbolCheck {
        SymbolCheck {
            location: SourceLocation::new("src/patch.c", line, 1),
            library: LIB.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn catalog(releases: &[&str]) -> ReleaseCatalog {
        ReleaseCatalog::new(releases.iter().copied()).unwrap()
    }

    #[test]
    fn test_end_to_end_failure_in_newer_release() {
        let matrix = CheckMatrix::build(
            &[check(1, "1.0.0", "2.0.0", &["foo"])],
            &catalog(&["1.0.0", "2.0.0"]),
        );
        let mut provider = FakeProvider::default()
            .with("1.0.0", &["foo"])
            .with("2.0.0", &["bar"]);

        let report =
            validate(&matrix, &mut provider, &FakeResolver::default(), &mut NoopObserver).unwrap();

        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.evaluated, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].release.as_str(), "2.0.0");
        assert_eq!(report.failures[0].library, LIB);
        assert_eq!(
            report.failures[0].to_string(),
            "src/patch.c:1:1: one of [foo] not found in libnickel.so.1.0.0@2.0.0"
        );
    }

    #[test]
    fn test_or_semantics() {
        let matrix = CheckMatrix::build(
            &[check(1, "1.0.0", "*", &["a", "b"])],
            &catalog(&["1.0.0", "2.0.0"]),
        );
        let mut provider = FakeProvider::default()
            .with("1.0.0", &["b"])
            .with("2.0.0", &["c"]);
        let mut recorder = Recorder::default();

        let report =
            validate(&matrix, &mut provider, &FakeResolver::default(), &mut recorder).unwrap();

        assert_eq!(report.passed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].check.symbols, vec!["a", "b"]);
        assert_eq!(report.failures[0].message(), "one of [a b] not found in libnickel.so.1.0.0@2.0.0");
        assert!(recorder.events.contains(&"pass a,b 1.0.0".to_string()));
        assert!(recorder.events.contains(&"fail a,b 2.0.0".to_string()));
    }

    #[test]
    fn test_group_fetched_and_loaded_once() {
        let checks: Vec<SymbolCheck> = (1..=5).map(|i| check(i, "1.0.0", "*", &["foo"])).collect();
        let matrix = CheckMatrix::build(&checks, &catalog(&["1.0.0"]));
        let mut provider = FakeProvider::default().with("1.0.0", &["foo"]);
        let resolver = FakeResolver::default();

        let report = validate(&matrix, &mut provider, &resolver, &mut NoopObserver).unwrap();

        assert_eq!(report.evaluated, 5);
        assert_eq!(provider.fetches, vec![format!("{}@1.0.0", LIB)]);
        assert_eq!(resolver.loads.get(), 1);
        assert_eq!(report.binaries.len(), 1);
        assert_eq!(report.binaries[0].symbols, 1);
    }

    #[test]
    fn test_missing_binary_skips_group() {
        let matrix = CheckMatrix::build(
            &[check(1, "1.0.0", "*", &["foo"]), check(2, "1.0.0", "*", &["nope"])],
            &catalog(&["1.0.0", "2.0.0"]),
        );
        let mut provider = FakeProvider::default().with("2.0.0", &["foo", "nope"]);
        let mut recorder = Recorder::default();

        let report =
            validate(&matrix, &mut provider, &FakeResolver::default(), &mut recorder).unwrap();

        assert!(report.is_success());
        assert_eq!(report.evaluated, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].release.as_str(), "1.0.0");
        assert_eq!(report.skipped[0].checks, 2);
        assert_eq!(
            recorder.events,
            vec![
                format!("start {}@1.0.0 2", LIB),
                format!("skip {}@1.0.0", LIB),
                format!("start {}@2.0.0 2", LIB),
                "pass foo 2.0.0".to_string(),
                "pass nope 2.0.0".to_string(),
            ]
        );
        assert!(recorder.finished);
    }

    #[test]
    fn test_releases_processed_in_version_order() {
        let matrix = CheckMatrix::build(
            &[check(1, "1.0.0", "*", &["foo"])],
            &catalog(&["1.10.0", "1.9.0", "1.0.0"]),
        );
        let mut provider = FakeProvider::default()
            .with("1.0.0", &["foo"])
            .with("1.9.0", &["foo"])
            .with("1.10.0", &["foo"]);

        validate(&matrix, &mut provider, &FakeResolver::default(), &mut NoopObserver).unwrap();

        assert_eq!(
            provider.fetches,
            vec![
                format!("{}@1.0.0", LIB),
                format!("{}@1.9.0", LIB),
                format!("{}@1.10.0", LIB),
            ]
        );
    }

    #[test]
    fn test_fetch_error_aborts_without_finishing() {
        let matrix = CheckMatrix::build(
            &[check(1, "1.0.0", "*", &["foo"])],
            &catalog(&["1.0.0", "2.0.0", "3.0.0"]),
        );
        let mut provider = FakeProvider {
            fail_on: Some("2.0.0".to_string()),
            ..FakeProvider::default()
        }
        .with("1.0.0", &["foo"])
        .with("3.0.0", &["foo"]);
        let mut recorder = Recorder::default();

        let result = validate(&matrix, &mut provider, &FakeResolver::default(), &mut recorder);

        assert!(matches!(result, Err(SymcheckError::Provider(_))));
        assert!(!recorder.finished);
        assert_eq!(provider.fetches.len(), 2);
    }

    #[test]
    fn test_empty_matrix_succeeds() {
        let matrix = CheckMatrix::build(&[], &catalog(&["1.0.0"]));
        let mut provider = FakeProvider::default();

        let report =
            validate(&matrix, &mut provider, &FakeResolver::default(), &mut NoopObserver).unwrap();

        assert_eq!(report.exit_code(), 0);
        assert!(provider.fetches.is_empty());
    }

    #[test]
    fn test_observer_set_fans_out() {
        let matrix = CheckMatrix::build(&[check(1, "1.0.0", "*", &["foo"])], &catalog(&["1.0.0"]));
        let mut provider = FakeProvider::default().with("1.0.0", &["foo"]);
        let mut first = Recorder::default();
        let mut second = Recorder::default();

        {
            let mut set = ObserverSet::new().with(&mut first).with(&mut second);
            validate(&matrix, &mut provider, &FakeResolver::default(), &mut set).unwrap();
        }

        assert_eq!(first.events, second.events);
        assert!(first.finished && second.finished);
    }
}
