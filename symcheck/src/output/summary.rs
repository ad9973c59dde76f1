//! Summary builder
//!
//! Builds the JSON summary written with `--output`.

use std::path::Path;
use std::time::Duration;

use symcheck_kit::driver::ValidationReport;
use symcheck_kit::matrix::CheckMatrix;

/// Build the JSON summary of a completed run
pub fn build_summary(
    root: &Path,
    matrix: &CheckMatrix,
    report: &ValidationReport,
    duration: Duration,
) -> serde_json::Value {
    let warnings: Vec<serde_json::Value> = matrix
        .warnings()
        .iter()
        .map(|w| {
            serde_json::json!({
                "file": w.location.path.display().to_string(),
                "line": w.location.line,
                "column": w.location.column,
                "endpoint": w.endpoint.to_string(),
                "version": w.version,
            })
        })
        .collect();

    let failures: Vec<serde_json::Value> = report
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "file": f.check.location.path.display().to_string(),
                "line": f.check.location.line,
                "column": f.check.location.column,
                "library": f.library,
                "release": f.release.to_string(),
                "symbols": f.check.symbols,
                "message": f.message(),
            })
        })
        .collect();

    let skipped: Vec<serde_json::Value> = report
        .skipped
        .iter()
        .map(|s| {
            serde_json::json!({
                "release": s.release.to_string(),
                "library": s.library,
                "checks": s.checks,
            })
        })
        .collect();

    let binaries: Vec<serde_json::Value> = report
        .binaries
        .iter()
        .map(|b| {
            serde_json::json!({
                "release": b.release.to_string(),
                "library": b.library,
                "sha256": b.sha256,
                "symbols": b.symbols,
            })
        })
        .collect();

    serde_json::json!({
        "tool": {
            "name": "symcheck",
            "version": env!("CARGO_PKG_VERSION")
        },
        "run": {
            "id": uuid::Uuid::new_v4().to_string(),
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "root": root.display().to_string(),
            "duration_secs": duration.as_secs_f64()
        },
        "summary": {
            "checks": matrix.check_count(),
            "groups": matrix.len(),
            "evaluated": report.evaluated,
            "passed": report.passed,
            "failed": report.failures.len(),
            "skipped_groups": report.skipped.len(),
            "success": report.is_success()
        },
        "warnings": warnings,
        "failures": failures,
        "skipped": skipped,
        "binaries": binaries
    })
}

// ============================================================================
// Tests
// ============================================================================
