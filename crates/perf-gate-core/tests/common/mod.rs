// crates/perf-gate-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared builders for reports, runs, and constraints.
// Purpose: Reduce duplication across integration tests for perf-gate-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use perf_gate_core::PerformanceReport;
use perf_gate_core::RunRecord;
use perf_gate_core::Sample;
use perf_gate_core::SummaryGroup;
use perf_gate_core::Timestamp;

/// Default report name used by fixtures.
pub const REPORT: &str = "results.jtl";

/// Builds a successful sample.
pub fn sample(label: &str, start_ms: i64, duration_ms: u64) -> Sample {
    Sample::new(label, Timestamp::from_unix_millis(start_ms), duration_ms)
}

/// Builds a sample-based report from `(label, durations)` pairs.
pub fn report_with(name: &str, labels: &[(&str, &[u64])]) -> PerformanceReport {
    let mut report = PerformanceReport::new(name);
    let mut clock = 0_i64;
    for (label, durations) in labels {
        for duration in *durations {
            report.add_sample(&sample(label, clock, *duration)).unwrap();
            clock += 1_000;
        }
    }
    report
}

/// Builds a summary group.
pub fn group(
    label: &str,
    success: u64,
    failure: u64,
    avg: f64,
    min: f64,
    max: f64,
) -> SummaryGroup {
    let mut group = SummaryGroup::new(label);
    group.success_count = success;
    group.failure_count = failure;
    group.avg_ms = avg;
    group.min_ms = min;
    group.max_ms = max;
    group
}

/// Builds a run holding one report with a single label of the given durations.
pub fn run_with_durations(number: u64, started_at: i64, durations: &[u64]) -> RunRecord {
    RunRecord::new(format!("run-{number}"), number, Timestamp::from_unix_millis(started_at))
        .with_report(report_with(REPORT, &[("Login", durations)]))
}

/// Asserts two floats are equal within `1e-9`.
pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}
