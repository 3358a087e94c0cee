// crates/perf-gate-core/tests/summary_aggregation.rs
// ============================================================================
// Module: Summary Aggregation Tests
// Description: Back-derivation of run metrics from summary groups.
// Purpose: Pin the weighting rules and the totals-group precedence.
// Dependencies: perf-gate-core
// ============================================================================
//! ## Overview
//! Summary-only reports never see raw durations. These tests pin the
//! weighted mean, weighted percentile, and grand-total behavior.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::REPORT;
use common::assert_close;
use common::group;
use perf_gate_core::IngestionMode;
use perf_gate_core::Percentile;
use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportError;
use perf_gate_core::SampleError;
use perf_gate_core::SummaryGroup;

/// Builds the two-group report used by most tests.
fn two_group_report() -> PerformanceReport {
    let mut fast = group("fast", 10, 0, 100.0, 50.0, 150.0);
    fast.percentiles.insert(Percentile::MEDIAN, 90.0);
    fast.percentiles.insert(Percentile::P90, 140.0);
    let mut slow = group("slow", 27, 3, 200.0, 80.0, 400.0);
    slow.percentiles.insert(Percentile::MEDIAN, 190.0);
    slow.percentiles.insert(Percentile::P90, 350.0);

    let mut report = PerformanceReport::new(REPORT);
    report.add_group(fast).unwrap();
    report.add_group(slow).unwrap();
    report
}

// ============================================================================
// SECTION: Error Percent
// ============================================================================

/// A single 18/2 group yields a ten percent error rate.
#[test]
fn single_group_error_percent() {
    let mut report = PerformanceReport::new(REPORT);
    report.add_group(group("checkout", 18, 2, 120.0, 20.0, 900.0)).unwrap();

    assert_eq!(report.mode(), Some(IngestionMode::Summary));
    assert_eq!(report.samples(), 20);
    assert_eq!(report.errors(), 2);
    assert_close(report.error_percent(), 10.0);
}

// ============================================================================
// SECTION: Back-Derivation
// ============================================================================

/// Run averages are weighted by group size.
#[test]
fn run_average_is_count_weighted() {
    let report = two_group_report();
    assert_eq!(report.samples(), 40);
    assert_close(report.average(), 175.0);
    assert_close(report.min(), 50.0);
    assert_close(report.max(), 400.0);
    assert_close(report.error_percent(), 7.5);
}

/// Run percentiles apply the index rule over weighted group values.
#[test]
fn run_percentiles_are_weighted() {
    let report = two_group_report();
    assert_close(report.median(), 190.0);
    assert_close(report.percentile_90(), 350.0);
}

/// Labels keep their own group statistics.
#[test]
fn label_metrics_come_from_own_groups() {
    let report = two_group_report();
    let fast = report.label_by_name("fast").unwrap();
    assert_close(fast.average(), 100.0);
    assert_close(fast.median(), 90.0);
    assert_close(fast.min(), 50.0);
    assert_close(fast.max(), 150.0);
}

/// Repeated groups for one label merge without expansion.
#[test]
fn groups_for_one_label_merge() {
    let mut report = PerformanceReport::new(REPORT);
    report.add_group(group("api", 10, 0, 10.0, 5.0, 20.0)).unwrap();
    report.add_group(group("api", 30, 0, 30.0, 8.0, 60.0)).unwrap();

    let api = report.label_by_name("api").unwrap();
    assert_eq!(api.samples(), 40);
    assert_close(api.average(), 25.0);
    assert_close(api.min(), 5.0);
    assert_close(api.max(), 60.0);
    assert!(api.durations().is_empty());
    assert_eq!(api.groups().len(), 2);
}

/// Missing ranks interpolate between min, reported ranks, and max.
#[test]
fn unreported_percentiles_interpolate() {
    let mut single = group("x", 1, 0, 50.0, 10.0, 110.0);
    single.percentiles.insert(Percentile::MEDIAN, 60.0);

    assert_close(single.value_at(Percentile::MEDIAN), 60.0);
    assert_close(single.value_at(Percentile::P90), 100.0);
    assert_close(single.value_at(Percentile::new(25.0).unwrap()), 35.0);
    assert_close(single.value_at(Percentile::MIN), 10.0);
    assert_close(single.value_at(Percentile::MAX), 110.0);
}

// ============================================================================
// SECTION: Totals
// ============================================================================

/// A grand-total group takes precedence over back-derivation.
#[test]
fn totals_group_overrides_back_derivation() {
    let mut report = two_group_report();
    let mut totals = group("", 36, 4, 180.0, 40.0, 420.0);
    totals.percentiles.insert(Percentile::P90, 333.0);
    totals.bytes = 4_000;
    report.set_summary_totals(totals).unwrap();

    assert_eq!(report.samples(), 40);
    assert_close(report.average(), 180.0);
    assert_close(report.min(), 40.0);
    assert_close(report.max(), 420.0);
    assert_close(report.percentile_90(), 333.0);
    assert_close(report.error_percent(), 10.0);
    assert_close(report.average_size_bytes(), 100.0);
    assert_eq!(report.label_count(), 2);
    assert!(report.summary_totals().is_some());
}

/// Totals cannot be attached to a request-level report.
#[test]
fn totals_require_summary_mode() {
    let mut report = common::report_with(REPORT, &[("Login", &[10])]);
    let err = report.set_summary_totals(SummaryGroup::new("")).unwrap_err();
    assert!(matches!(err, ReportError::IngestionModeConflict { .. }));
}

/// Negative group durations are rejected.
#[test]
fn invalid_group_values_are_rejected() {
    let mut report = PerformanceReport::new(REPORT);
    let err = report.add_group(group("bad", 1, 0, -1.0, 0.0, 1.0)).unwrap_err();
    assert!(matches!(
        err,
        ReportError::InvalidGroup(SampleError::InvalidGroupValue { ref field, .. })
            if field == "avg"
    ));
    assert_eq!(report.label_count(), 0);
}
