// crates/perf-gate-adapters/tests/summary_adapters.rs
// ============================================================================
// Module: Summary Adapter Tests
// Description: Integration tests for Taurus, Locust, JMeter log, and wrk.
// Purpose: Validate group extraction, unit conversion, and total handling.
// Dependencies: perf-gate-adapters, perf-gate-core
// ============================================================================

//! ## Overview
//! Summary adapters emit pre-aggregated groups. These tests pin the unit
//! conversions each tool needs, the treatment of grand-total rows, and the
//! fallbacks used when a tool omits a figure.

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

use std::collections::BTreeSet;

use perf_gate_adapters::JmeterLogAdapter;
use perf_gate_adapters::LocustAdapter;
use perf_gate_adapters::LocustConfig;
use perf_gate_adapters::ReportAdapter;
use perf_gate_adapters::TaurusConfig;
use perf_gate_adapters::TaurusCsvAdapter;
use perf_gate_adapters::TaurusXmlAdapter;
use perf_gate_adapters::WrkAdapter;
use perf_gate_core::IngestionMode;
use perf_gate_core::Percentile;

use crate::common::assert_close;
use crate::common::fixture;
use crate::common::inline;

// ============================================================================
// SECTION: Taurus
// ============================================================================

#[test]
fn taurus_xml_converts_seconds_and_keeps_totals_apart() {
    let report = TaurusXmlAdapter::default().parse(&fixture("taurus.xml")).unwrap();

    assert_eq!(report.mode(), Some(IngestionMode::Summary));
    assert_eq!(report.label_count(), 2);
    assert_eq!(report.samples(), 300);
    assert_eq!(report.errors(), 6);
    assert_close(report.average(), 200.0);
    assert_eq!(report.summary_totals().unwrap().success_count, 294);

    let get = report.label_by_name("GET /api").unwrap();
    assert_eq!(get.samples(), 200);
    assert_eq!(get.errors(), 2);
    assert_close(get.average(), 150.0);
    assert_close(get.max(), 900.0);
    assert_close(get.percentile_90(), 300.0);
    assert_eq!(get.total_bytes(), 20_000);
}

#[test]
fn taurus_group_without_percentiles_interpolates_between_bounds() {
    let report = TaurusXmlAdapter::default().parse(&fixture("taurus.xml")).unwrap();
    let post = report.label_by_name("POST /api").unwrap();
    let group = post.groups().first().unwrap();
    assert_close(group.value_at(Percentile::P90), 1090.0);
}

#[test]
fn taurus_custom_total_label_is_honoured() {
    let input = inline(
        "final.xml",
        r#"<FinalStatus>
             <Group label="ALL"><n value="10"/><avg_rt value="0.5"/></Group>
             <Group label="home"><n value="10"/><avg_rt value="0.5"/></Group>
           </FinalStatus>"#,
    );
    let adapter = TaurusXmlAdapter::new(TaurusConfig { total_label: "ALL".to_string() });
    let report = adapter.parse(&input).unwrap();
    assert_eq!(report.label_count(), 1);
    assert!(report.summary_totals().is_some());
    assert_close(report.min(), 500.0);
}

#[test]
fn taurus_csv_reads_percentile_columns() {
    let report = TaurusCsvAdapter::default().parse(&fixture("taurus.csv")).unwrap();

    assert_eq!(report.label_count(), 2);
    assert_eq!(report.samples(), 300);
    assert_close(report.min(), 50.0);
    assert_close(report.max(), 1200.0);

    let get = report.label_by_name("GET /api").unwrap();
    assert_eq!(get.samples(), 200);
    assert_close(get.median(), 140.0);
}

#[test]
fn taurus_csv_reports_bad_values_with_line() {
    let input = inline("bad.csv", "label,succ,fail,avg_rt\nhome,1,0,fast\n");
    let err = TaurusCsvAdapter::default().parse(&input).unwrap_err();
    assert_eq!(err.reason, "line 2: invalid avg_rt value: fast");
}

// ============================================================================
// SECTION: Locust
// ============================================================================

#[test]
fn locust_current_header_builds_typed_labels() {
    let report = LocustAdapter::default().parse(&fixture("locust_stats.csv")).unwrap();

    assert_eq!(report.label_count(), 2);
    assert_eq!(report.samples(), 150);
    assert_eq!(report.errors(), 5);
    assert_close(report.average(), 115.33);

    let login = report.label_by_name("GET /login").unwrap();
    assert_eq!(login.samples(), 100);
    assert_eq!(login.errors(), 5);
    assert_close(login.average(), 130.5);
    assert_close(login.min(), 40.0);
    assert_close(login.max(), 900.0);
    assert_close(login.percentile_90(), 200.0);
    assert_eq!(login.total_bytes(), 204_800);
}

#[test]
fn locust_legacy_header_and_total_row() {
    let report = LocustAdapter::default().parse(&fixture("locust_legacy.csv")).unwrap();

    assert_eq!(report.label_count(), 1);
    let root = report.label_by_name("GET /").unwrap();
    assert_eq!(root.samples(), 40);
    assert_eq!(root.errors(), 4);
    assert_eq!(report.summary_totals().unwrap().failure_count, 4);
}

#[test]
fn locust_total_labels_are_configurable() {
    let config = LocustConfig { total_labels: BTreeSet::new() };
    let report = LocustAdapter::new(config).parse(&fixture("locust_stats.csv")).unwrap();
    assert_eq!(report.label_count(), 3);
    assert!(report.summary_totals().is_none());
}

// ============================================================================
// SECTION: JMeter Summariser Log
// ============================================================================

#[test]
fn jmeter_log_uses_last_cumulative_line() {
    let report = JmeterLogAdapter.parse(&fixture("jmeter.log")).unwrap();

    assert_eq!(report.label_count(), 1);
    assert_eq!(report.samples(), 300);
    assert_eq!(report.errors(), 5);
    assert_close(report.average(), 113.0);
    assert_close(report.min(), 30.0);
    assert_close(report.max(), 1000.0);

    let summary = report.label_by_name("summary").unwrap();
    assert_eq!(summary.samples(), 300);
}

#[test]
fn jmeter_log_accepts_glued_keys() {
    let input = inline("run.log", "summary = 10 in 00:00:01 Avg:7 Min:1 Max:20 Err:0 (0.00%)\n");
    let report = JmeterLogAdapter.parse(&input).unwrap();
    assert_close(report.average(), 7.0);
    assert_eq!(report.errors(), 0);
}

#[test]
fn jmeter_log_without_cumulative_line_fails() {
    let input = inline("run.log", "summary +     5 in 00:00:01 =    5.0/s Avg:    1 Err: 0\n");
    let err = JmeterLogAdapter.parse(&input).unwrap_err();
    assert!(err.reason.contains("no cumulative"), "{}", err.reason);
}

// ============================================================================
// SECTION: wrk
// ============================================================================

#[test]
fn wrk_output_becomes_one_group() {
    let report = WrkAdapter.parse(&fixture("wrk.txt")).unwrap();

    assert_eq!(report.label_count(), 1);
    let target = report.label_by_name("http://127.0.0.1:8080/index.html").unwrap();
    assert_eq!(target.samples(), 22_464_657);
    assert_eq!(target.errors(), 15);
    assert_close(target.average(), 0.635_91);
    assert_close(target.max(), 12.92);
    assert_close(target.min(), 0.25);
    assert_close(target.min(), target.median());
    assert_eq!(target.total_bytes(), 19_069_654_794);

    let group = target.groups().first().unwrap();
    assert_close(group.value_at(Percentile::new(99.0).unwrap()), 5.8);
}

#[test]
fn wrk_errors_are_capped_at_request_count() {
    let input = inline(
        "wrk.txt",
        "    Latency   1.00ms    0.10ms   2.00ms   90.00%\n\
         \x20 10 requests in 1.00s, 1.00KB read\n\
         \x20 Non-2xx or 3xx responses: 50\n",
    );
    let report = WrkAdapter.parse(&input).unwrap();
    let target = report.label_by_name("wrk").unwrap();
    assert_eq!(target.samples(), 10);
    assert_eq!(target.errors(), 10);
    assert_eq!(target.total_bytes(), 1024);
    assert_close(target.min(), target.average());
}

#[test]
fn wrk_without_request_line_fails() {
    let input = inline("wrk.txt", "    Latency   1.00ms    0.10ms   2.00ms   90.00%\n");
    let err = WrkAdapter.parse(&input).unwrap_err();
    assert!(err.reason.contains("requests in"), "{}", err.reason);
}
