// crates/perf-gate-core/tests/store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Report cache keys and run history cursors.
// Purpose: Ensure cached reports are keyed by content and history is ordered.
// Dependencies: perf-gate-core
// ============================================================================
//! ## Overview
//! Report cache keys and run history cursors.

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
use common::report_with;
use common::run_with_durations;
use perf_gate_core::HistoryProvider;
use perf_gate_core::HistoryRequest;
use perf_gate_core::InMemoryReportCache;
use perf_gate_core::InMemoryRunHistory;
use perf_gate_core::ReportCache;
use perf_gate_core::ReportInput;
use perf_gate_core::ReportKey;
use perf_gate_core::SharedHistoryProvider;
use perf_gate_core::SharedReportCache;

#[test]
fn report_keys_depend_on_content() {
    let first = ReportKey::for_input(&ReportInput::new(REPORT, b"a,b".to_vec()));
    let same = ReportKey::for_input(&ReportInput::new(REPORT, b"a,b".to_vec()));
    let other = ReportKey::for_input(&ReportInput::new(REPORT, b"a,c".to_vec()));

    assert_eq!(first, same);
    assert_ne!(first, other);
    assert_eq!(first.digest.len(), 64);
    assert!(first.to_string().starts_with("results.jtl@sha256:"));
}

#[test]
fn cache_returns_stored_reports_through_shared_wrapper() {
    let backend = InMemoryReportCache::new();
    let cache = SharedReportCache::from_cache(backend.clone());
    let key = ReportKey::for_input(&ReportInput::new(REPORT, b"payload".to_vec()));

    assert!(cache.load(&key).unwrap().is_none());
    cache.store(&key, &report_with(REPORT, &[("Login", &[10, 20])])).unwrap();

    let loaded = cache.load(&key).unwrap().unwrap();
    assert_eq!(loaded.samples(), 2);
    assert_eq!(backend.cached_count().unwrap(), 1);
}

#[test]
fn history_walks_backwards_from_cursor() {
    let history = InMemoryRunHistory::new();
    for number in [3_u64, 1, 2, 5] {
        let started_at = i64::try_from(number).unwrap() * 1_000;
        history.record(run_with_durations(number, started_at, &[10])).unwrap();
    }
    let provider = SharedHistoryProvider::from_provider(history);

    let request = HistoryRequest::for_run(5);
    let previous = provider.previous_run(&request).unwrap().unwrap();
    assert_eq!(previous.number, 3);
    assert!(previous.reports.iter().all(perf_gate_core::PerformanceReport::is_sealed));

    let prior: Vec<u64> =
        provider.prior_runs(&request).unwrap().iter().map(|run| run.number).collect();
    assert_eq!(prior, vec![1, 2, 3]);

    let paged = HistoryRequest::for_run(5).with_cursor(2);
    assert_eq!(paged, HistoryRequest { run_number: 5, cursor: Some(2) });
    let prior: Vec<u64> =
        provider.prior_runs(&paged).unwrap().iter().map(|run| run.number).collect();
    assert_eq!(prior, vec![1]);
    assert!(provider.previous_run(&HistoryRequest::for_run(1)).unwrap().is_none());
}
