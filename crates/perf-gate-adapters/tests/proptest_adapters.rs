// crates/perf-gate-adapters/tests/proptest_adapters.rs
// ============================================================================
// Module: Adapter Property-Based Tests
// Description: Invariants of CSV ingestion, timestamps, and detection.
// Purpose: Exercise adapters over generated inputs.
// Dependencies: perf-gate-adapters, perf-gate-core, proptest
// ============================================================================
//! ## Overview
//! Invariants of CSV ingestion, timestamps, and detection.

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

use std::fmt::Write as _;

use common::registry;
use perf_gate_adapters::JmeterCsvAdapter;
use perf_gate_adapters::ReportAdapter;
use perf_gate_adapters::TimestampParser;
use perf_gate_core::ReportInput;
use proptest::prelude::*;

/// Renders JMeter CSV rows with the given delimiter.
fn jmeter_csv(delimiter: char, rows: &[(u64, bool)]) -> String {
    let separator = delimiter.to_string();
    let mut text = ["timeStamp", "elapsed", "label", "responseCode", "success"].join(&separator);
    text.push('\n');
    for (index, (elapsed, success)) in rows.iter().enumerate() {
        let fields = [
            (1_700_000_000_000_u64 + index as u64 * 10).to_string(),
            elapsed.to_string(),
            format!("label-{}", index % 3),
            "200".to_string(),
            success.to_string(),
        ];
        writeln!(text, "{}", fields.join(&separator)).unwrap();
    }
    text
}

proptest! {
    #[test]
    fn csv_rows_become_samples_for_every_delimiter(
        delimiter in prop_oneof![Just(','), Just('\t'), Just(';'), Just('|')],
        rows in prop::collection::vec((0_u64 .. 100_000, any::<bool>()), 0 .. 40),
    ) {
        let input = ReportInput::new("results.csv", jmeter_csv(delimiter, &rows));
        let report = JmeterCsvAdapter::default().parse(&input).unwrap();
        let failures = rows.iter().filter(|(_, success)| !success).count() as u64;
        prop_assert_eq!(report.samples(), rows.len() as u64);
        prop_assert_eq!(report.errors(), failures);
        prop_assert_eq!(report.label_count(), rows.len().min(3));
    }

    #[test]
    fn generated_csv_is_detected_as_jmeter(
        delimiter in prop_oneof![Just(','), Just('\t'), Just(';'), Just('|')],
        rows in prop::collection::vec((0_u64 .. 1_000, any::<bool>()), 1 .. 5),
    ) {
        let input = ReportInput::new("any-name", jmeter_csv(delimiter, &rows));
        let report = registry().parse(&input, None).unwrap();
        prop_assert_eq!(report.samples(), rows.len() as u64);
    }

    #[test]
    fn epoch_millis_round_trip(millis in 0_i64 .. 4_102_444_800_000) {
        let mut parser = TimestampParser::new();
        let parsed = parser.parse(&millis.to_string()).unwrap();
        prop_assert_eq!(parsed.as_unix_millis(), millis);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0 .. 512)) {
        let input = ReportInput::new("fuzz", bytes);
        let _ = registry().parse(&input, None);
    }
}
