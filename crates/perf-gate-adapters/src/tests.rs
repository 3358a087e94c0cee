// crates/perf-gate-adapters/src/tests.rs
// ============================================================================
// Module: Adapters Unit Tests
// Description: Unit tests for field parsing helpers and content probing.
// Purpose: Pin lenient number parsing, timestamp caching, and detection hints.
// Dependencies: perf-gate-adapters, perf-gate-core
// ============================================================================

//! ## Overview
//! Unit tests for crate-private helpers that integration tests cannot reach.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

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
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use perf_gate_core::ReportInput;

use crate::ContentProbe;
use crate::PROBE_BYTES;
use crate::TimestampParser;
use crate::numeric::parse_bool;
use crate::numeric::parse_count;
use crate::numeric::parse_duration_millis;
use crate::numeric::parse_float;
use crate::numeric::parse_size_bytes;
use crate::numeric::round_to_u64;
use crate::summary::GroupFields;
use crate::timestamp::supported_layouts;

// ============================================================================
// SECTION: Numeric Fields
// ============================================================================

#[test]
fn counts_accept_integral_floats_only() {
    assert_eq!(parse_count(" 42 "), Some(42));
    assert_eq!(parse_count("12.0"), Some(12));
    assert_eq!(parse_count("12.5"), None);
    assert_eq!(parse_count("-3"), None);
    assert_eq!(parse_count("abc"), None);
}

#[test]
fn floats_reject_negative_and_non_finite() {
    assert_eq!(parse_float("1.5"), Some(1.5));
    assert_eq!(parse_float("-0.1"), None);
    assert_eq!(parse_float("NaN"), None);
    assert_eq!(parse_float("inf"), None);
}

#[test]
fn booleans_are_case_insensitive() {
    assert_eq!(parse_bool("TRUE"), Some(true));
    assert_eq!(parse_bool("false"), Some(false));
    assert_eq!(parse_bool("yes"), None);
}

#[test]
fn durations_convert_units_to_millis() {
    assert_eq!(parse_duration_millis("250.00us"), Some(0.25));
    assert_eq!(parse_duration_millis("1.50ms"), Some(1.5));
    assert_eq!(parse_duration_millis("2s"), Some(2000.0));
    assert_eq!(parse_duration_millis("1m"), Some(60_000.0));
    assert_eq!(parse_duration_millis("12"), None);
    assert_eq!(parse_duration_millis("3weeks"), None);
}

#[test]
fn sizes_convert_binary_units_to_bytes() {
    assert_eq!(parse_size_bytes("512B"), Some(512));
    assert_eq!(parse_size_bytes("2KB"), Some(2048));
    assert_eq!(parse_size_bytes("1.5MB"), Some(1_572_864));
    assert_eq!(parse_size_bytes("100"), Some(100));
    assert_eq!(parse_size_bytes("1PB"), None);
}

#[test]
fn rounding_rejects_values_outside_u64() {
    assert_eq!(round_to_u64(2.5), Some(3));
    assert_eq!(round_to_u64(-1.0), None);
    assert_eq!(round_to_u64(f64::INFINITY), None);
    assert_eq!(round_to_u64(1e20), None);
}

// ============================================================================
// SECTION: Timestamps
// ============================================================================

#[test]
fn epoch_millis_bypass_the_layout_cache() {
    let mut parser = TimestampParser::new();
    let parsed = parser.parse("1700000000000").unwrap();
    assert_eq!(parsed.as_unix_millis(), 1_700_000_000_000);
    assert_eq!(parser.cached_layout(), None);
}

#[test]
fn first_matching_layout_is_cached() {
    let mut parser = TimestampParser::new();
    let parsed = parser.parse("2024-01-02 03:04:05").unwrap();
    assert_eq!(parsed.as_unix_millis(), 1_704_164_645_000);
    assert_eq!(parser.cached_layout(), Some("yyyy-MM-dd HH:mm:ss"));

    let later = parser.parse("2024-01-02 03:04:06").unwrap();
    assert_eq!(later.as_unix_millis(), 1_704_164_646_000);
    assert_eq!(parser.cached_layout(), Some("yyyy-MM-dd HH:mm:ss"));
}

#[test]
fn layouts_rejected_before_the_cache_are_not_retried() {
    let mut parser = TimestampParser::new();
    assert!(parser.parse("2024-01-02 03:04:05").is_some());
    // The slash layouts failed before the dash layout matched.
    assert!(parser.parse("2024/01/02 03:04:05").is_none());
}

#[test]
fn unmatched_values_reject_nothing() {
    let mut parser = TimestampParser::new();
    assert!(parser.parse("not a time").is_none());
    assert_eq!(parser.cached_layout(), None);
    let parsed = parser.parse("2024/01/02 03:04:05.250").unwrap();
    assert_eq!(parsed.as_unix_millis(), 1_704_164_645_250);
    assert_eq!(parser.cached_layout(), Some("yyyy/MM/dd HH:mm:ss.SSS"));
}

#[test]
fn comma_millis_and_us_dates_parse() {
    let mut comma = TimestampParser::new();
    assert_eq!(comma.parse("2024-01-02 03:04:05,125").unwrap().as_unix_millis(), 1_704_164_645_125);
    let mut us = TimestampParser::new();
    assert_eq!(us.parse("01/02/2024 03:04:05").unwrap().as_unix_millis(), 1_704_164_645_000);
}

#[test]
fn supported_layouts_are_listed_in_order() {
    let layouts = supported_layouts();
    assert_eq!(layouts.len(), 7);
    assert_eq!(layouts.first(), Some(&"yyyy/MM/dd HH:mm:ss.SSS"));
    assert_eq!(layouts.last(), Some(&"MM/dd/yyyy HH:mm:ss"));
}

// ============================================================================
// SECTION: Content Probe
// ============================================================================

#[test]
fn probe_skips_prolog_and_comments_for_xml_root() {
    let input = ReportInput::new(
        "results.xml",
        "\u{feff}<?xml version=\"1.0\"?>\n<!-- generated -->\n<testResults version=\"1.2\">",
    );
    let probe = ContentProbe::from_input(&input);
    assert_eq!(probe.xml_root(), Some("testResults"));
    assert_eq!(probe.extension().as_deref(), Some("xml"));
}

#[test]
fn probe_reads_first_non_blank_line_as_header() {
    let input = ReportInput::new("stats.csv", "\n\nType,Name,# requests\nGET,/,1\n");
    let probe = ContentProbe::from_input(&input);
    assert_eq!(probe.first_line(), "Type,Name,# requests");
    assert!(probe.header_has(&["NAME", "# Requests"]));
    assert_eq!(probe.xml_root(), None);
}

#[test]
fn probe_is_bounded() {
    let input = ReportInput::new("big.log", vec![b'a'; PROBE_BYTES * 2]);
    let probe = ContentProbe::from_input(&input);
    assert_eq!(probe.head().len(), PROBE_BYTES);
}

// ============================================================================
// SECTION: Summary Fields
// ============================================================================

#[test]
fn group_fields_fall_back_to_percentiles_for_bounds() {
    let fields = GroupFields {
        total: Some(10),
        failure: Some(2),
        average: Some(20.0),
        percentiles: vec![(50.0, 18.0), (99.0, 40.0)],
        ..GroupFields::default()
    };
    let group = fields.into_group("GET /").unwrap();
    assert_eq!(group.success_count, 8);
    assert_eq!(group.failure_count, 2);
    assert_eq!(group.min_ms, 18.0);
    assert_eq!(group.max_ms, 40.0);
}

#[test]
fn group_fields_require_a_count() {
    let fields = GroupFields { average: Some(1.0), ..GroupFields::default() };
    assert!(fields.into_group("x").is_err());
}
