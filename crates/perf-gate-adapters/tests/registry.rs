// crates/perf-gate-adapters/tests/registry.rs
// ============================================================================
// Module: Adapter Registry Tests
// Description: Integration tests for detection, selection, and access policy.
// Purpose: Ensure inputs route to the right adapter and policy is enforced.
// Dependencies: perf-gate-adapters, perf-gate-core
// ============================================================================

//! ## Overview
//! Every fixture must be detected as its own format, explicit selection must
//! bypass detection, and allowlist/denylist policy must apply to both paths.

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

use perf_gate_adapters::AdapterAccessPolicy;
use perf_gate_adapters::AdapterRegistry;
use perf_gate_adapters::BuiltinAdapterConfigs;
use perf_gate_adapters::ContentProbe;
use perf_gate_adapters::JunitAdapter;
use perf_gate_adapters::RegistryError;

use crate::common::fixture;
use crate::common::inline;
use crate::common::registry;

// ============================================================================
// SECTION: Detection
// ============================================================================

#[test]
fn every_fixture_is_detected_as_its_format() {
    let registry = registry();
    let cases = [
        ("jmeter.xml", "jmeter-xml"),
        ("jmeter.csv", "jmeter-csv"),
        ("junit.xml", "junit"),
        ("taurus.xml", "taurus-xml"),
        ("taurus.csv", "taurus-csv"),
        ("locust_stats.csv", "locust"),
        ("locust_legacy.csv", "locust"),
        ("jmeter.log", "jmeter-log"),
        ("wrk.txt", "wrk"),
    ];
    for (file, expected) in cases {
        let probe = ContentProbe::from_input(&fixture(file));
        let detected = registry.detect(&probe).map(|adapter| adapter.name());
        assert_eq!(detected, Some(expected), "fixture {file}");
    }
}

#[test]
fn detection_ignores_file_names() {
    let registry = registry();
    let mut input = fixture("junit.xml");
    input.name = "results.csv".into();
    let report = registry.parse(&input, None).unwrap();
    assert_eq!(report.samples(), 3);
}

#[test]
fn unrecognized_content_is_a_format_error() {
    let err = registry().parse(&inline("notes.txt", "hello world\n"), None).unwrap_err();
    assert_eq!(err.reason, "unrecognized report format");
    assert_eq!(err.report.as_str(), "notes.txt");
}

#[test]
fn builtin_adapters_register_in_detection_order() {
    assert_eq!(registry().adapter_names(), vec![
        "jmeter-xml",
        "junit",
        "taurus-xml",
        "jmeter-csv",
        "taurus-csv",
        "locust",
        "jmeter-log",
        "wrk",
    ]);
}

// ============================================================================
// SECTION: Selection
// ============================================================================

#[test]
fn explicit_adapter_bypasses_detection() {
    let input = inline("results", "timeStamp;elapsed;label;responseCode;success\n0;5;a;200;true\n");
    let report = registry().parse(&input, Some("jmeter-csv")).unwrap();
    assert_eq!(report.samples(), 1);

    let forced = registry().parse(&input, Some("junit")).unwrap();
    assert_eq!(forced.samples(), 0);
}

#[test]
fn unknown_adapter_name_is_rejected() {
    let err = registry().parse(&fixture("jmeter.xml"), Some("gatling")).unwrap_err();
    assert_eq!(err.reason, "unknown adapter: gatling");
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = registry();
    let err = registry.register_adapter(JunitAdapter).unwrap_err();
    assert_eq!(err, RegistryError::DuplicateAdapter("junit".to_string()));
}

// ============================================================================
// SECTION: Access Policy
// ============================================================================

#[test]
fn denylist_overrides_allowlist() {
    let policy = AdapterAccessPolicy {
        allowlist: Some(BTreeSet::from(["junit".to_string(), "wrk".to_string()])),
        denylist: BTreeSet::from(["junit".to_string()]),
    };
    assert!(!policy.is_allowed("junit"));
    assert!(policy.is_allowed("wrk"));
    assert!(!policy.is_allowed("locust"));
    assert!(AdapterAccessPolicy::default().is_allowed("locust"));
}

#[test]
fn denied_adapters_are_skipped_during_detection() {
    let policy = AdapterAccessPolicy {
        allowlist: None,
        denylist: BTreeSet::from(["junit".to_string()]),
    };
    let registry =
        AdapterRegistry::with_builtin_adapters(BuiltinAdapterConfigs::default(), policy).unwrap();

    let err = registry.parse(&fixture("junit.xml"), None).unwrap_err();
    assert_eq!(err.reason, "unrecognized report format");
    let err = registry.parse(&fixture("junit.xml"), Some("junit")).unwrap_err();
    assert_eq!(err.reason, "adapter denied by policy: junit");
    assert!(registry.select("junit").is_none());
    assert!(registry.select("wrk").is_some());
}

#[test]
fn allowlist_limits_detection() {
    let policy = AdapterAccessPolicy {
        allowlist: Some(BTreeSet::from(["wrk".to_string()])),
        denylist: BTreeSet::new(),
    };
    let registry =
        AdapterRegistry::with_builtin_adapters(BuiltinAdapterConfigs::default(), policy).unwrap();
    assert!(registry.parse(&fixture("wrk.txt"), None).is_ok());
    assert!(registry.parse(&fixture("jmeter.xml"), None).is_err());
}
