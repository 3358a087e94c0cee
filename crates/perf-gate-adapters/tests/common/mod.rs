// crates/perf-gate-adapters/tests/common/mod.rs
// =============================================================================
// Module: Adapter Test Helpers
// Description: Fixture loading and registry construction for adapter suites.
// Purpose: Reduce duplication across integration tests for perf-gate-adapters.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;

use perf_gate_adapters::AdapterAccessPolicy;
use perf_gate_adapters::AdapterRegistry;
use perf_gate_adapters::BuiltinAdapterConfigs;
use perf_gate_core::ReportInput;

/// Returns the path of a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Loads a fixture as a report input named after the file.
pub fn fixture(name: &str) -> ReportInput {
    let bytes = std::fs::read(fixture_path(name)).unwrap();
    ReportInput::new(name, bytes)
}

/// Builds an input from inline text.
pub fn inline(name: &str, text: &str) -> ReportInput {
    ReportInput::new(name, text)
}

/// Builds a registry with every built-in adapter and no policy limits.
pub fn registry() -> AdapterRegistry {
    AdapterRegistry::with_builtin_adapters(
        BuiltinAdapterConfigs::default(),
        AdapterAccessPolicy::allow_all(),
    )
    .unwrap()
}

/// Asserts two floats are equal within `1e-6`.
pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
}
