// crates/perf-gate-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `perf-gate config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Perf Gate configuration. The output is deterministic
//! and must always pass validation.

/// Returns a canonical example `perf-gate.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[run]
id = "nightly-42"
number = 42
started_at = "2024-01-02 03:04:05"

[inputs]
patterns = ["results/*.jtl", "results/*.xml"]
# adapter = "jmeter-csv"
workers = 4
cache = true

[adapters]
denylist = ["wrk"]

[adapters.jmeter_csv]
delimiter = ","

[adapters.taurus]
total_label = ""

[adapters.locust]
total_labels = ["Aggregated", "Total"]

[history]
root = "history"

[[history.runs]]
number = 41
patterns = ["history/41/*.jtl"]

[evaluation]
workers = 2

[[constraints]]
id = "checkout-p90"
report = "checkout.jtl"
metric = "p90"
operator = "not_greater"
threshold = 750
label = "POST /checkout"

[[constraints]]
id = "errors"
report = "checkout.jtl"
metric = "error_percent"
operator = "not_greater"
threshold = "1.5"
escalation = "warning"

[[constraints]]
id = "average-regression"
report = "checkout.jtl"
metric = "average"
operator = "not_greater"
tolerance_percent = 10.0
history = { last_runs = 5 }
all_labels = true

[logging]
level = "info"
ansi = false
"#,
    )
}
