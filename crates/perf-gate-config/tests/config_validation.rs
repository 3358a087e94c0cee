// crates/perf-gate-config/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Section validation and constraint conversion.
// Purpose: Ensure malformed sections and constraints fail before evaluation.
// ============================================================================

//! Section and constraint validation tests for perf-gate-config.

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

use perf_gate_config::PerfGateConfig;
use perf_gate_config::config_toml_example;
use perf_gate_core::ConstraintKind;
use perf_gate_core::Escalation;
use perf_gate_core::HistorySelector;
use perf_gate_core::LabelScope;
use perf_gate_core::Metric;
use perf_gate_core::Operator;

/// Parses `toml` and returns the error message.
fn error_of(toml: &str) -> String {
    match PerfGateConfig::from_toml_str(toml) {
        Ok(config) => panic!("expected invalid config, got {config:?}"),
        Err(err) => err.to_string(),
    }
}

/// Wraps one constraint table body in a config.
fn with_constraint(body: &str) -> String {
    format!("[[constraints]]\nid = \"c1\"\nreport = \"r.jtl\"\n{body}")
}

// ============================================================================
// SECTION: Example
// ============================================================================

#[test]
fn example_config_validates() {
    let config = PerfGateConfig::from_toml_str(&config_toml_example()).unwrap();
    assert_eq!(config.run.run_id(), "nightly-42");
    assert!(config.run.started_at().unwrap().is_some());
    assert_eq!(config.constraints().unwrap().len(), 3);
    assert!(!config.adapters.access_policy().is_allowed("wrk"));
    assert!(config.adapters.access_policy().is_allowed("jmeter-csv"));
    assert_eq!(config.adapters.builtin_configs().jmeter_csv.delimiter, Some(','));
    assert_eq!(config.evaluation.parallel_workers().map(|w| w.get()), Some(2));
    assert_eq!(config.inputs.worker_count().get(), 4);
}

// ============================================================================
// SECTION: Constraints
// ============================================================================

#[test]
fn absolute_constraint_converts_with_defaults() {
    let toml = with_constraint("metric = \"avg\"\noperator = \"<=\"\nthreshold = 200\n");
    let config = PerfGateConfig::from_toml_str(&toml).unwrap();
    let constraints = config.constraints().unwrap();
    let constraint = &constraints[0];
    assert_eq!(constraint.metric, Metric::Average);
    assert_eq!(constraint.operator, Operator::NotGreater);
    assert_eq!(constraint.escalation, Escalation::Error);
    assert_eq!(constraint.scope, LabelScope::WholeReport);
    assert_eq!(constraint.kind, ConstraintKind::Absolute { threshold: 200.0 });
}

#[test]
fn textual_thresholds_are_parsed() {
    let toml = with_constraint(
        "metric = \"median\"\noperator = \"not_less\"\nthreshold = \"12.5\"\nlabel = \"GET /\"\n",
    );
    let constraints = PerfGateConfig::from_toml_str(&toml).unwrap().constraints().unwrap();
    assert_eq!(constraints[0].kind, ConstraintKind::Absolute { threshold: 12.5 });
    assert_eq!(constraints[0].scope, LabelScope::Label("GET /".to_string()));
}

#[test]
fn relative_constraint_converts_each_history_form() {
    let last = with_constraint(
        "metric = \"max\"\noperator = \"not_greater\"\nhistory = { last_runs = 3 }\n\
         tolerance_percent = 5.0\nescalation = \"warning\"\nall_labels = true\n",
    );
    let constraints = PerfGateConfig::from_toml_str(&last).unwrap().constraints().unwrap();
    assert_eq!(
        constraints[0].kind,
        ConstraintKind::Relative {
            history: HistorySelector::LastRuns { count: 3 },
            tolerance_percent: 5.0,
        }
    );
    assert_eq!(constraints[0].escalation, Escalation::Warning);
    assert_eq!(constraints[0].scope, LabelScope::AllLabels);

    let all = with_constraint(
        "metric = \"min\"\noperator = \"not_less\"\nhistory = { all_runs = true }\n",
    );
    let constraints = PerfGateConfig::from_toml_str(&all).unwrap().constraints().unwrap();
    assert!(matches!(
        constraints[0].kind,
        ConstraintKind::Relative { history: HistorySelector::AllRuns, .. }
    ));

    let range = with_constraint(
        "metric = \"p90\"\noperator = \"not_greater\"\n\
         history = { from = \"2024-01-01 00:00:00\", to = \"1704164645000\" }\n",
    );
    let constraints = PerfGateConfig::from_toml_str(&range).unwrap().constraints().unwrap();
    match &constraints[0].kind {
        ConstraintKind::Relative { history: HistorySelector::DateRange { start, end }, .. } => {
            assert_eq!(start.as_unix_millis(), 1_704_067_200_000);
            assert_eq!(end.as_unix_millis(), 1_704_164_645_000);
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn unknown_names_are_rejected_with_position() {
    let message = error_of(&with_constraint(
        "metric = \"p95\"\noperator = \"not_greater\"\nthreshold = 1\n",
    ));
    assert!(message.contains("constraints[0] (c1)"), "{message}");

    let message = error_of(&with_constraint(
        "metric = \"max\"\noperator = \"between\"\nthreshold = 1\n",
    ));
    assert!(message.contains("between"), "{message}");

    let message = error_of(&with_constraint(
        "metric = \"max\"\noperator = \"<=\"\nthreshold = 1\nescalation = \"fatal\"\n",
    ));
    assert!(message.contains("fatal"), "{message}");
}

#[test]
fn conflicting_constraint_fields_are_rejected() {
    let both = error_of(&with_constraint(
        "metric = \"max\"\noperator = \"<=\"\nthreshold = 1\nhistory = { all_runs = true }\n",
    ));
    assert!(both.contains("mutually exclusive"), "{both}");

    let neither = error_of(&with_constraint("metric = \"max\"\noperator = \"<=\"\n"));
    assert!(neither.contains("either threshold or history"), "{neither}");

    let scope = error_of(&with_constraint(
        "metric = \"max\"\noperator = \"<=\"\nthreshold = 1\nlabel = \"a\"\nall_labels = true\n",
    ));
    assert!(scope.contains("label and all_labels"), "{scope}");

    let tolerance = error_of(&with_constraint(
        "metric = \"max\"\noperator = \"<=\"\nthreshold = 1\ntolerance_percent = 5.0\n",
    ));
    assert!(tolerance.contains("tolerance_percent"), "{tolerance}");

    let selector = error_of(&with_constraint(
        "metric = \"max\"\noperator = \"<=\"\nhistory = { last_runs = 2, all_runs = true }\n",
    ));
    assert!(selector.contains("exactly one"), "{selector}");
}

#[test]
fn non_numeric_threshold_text_is_rejected() {
    let message = error_of(&with_constraint(
        "metric = \"max\"\noperator = \"<=\"\nthreshold = \"fast\"\n",
    ));
    assert!(message.contains("constraints[0]"), "{message}");
}

#[test]
fn duplicate_constraint_ids_are_rejected() {
    let one = with_constraint("metric = \"max\"\noperator = \"<=\"\nthreshold = 1\n");
    let message = error_of(&format!("{one}{one}"));
    assert!(message.contains("c1"), "{message}");
}

// ============================================================================
// SECTION: Sections
// ============================================================================

#[test]
fn worker_counts_must_be_positive_and_bounded() {
    assert!(error_of("[inputs]\nworkers = 0\n").contains("inputs.workers"));
    assert!(error_of("[evaluation]\nworkers = 100000\n").contains("evaluation.workers"));
}

#[test]
fn blank_patterns_and_ids_are_rejected() {
    assert!(error_of("[inputs]\npatterns = [\"  \"]\n").contains("inputs.patterns"));
    assert!(error_of("[run]\nid = \"\"\n").contains("run.id"));
    assert!(error_of("[inputs]\nadapter = \" \"\n").contains("inputs.adapter"));
}

#[test]
fn run_start_must_be_a_timestamp() {
    assert!(error_of("[run]\nstarted_at = \"yesterday\"\n").contains("run.started_at"));
}

#[test]
fn history_runs_need_unique_numbers_and_patterns() {
    let duplicate = "[[history.runs]]\nnumber = 1\npatterns = [\"a\"]\n\
                     [[history.runs]]\nnumber = 1\npatterns = [\"b\"]\n";
    assert!(error_of(duplicate).contains("listed twice"));
    let empty = "[[history.runs]]\nnumber = 2\npatterns = []\n";
    assert!(error_of(empty).contains("at least one pattern"));
}

#[test]
fn logging_level_must_be_known() {
    assert!(error_of("[logging]\nlevel = \"loud\"\n").contains("logging.level"));
    let config = PerfGateConfig::from_toml_str("[logging]\nlevel = \"DEBUG\"\n").unwrap();
    assert_eq!(config.logging.level, "DEBUG");
}

#[test]
fn non_ascii_delimiter_is_rejected() {
    let message = error_of("[adapters.jmeter_csv]\ndelimiter = \"é\"\n");
    assert!(message.contains("delimiter"), "{message}");
}
