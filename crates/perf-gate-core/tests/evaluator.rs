// crates/perf-gate-core/tests/evaluator.rs
// ============================================================================
// Module: Constraint Evaluator Tests
// Description: Absolute and relative evaluation, resolution, and history.
// Purpose: Ensure each constraint yields one correct verdict in input order.
// Dependencies: perf-gate-core
// ============================================================================
//! ## Overview
//! Exercises the evaluation pipeline end to end: report and label
//! resolution, history selection, effective thresholds, and operators.

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

use std::num::NonZeroUsize;

use common::REPORT;
use common::assert_close;
use common::report_with;
use common::run_with_durations;
use perf_gate_core::Constraint;
use perf_gate_core::ConstraintError;
use perf_gate_core::ConstraintEvaluation;
use perf_gate_core::ConstraintEvaluator;
use perf_gate_core::ConstraintKind;
use perf_gate_core::ConstraintVerdict;
use perf_gate_core::Escalation;
use perf_gate_core::HistorySelector;
use perf_gate_core::LabelScope;
use perf_gate_core::Metric;
use perf_gate_core::Operator;
use perf_gate_core::PerformanceReport;
use perf_gate_core::ResolutionError;
use perf_gate_core::RunRecord;
use perf_gate_core::Timestamp;
use perf_gate_core::VerdictStatus;
use perf_gate_core::runtime::apply_operator;

/// Builds an absolute constraint over the fixture report.
fn absolute(id: &str, metric: Metric, operator: Operator, threshold: f64) -> Constraint {
    Constraint::absolute(id, REPORT, metric, operator, threshold).unwrap()
}

/// Builds a relative average constraint over the fixture report.
fn relative(id: &str, history: HistorySelector, tolerance: f64) -> Constraint {
    Constraint::relative(id, REPORT, Metric::Average, Operator::NotGreater, history, tolerance)
        .unwrap()
}

/// Unwraps an evaluated verdict.
fn evaluated(verdict: &ConstraintVerdict) -> &ConstraintEvaluation {
    verdict.evaluation().unwrap_or_else(|| panic!("expected evaluation, got {verdict:?}"))
}

// ============================================================================
// SECTION: Absolute Constraints
// ============================================================================

#[test]
fn absolute_threshold_passes_and_fails() {
    let current = run_with_durations(1, 0, &[10, 20, 30]);
    let evaluator = ConstraintEvaluator::new(&current, &[]);

    let pass = evaluator.evaluate(&absolute("avg", Metric::Average, Operator::NotGreater, 20.0));
    assert!(evaluated(&pass).success);
    assert_close(evaluated(&pass).measured_value, 20.0);
    assert_eq!(evaluated(&pass).reference_value, None);

    let fail = evaluator.evaluate(&absolute("max", Metric::Max, Operator::NotGreater, 25.0));
    assert!(!evaluated(&fail).success);
    assert_eq!(fail.status(), VerdictStatus::Failed);

    let floor = evaluator.evaluate(&absolute("min", Metric::Min, Operator::NotLess, 10.0));
    assert!(evaluated(&floor).success);
}

#[test]
fn operators_absorb_float_noise_but_not_equal_is_exact() {
    assert!(apply_operator(Operator::NotGreater, 1.0 + 1e-12, 1.0));
    assert!(apply_operator(Operator::NotLess, 1.0 - 1e-12, 1.0));
    assert!(!apply_operator(Operator::NotGreater, 1.001, 1.0));
    assert!(!apply_operator(Operator::NotEqual, 1.0, 1.0));
    assert!(apply_operator(Operator::NotEqual, 1.0, 1.0 + 1e-12));
}

#[test]
fn label_scope_reads_label_metrics() {
    let current = RunRecord::new("run-1", 1, Timestamp::from_unix_millis(0))
        .with_report(report_with(REPORT, &[("Login", &[10]), ("Search", &[500])]));
    let evaluator = ConstraintEvaluator::new(&current, &[]);

    let constraint = absolute("search", Metric::Max, Operator::NotGreater, 100.0)
        .with_scope(LabelScope::Label("Search".to_string()))
        .unwrap();
    let verdict = evaluator.evaluate(&constraint);
    assert_eq!(evaluated(&verdict).label.as_deref(), Some("Search"));
    assert!(!evaluated(&verdict).success);
}

#[test]
fn all_labels_reports_first_failure_else_last_label() {
    let current = RunRecord::new("run-1", 1, Timestamp::from_unix_millis(0))
        .with_report(report_with(REPORT, &[("a", &[10]), ("b", &[100]), ("c", &[20])]));
    let evaluator = ConstraintEvaluator::new(&current, &[]);

    let strict = absolute("strict", Metric::Max, Operator::NotGreater, 50.0)
        .with_scope(LabelScope::AllLabels)
        .unwrap();
    let verdict = evaluator.evaluate(&strict);
    assert_eq!(evaluated(&verdict).label.as_deref(), Some("b"));
    assert!(!evaluated(&verdict).success);

    let loose = absolute("loose", Metric::Max, Operator::NotGreater, 1_000.0)
        .with_scope(LabelScope::AllLabels)
        .unwrap();
    let verdict = evaluator.evaluate(&loose);
    assert_eq!(evaluated(&verdict).label.as_deref(), Some("a"));
    assert!(evaluated(&verdict).success);
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

#[test]
fn missing_report_and_label_are_unresolved() {
    let current = run_with_durations(1, 0, &[10]);
    let evaluator = ConstraintEvaluator::new(&current, &[]);

    let missing_report =
        Constraint::absolute("r", "other.jtl", Metric::Average, Operator::NotGreater, 1.0).unwrap();
    let verdict = evaluator.evaluate(&missing_report);
    assert!(matches!(
        verdict,
        ConstraintVerdict::Unresolved { error: ResolutionError::MissingReport { .. }, .. }
    ));

    let missing_label = absolute("l", Metric::Average, Operator::NotGreater, 1.0)
        .with_scope(LabelScope::Label("Checkout".to_string()))
        .unwrap();
    let verdict = evaluator.evaluate(&missing_label);
    assert!(matches!(
        verdict,
        ConstraintVerdict::Unresolved { error: ResolutionError::MissingLabel { ref label, .. }, .. }
            if label == "Checkout"
    ));
}

#[test]
fn all_labels_on_empty_report_is_unresolved() {
    let current = RunRecord::new("run-1", 1, Timestamp::from_unix_millis(0))
        .with_report(PerformanceReport::new(REPORT));
    let evaluator = ConstraintEvaluator::new(&current, &[]);
    let constraint = absolute("any", Metric::Max, Operator::NotGreater, 1.0)
        .with_scope(LabelScope::AllLabels)
        .unwrap();
    assert_eq!(evaluator.evaluate(&constraint).status(), VerdictStatus::Unresolved);
}

// ============================================================================
// SECTION: Relative Constraints
// ============================================================================

#[test]
fn relative_last_three_runs_exceeding_tolerance_fails() {
    let history = vec![
        run_with_durations(1, 1_000, &[1_000]),
        run_with_durations(2, 2_000, &[40]),
        run_with_durations(3, 3_000, &[50]),
        run_with_durations(4, 4_000, &[60]),
    ];
    let current = run_with_durations(5, 5_000, &[56]);
    let evaluator = ConstraintEvaluator::new(&current, &history);

    let constraint = relative("trend", HistorySelector::LastRuns { count: 3 }, 10.0);
    let verdict = evaluator.evaluate(&constraint);
    let evaluation = evaluated(&verdict);
    assert_close(evaluation.reference_value.unwrap(), 50.0);
    assert_close(evaluation.constraint_value, 55.0);
    assert!(!evaluation.success);

    let improved = run_with_durations(5, 5_000, &[54]);
    let evaluator = ConstraintEvaluator::new(&improved, &history);
    let verdict = evaluator.evaluate(&constraint);
    assert!(evaluated(&verdict).success);
}

#[test]
fn relative_not_less_lowers_threshold() {
    let history = vec![run_with_durations(1, 0, &[100])];
    let current = run_with_durations(2, 1, &[95]);
    let evaluator = ConstraintEvaluator::new(&current, &history);
    let constraint = Constraint::relative(
        "floor",
        REPORT,
        Metric::Average,
        Operator::NotLess,
        HistorySelector::AllRuns,
        10.0,
    )
    .unwrap();
    let verdict = evaluator.evaluate(&constraint);
    assert_close(evaluated(&verdict).constraint_value, 90.0);
    assert!(evaluated(&verdict).success);
}

#[test]
fn date_range_is_inclusive_and_excludes_current_run() {
    let history = vec![
        run_with_durations(1, 1_000, &[10]),
        run_with_durations(2, 2_000, &[20]),
        run_with_durations(3, 3_000, &[30]),
        run_with_durations(4, 3_000, &[999]),
    ];
    let current = run_with_durations(4, 3_000, &[25]);
    let evaluator = ConstraintEvaluator::new(&current, &history);
    let selector = HistorySelector::DateRange {
        start: Timestamp::from_unix_millis(2_000),
        end: Timestamp::from_unix_millis(3_000),
    };

    let verdict = evaluator.evaluate(&relative("window", selector, 0.0));
    assert_close(evaluated(&verdict).reference_value.unwrap(), 25.0);
    assert!(evaluated(&verdict).success);
}

#[test]
fn relative_without_history_is_skipped() {
    let current = run_with_durations(1, 0, &[10]);
    let later = vec![run_with_durations(2, 1_000, &[10])];
    let evaluator = ConstraintEvaluator::new(&current, &later);

    let verdict = evaluator.evaluate(&relative("trend", HistorySelector::AllRuns, 5.0));
    assert!(matches!(verdict, ConstraintVerdict::Skipped { .. }));
    assert_eq!(verdict.status(), VerdictStatus::Skipped);
}

// ============================================================================
// SECTION: Batches
// ============================================================================

#[test]
fn invalid_constraints_abort_before_evaluation() {
    let current = run_with_durations(1, 0, &[10]);
    let evaluator = ConstraintEvaluator::new(&current, &[]);
    let mut broken = absolute("broken", Metric::Average, Operator::NotGreater, 1.0);
    broken.kind =
        ConstraintKind::Relative { history: HistorySelector::AllRuns, tolerance_percent: -1.0 };

    let err = evaluator
        .evaluate_all(&[absolute("ok", Metric::Average, Operator::NotGreater, 1.0), broken])
        .unwrap_err();
    assert!(matches!(err, ConstraintError::InvalidTolerance { .. }));

    let duplicate = absolute("ok", Metric::Max, Operator::NotGreater, 1.0);
    let err = evaluator
        .evaluate_all(&[absolute("ok", Metric::Average, Operator::NotGreater, 1.0), duplicate])
        .unwrap_err();
    assert!(matches!(err, ConstraintError::DuplicateId(_)));
}

#[test]
fn parallel_evaluation_preserves_input_order() {
    let history = vec![run_with_durations(1, 0, &[20])];
    let current = run_with_durations(2, 1, &[10, 20, 30]);
    let evaluator = ConstraintEvaluator::new(&current, &history);
    let constraints: Vec<Constraint> = (0 .. 11)
        .map(|index| {
            let threshold = f64::from(index) * 5.0;
            absolute(&format!("c{index}"), Metric::Average, Operator::NotGreater, threshold)
                .with_escalation(Escalation::Warning)
        })
        .collect();

    let sequential = evaluator.evaluate_all(&constraints).unwrap();
    let parallel =
        evaluator.evaluate_all_parallel(&constraints, NonZeroUsize::new(3).unwrap()).unwrap();
    assert_eq!(sequential, parallel);
    let ids: Vec<&str> = parallel.iter().map(|verdict| verdict.constraint_id().as_str()).collect();
    assert_eq!(ids.first(), Some(&"c0"));
    assert_eq!(ids.last(), Some(&"c10"));
    let passed =
        parallel.iter().filter(|verdict| verdict.status() == VerdictStatus::Passed).count();
    assert_eq!(passed, 7);
}
