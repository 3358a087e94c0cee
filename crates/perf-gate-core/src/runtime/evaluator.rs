// crates/perf-gate-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Constraint Evaluator
// Description: Resolves constraints against the current run and its history.
// Purpose: Produce exactly one verdict per constraint, in input order.
// Dependencies: crate::core, tracing
// ============================================================================

//! ## Overview
//! Evaluation runs a fixed pipeline per constraint: resolve the report,
//! resolve the measured value(s), resolve the comparison value, apply the
//! operator, and emit a verdict. Missing reports or labels are unresolved
//! rather than passing, and relative constraints without matching history
//! are skipped rather than failing.
//!
//! The evaluator only reads sealed reports, so constraints may be evaluated
//! on several threads at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroUsize;
use std::thread;

use tracing::debug;
use tracing::warn;

use crate::core::Constraint;
use crate::core::ConstraintError;
use crate::core::ConstraintEvaluation;
use crate::core::ConstraintKind;
use crate::core::ConstraintVerdict;
use crate::core::HistorySelector;
use crate::core::HistoryUnavailable;
use crate::core::LabelKey;
use crate::core::LabelScope;
use crate::core::Operator;
use crate::core::PerformanceReport;
use crate::core::ResolutionError;
use crate::core::RunRecord;
use crate::core::UriReport;
use crate::core::stats::to_f64;
use crate::core::validate_all;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Absolute tolerance absorbing floating-point noise in ordered comparisons.
pub const COMPARISON_EPSILON: f64 = 1e-9;

// ============================================================================
// SECTION: Operator Semantics
// ============================================================================

/// Applies an operator to a measured and a comparison value.
#[must_use]
#[allow(clippy::float_cmp, reason = "not_equal is defined as exact inequality.")]
pub fn apply_operator(operator: Operator, measured: f64, comparison: f64) -> bool {
    match operator {
        Operator::NotGreater => measured <= comparison + COMPARISON_EPSILON,
        Operator::NotLess => measured >= comparison - COMPARISON_EPSILON,
        Operator::NotEqual => measured != comparison,
    }
}

/// Derives the effective threshold of a relative constraint.
///
/// `not_greater` allows the historical average plus the tolerance,
/// `not_less` allows the average minus the tolerance, and `not_equal`
/// compares against the average itself.
#[must_use]
pub fn relative_threshold(operator: Operator, average: f64, tolerance_percent: f64) -> f64 {
    let factor = tolerance_percent / 100.0;
    match operator {
        Operator::NotGreater => average * (1.0 + factor),
        Operator::NotLess => average * (1.0 - factor),
        Operator::NotEqual => average,
    }
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Metric source within one report.
#[derive(Clone, Copy)]
enum Target<'a> {
    /// Run-wide values.
    Report,
    /// One label.
    Label(&'a UriReport),
}

/// Outcome of resolving the comparison value.
enum Comparison {
    /// Threshold resolved.
    Resolved {
        /// Effective threshold.
        threshold: f64,
        /// Historical average, for relative constraints.
        reference: Option<f64>,
    },
    /// No history matched.
    Unavailable,
}

/// Evaluates constraints for one run against its history.
///
/// # Invariants
/// - Every report of `current` is sealed before evaluation.
/// - `history` may include the current run; it is always excluded.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintEvaluator<'a> {
    /// Run under evaluation.
    current: &'a RunRecord,
    /// Prior runs available for relative constraints.
    history: &'a [RunRecord],
}

impl<'a> ConstraintEvaluator<'a> {
    /// Creates an evaluator over a run and its history.
    #[must_use]
    pub const fn new(current: &'a RunRecord, history: &'a [RunRecord]) -> Self {
        Self { current, history }
    }

    /// Evaluates one validated constraint.
    #[must_use]
    pub fn evaluate(&self, constraint: &Constraint) -> ConstraintVerdict {
        let Some(report) = self.current.report(&constraint.report) else {
            return unresolved(
                constraint,
                ResolutionError::MissingReport { report: constraint.report.clone() },
            );
        };
        let verdict = match &constraint.scope {
            LabelScope::WholeReport => self.evaluate_target(constraint, report, Target::Report),
            LabelScope::Label(name) => match report.label_by_name(name) {
                Some(label) => self.evaluate_target(constraint, report, Target::Label(label)),
                None => unresolved(
                    constraint,
                    ResolutionError::MissingLabel {
                        report: constraint.report.clone(),
                        label: name.clone(),
                    },
                ),
            },
            LabelScope::AllLabels => self.evaluate_all_labels(constraint, report),
        };
        debug!(
            constraint = %constraint.id,
            status = %verdict.status(),
            "constraint evaluated"
        );
        verdict
    }

    /// Evaluates every label and reduces to one verdict.
    ///
    /// The first failing label wins; otherwise the last evaluated label is
    /// reported. Labels without history are skipped individually, and the
    /// constraint is skipped only when every label was.
    fn evaluate_all_labels(
        &self,
        constraint: &Constraint,
        report: &PerformanceReport,
    ) -> ConstraintVerdict {
        let labels = report.labels();
        if labels.is_empty() {
            return unresolved(
                constraint,
                ResolutionError::EmptyReport { report: constraint.report.clone() },
            );
        }
        let mut last_evaluated = None;
        let mut first_unavailable = None;
        for label in labels {
            let verdict = self.evaluate_target(constraint, report, Target::Label(label));
            match verdict.evaluation().map(|evaluation| evaluation.success) {
                Some(false) => return verdict,
                Some(true) => last_evaluated = Some(verdict),
                None => {
                    if first_unavailable.is_none() {
                        first_unavailable = Some(verdict);
                    }
                }
            }
        }
        last_evaluated.or(first_unavailable).unwrap_or_else(|| {
            unresolved(
                constraint,
                ResolutionError::EmptyReport { report: constraint.report.clone() },
            )
        })
    }

    /// Evaluates a constraint against one metric source.
    fn evaluate_target(
        &self,
        constraint: &Constraint,
        report: &PerformanceReport,
        target: Target<'_>,
    ) -> ConstraintVerdict {
        let (measured, label) = match target {
            Target::Report => (report.metric(constraint.metric), None),
            Target::Label(label) => {
                (label.metric(constraint.metric), Some(label.raw_label().to_string()))
            }
        };
        let key = match target {
            Target::Report => None,
            Target::Label(label) => Some(label.key()),
        };
        let (threshold, reference) = match self.comparison(constraint, key) {
            Comparison::Resolved { threshold, reference } => (threshold, reference),
            Comparison::Unavailable => {
                return ConstraintVerdict::Skipped {
                    constraint_id: constraint.id.clone(),
                    escalation: constraint.escalation,
                    reason: HistoryUnavailable {
                        report: constraint.report.clone(),
                        selector: history_selector(constraint),
                    },
                };
            }
        };
        let success = apply_operator(constraint.operator, measured, threshold);
        if !success {
            warn!(
                constraint = %constraint.id,
                label = label.as_deref().unwrap_or("<report>"),
                measured,
                threshold,
                escalation = %constraint.escalation,
                "constraint violated"
            );
        }
        ConstraintVerdict::Evaluated(ConstraintEvaluation {
            constraint_id: constraint.id.clone(),
            label,
            measured_value: measured,
            constraint_value: threshold,
            reference_value: reference,
            success,
            escalation: constraint.escalation,
        })
    }

    /// Resolves the comparison value.
    fn comparison(&self, constraint: &Constraint, key: Option<&LabelKey>) -> Comparison {
        match constraint.kind {
            ConstraintKind::Absolute { threshold } => {
                Comparison::Resolved { threshold, reference: None }
            }
            ConstraintKind::Relative { history, tolerance_percent } => {
                let values: Vec<f64> = self
                    .select_history(history)
                    .into_iter()
                    .filter_map(|run| run.report(&constraint.report))
                    .filter_map(|report| match key {
                        None => Some(report.metric(constraint.metric)),
                        Some(key) => report.label(key).map(|label| label.metric(constraint.metric)),
                    })
                    .collect();
                if values.is_empty() {
                    return Comparison::Unavailable;
                }
                let count = u64::try_from(values.len()).unwrap_or(u64::MAX);
                let average = values.iter().sum::<f64>() / to_f64(count);
                Comparison::Resolved {
                    threshold: relative_threshold(constraint.operator, average, tolerance_percent),
                    reference: Some(average),
                }
            }
        }
    }

    /// Selects prior runs for a history selector.
    fn select_history(&self, selector: HistorySelector) -> Vec<&'a RunRecord> {
        let current = self.current;
        let is_current =
            |run: &RunRecord| run.number == current.number || run.run_id == current.run_id;
        match selector {
            HistorySelector::LastRuns { count } => {
                let mut prior: Vec<&RunRecord> = self
                    .history
                    .iter()
                    .filter(|run| run.number < current.number && !is_current(run))
                    .collect();
                prior.sort_by(|left, right| right.number.cmp(&left.number));
                prior.truncate(usize::try_from(count).unwrap_or(usize::MAX));
                prior
            }
            HistorySelector::AllRuns => self
                .history
                .iter()
                .filter(|run| run.number < current.number && !is_current(run))
                .collect(),
            HistorySelector::DateRange { start, end } => self
                .history
                .iter()
                .filter(|run| !is_current(run) && run.started_at >= start && run.started_at <= end)
                .collect(),
        }
    }

    /// Validates and evaluates constraints sequentially, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] before evaluating anything when any
    /// constraint is invalid.
    pub fn evaluate_all(
        &self,
        constraints: &[Constraint],
    ) -> Result<Vec<ConstraintVerdict>, ConstraintError> {
        validate_all(constraints)?;
        Ok(constraints.iter().map(|constraint| self.evaluate(constraint)).collect())
    }

    /// Validates and evaluates constraints on up to `workers` threads.
    ///
    /// Verdicts are returned in input order.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] before evaluating anything when any
    /// constraint is invalid.
    pub fn evaluate_all_parallel(
        &self,
        constraints: &[Constraint],
        workers: NonZeroUsize,
    ) -> Result<Vec<ConstraintVerdict>, ConstraintError> {
        validate_all(constraints)?;
        if constraints.is_empty() {
            return Ok(Vec::new());
        }
        let chunk_size = constraints.len().div_ceil(workers.get());
        let verdicts = thread::scope(|scope| {
            let handles: Vec<_> = constraints
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk.iter().map(|constraint| self.evaluate(constraint)).collect::<Vec<_>>()
                    })
                })
                .collect();
            let mut verdicts = Vec::with_capacity(constraints.len());
            for handle in handles {
                match handle.join() {
                    Ok(chunk) => verdicts.extend(chunk),
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }
            verdicts
        });
        Ok(verdicts)
    }
}

/// Builds an unresolved verdict.
fn unresolved(constraint: &Constraint, error: ResolutionError) -> ConstraintVerdict {
    warn!(constraint = %constraint.id, error = %error, "constraint unresolved");
    ConstraintVerdict::Unresolved {
        constraint_id: constraint.id.clone(),
        escalation: constraint.escalation,
        error,
    }
}

/// Returns the history selector of a relative constraint.
fn history_selector(constraint: &Constraint) -> HistorySelector {
    match constraint.kind {
        ConstraintKind::Relative { history, .. } => history,
        ConstraintKind::Absolute { .. } => HistorySelector::AllRuns,
    }
}
