// crates/perf-gate-core/src/core/evaluation.rs
// ============================================================================
// Module: Constraint Evaluations
// Description: Per-constraint results, resolution errors, and skip reasons.
// Purpose: Carry evaluator output to the verdict aggregator and sinks.
// Dependencies: crate::core::{constraint, identifiers}, serde, thiserror
// ============================================================================

//! ## Overview
//! Each constraint yields exactly one [`ConstraintVerdict`]: an evaluated
//! comparison, an unresolved reference, or a skip because no history
//! matched. Verdict values are created fresh and never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::constraint::Escalation;
use crate::core::constraint::HistorySelector;
use crate::core::identifiers::ConstraintId;
use crate::core::identifiers::ReportName;

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Result of comparing one measured value against its comparison value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEvaluation {
    /// Evaluated constraint.
    pub constraint_id: ConstraintId,
    /// Raw label the value was read from; `None` for whole-report scope.
    pub label: Option<String>,
    /// Value read from the current run.
    pub measured_value: f64,
    /// Effective threshold the measured value was compared against.
    pub constraint_value: f64,
    /// Historical average for relative constraints.
    pub reference_value: Option<f64>,
    /// Whether the comparison held.
    pub success: bool,
    /// Severity of a failure.
    pub escalation: Escalation,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A constraint references something absent from the current run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionError {
    /// The named report is not part of the run.
    #[error("report {report} not found in current run")]
    MissingReport {
        /// Requested report.
        report: ReportName,
    },
    /// The named label is not part of the report.
    #[error("label {label} not found in report {report}")]
    MissingLabel {
        /// Report searched.
        report: ReportName,
        /// Requested label.
        label: String,
    },
    /// All-label scope over a report with no labels.
    #[error("report {report} has no labels")]
    EmptyReport {
        /// Report searched.
        report: ReportName,
    },
}

/// No prior run matched a relative constraint's selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("no historical values for report {report} in {selector}")]
pub struct HistoryUnavailable {
    /// Report whose history was searched.
    pub report: ReportName,
    /// Selector that matched nothing.
    pub selector: HistorySelector,
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Coarse verdict status used in exports and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Evaluated and held.
    Passed,
    /// Evaluated and violated.
    Failed,
    /// Could not be resolved against the run.
    Unresolved,
    /// No matching history.
    Skipped,
}

impl VerdictStatus {
    /// Returns the stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Unresolved => "unresolved",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of processing one constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ConstraintVerdict {
    /// The comparison ran.
    Evaluated(ConstraintEvaluation),
    /// The report or label could not be found.
    Unresolved {
        /// Constraint identifier.
        constraint_id: ConstraintId,
        /// Severity the constraint carries.
        escalation: Escalation,
        /// Resolution failure.
        error: ResolutionError,
    },
    /// No history matched a relative constraint.
    Skipped {
        /// Constraint identifier.
        constraint_id: ConstraintId,
        /// Severity the constraint carries.
        escalation: Escalation,
        /// Skip reason.
        reason: HistoryUnavailable,
    },
}

impl ConstraintVerdict {
    /// Returns the constraint identifier.
    #[must_use]
    pub const fn constraint_id(&self) -> &ConstraintId {
        match self {
            Self::Evaluated(evaluation) => &evaluation.constraint_id,
            Self::Unresolved { constraint_id, .. } | Self::Skipped { constraint_id, .. } => {
                constraint_id
            }
        }
    }

    /// Returns the constraint escalation.
    #[must_use]
    pub const fn escalation(&self) -> Escalation {
        match self {
            Self::Evaluated(evaluation) => evaluation.escalation,
            Self::Unresolved { escalation, .. } | Self::Skipped { escalation, .. } => *escalation,
        }
    }

    /// Returns the evaluation when the comparison ran.
    #[must_use]
    pub const fn evaluation(&self) -> Option<&ConstraintEvaluation> {
        match self {
            Self::Evaluated(evaluation) => Some(evaluation),
            Self::Unresolved { .. } | Self::Skipped { .. } => None,
        }
    }

    /// Returns the coarse status.
    #[must_use]
    pub const fn status(&self) -> VerdictStatus {
        match self {
            Self::Evaluated(evaluation) if evaluation.success => VerdictStatus::Passed,
            Self::Evaluated(_) => VerdictStatus::Failed,
            Self::Unresolved { .. } => VerdictStatus::Unresolved,
            Self::Skipped { .. } => VerdictStatus::Skipped,
        }
    }
}
