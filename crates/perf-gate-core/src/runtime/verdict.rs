// crates/perf-gate-core/src/runtime/verdict.rs
// ============================================================================
// Module: Verdict Aggregation
// Description: Reduces per-constraint verdicts into one run outcome.
// Purpose: Apply escalation semantics with a monotonic fold.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The gate outcome is the worst escalation among failed evaluations:
//! a failed `error` constraint fails the run, a failed `warning` constraint
//! makes it unstable, and a failed `info` constraint is recorded without
//! changing the outcome. The fold only ever moves towards a worse outcome,
//! so appending passing verdicts never changes the result.
//!
//! Unresolved and skipped constraints do not change the outcome; their
//! identifiers are carried on the summary so callers can surface them.
//! Input files that failed to parse are counted on the summary as well, so
//! a run evaluated on partial statistics says so in its published outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ConstraintId;
use crate::core::ConstraintVerdict;
use crate::core::Escalation;
use crate::core::ReportName;
use crate::core::VerdictStatus;

// ============================================================================
// SECTION: Gate Outcome
// ============================================================================

/// Externally visible run status.
///
/// # Invariants
/// - Ordered `Success < Unstable < Failure`; aggregation takes the maximum.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    /// No failure at warning or error level.
    #[default]
    Success,
    /// At least one warning-level failure.
    Unstable,
    /// At least one error-level failure.
    Failure,
}

impl GateOutcome {
    /// Returns the outcome a single failed constraint imposes.
    #[must_use]
    pub const fn for_failed(escalation: Escalation) -> Self {
        match escalation {
            Escalation::Info => Self::Success,
            Escalation::Warning => Self::Unstable,
            Escalation::Error => Self::Failure,
        }
    }

    /// Returns the worse of two outcomes.
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }

    /// Returns the stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unstable => "unstable",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Verdict Summary
// ============================================================================

/// Aggregated outcome with counts and annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictSummary {
    /// Folded outcome.
    pub outcome: GateOutcome,
    /// Evaluated and held.
    pub passed: usize,
    /// Evaluated and violated, at any escalation.
    pub failed: usize,
    /// Could not be resolved.
    pub unresolved: usize,
    /// Skipped for lack of history.
    pub skipped: usize,
    /// Info-level failures recorded without affecting the outcome.
    pub recorded_failures: Vec<ConstraintId>,
    /// Constraints that could not be resolved.
    pub unresolved_ids: Vec<ConstraintId>,
    /// Constraints skipped for lack of history.
    pub skipped_ids: Vec<ConstraintId>,
    /// Number of input files that failed to parse.
    #[serde(default)]
    pub failed_inputs: usize,
    /// Names of the input files that failed to parse.
    #[serde(default)]
    pub failed_input_names: Vec<ReportName>,
}

impl VerdictSummary {
    /// Folds one verdict into the summary.
    pub fn record(&mut self, verdict: &ConstraintVerdict) {
        match verdict.status() {
            VerdictStatus::Passed => self.passed += 1,
            VerdictStatus::Failed => {
                self.failed += 1;
                let escalation = verdict.escalation();
                if escalation == Escalation::Info {
                    self.recorded_failures.push(verdict.constraint_id().clone());
                }
                self.outcome = self.outcome.worst(GateOutcome::for_failed(escalation));
            }
            VerdictStatus::Unresolved => {
                self.unresolved += 1;
                self.unresolved_ids.push(verdict.constraint_id().clone());
            }
            VerdictStatus::Skipped => {
                self.skipped += 1;
                self.skipped_ids.push(verdict.constraint_id().clone());
            }
        }
    }

    /// Records input files that failed to parse.
    pub fn record_failed_inputs(&mut self, names: impl IntoIterator<Item = ReportName>) {
        self.failed_input_names.extend(names);
        self.failed_inputs = self.failed_input_names.len();
    }

    /// Returns the total number of verdicts folded.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.unresolved + self.skipped
    }
}

/// Reduces verdicts into a summary.
#[must_use]
pub fn aggregate(verdicts: &[ConstraintVerdict]) -> VerdictSummary {
    let mut summary = VerdictSummary::default();
    for verdict in verdicts {
        summary.record(verdict);
    }
    summary
}
