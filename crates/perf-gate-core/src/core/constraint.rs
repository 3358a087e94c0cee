// crates/perf-gate-core/src/core/constraint.rs
// ============================================================================
// Module: Constraint Model
// Description: Typed pass/fail rules over report metrics.
// Purpose: Validate rules at construction so evaluation never sees bad input.
// Dependencies: crate::core::{identifiers, metrics, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Constraint`] compares one metric of one report against either a
//! literal threshold or a value derived from prior runs. Constraints are
//! validated up front; a malformed rule is a [`ConstraintError`] and aborts
//! before any evaluation starts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ConstraintId;
use crate::core::identifiers::ReportName;
use crate::core::metrics::Metric;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Operator
// ============================================================================

/// Comparison applied between the measured and the comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Measured value must not exceed the comparison value.
    NotGreater,
    /// Measured value must not fall below the comparison value.
    NotLess,
    /// Measured value must differ from the comparison value.
    NotEqual,
}

impl Operator {
    /// Returns the stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotGreater => "not_greater",
            Self::NotLess => "not_less",
            Self::NotEqual => "not_equal",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match compact(value).as_str() {
            "notgreater" | "<=" => Ok(Self::NotGreater),
            "notless" | ">=" => Ok(Self::NotLess),
            "notequal" | "!=" => Ok(Self::NotEqual),
            _ => Err(ConstraintError::UnknownOperator(value.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Escalation
// ============================================================================

/// Severity at which a failed constraint is surfaced.
///
/// # Invariants
/// - Ordered `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escalation {
    /// Record only.
    Info,
    /// Degrade the outcome to unstable.
    Warning,
    /// Degrade the outcome to failed.
    Error,
}

impl Escalation {
    /// Returns the stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Escalation {
    type Err = ConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match compact(value).as_str() {
            "info" | "information" => Ok(Self::Info),
            "warning" | "warn" | "unstable" => Ok(Self::Warning),
            "error" | "failure" | "failed" => Ok(Self::Error),
            _ => Err(ConstraintError::UnknownEscalation(value.to_string())),
        }
    }
}

/// Lowercases and strips separators for lenient enum parsing.
fn compact(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// SECTION: Scope & History
// ============================================================================

/// Which labels of the report a constraint reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum LabelScope {
    /// One named label (raw or normalized form).
    Label(String),
    /// Every label of the report.
    AllLabels,
    /// Run-wide metrics of the report.
    WholeReport,
}

/// Prior runs a relative constraint compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistorySelector {
    /// The `count` most recent runs numbered below the current run.
    LastRuns {
        /// Number of runs, at least one.
        count: u32,
    },
    /// Every prior run.
    AllRuns,
    /// Prior runs started within `[start, end]`, inclusive.
    DateRange {
        /// Inclusive lower bound.
        start: Timestamp,
        /// Inclusive upper bound.
        end: Timestamp,
    },
}

impl fmt::Display for HistorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastRuns { count } => write!(f, "last {count} runs"),
            Self::AllRuns => f.write_str("all runs"),
            Self::DateRange { start, end } => write!(f, "runs between {start} and {end}"),
        }
    }
}

/// How the comparison value is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Literal threshold.
    Absolute {
        /// Comparison value.
        threshold: f64,
    },
    /// Threshold derived from the historical average of the same metric.
    Relative {
        /// Runs to average.
        history: HistorySelector,
        /// Allowed deviation in percent of the historical average.
        tolerance_percent: f64,
    },
}

// ============================================================================
// SECTION: Constraint
// ============================================================================

/// Named rule over one metric of one report.
///
/// # Invariants
/// - [`Constraint::validate`] has passed before evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint identifier.
    pub id: ConstraintId,
    /// Report the constraint reads, by name.
    pub report: ReportName,
    /// Metric to read.
    pub metric: Metric,
    /// Comparison operator.
    pub operator: Operator,
    /// Severity of a failure.
    pub escalation: Escalation,
    /// Labels to read.
    pub scope: LabelScope,
    /// Comparison value source.
    pub kind: ConstraintKind,
}

impl Constraint {
    /// Builds and validates an absolute constraint over the whole report.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] when any field is invalid.
    pub fn absolute(
        id: impl Into<ConstraintId>,
        report: impl Into<ReportName>,
        metric: Metric,
        operator: Operator,
        threshold: f64,
    ) -> Result<Self, ConstraintError> {
        let constraint = Self {
            id: id.into(),
            report: report.into(),
            metric,
            operator,
            escalation: Escalation::Error,
            scope: LabelScope::WholeReport,
            kind: ConstraintKind::Absolute { threshold },
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Builds and validates a relative constraint over the whole report.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] when any field is invalid.
    pub fn relative(
        id: impl Into<ConstraintId>,
        report: impl Into<ReportName>,
        metric: Metric,
        operator: Operator,
        history: HistorySelector,
        tolerance_percent: f64,
    ) -> Result<Self, ConstraintError> {
        let constraint = Self {
            id: id.into(),
            report: report.into(),
            metric,
            operator,
            escalation: Escalation::Error,
            scope: LabelScope::WholeReport,
            kind: ConstraintKind::Relative { history, tolerance_percent },
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Returns the constraint with a different escalation.
    #[must_use]
    pub const fn with_escalation(mut self, escalation: Escalation) -> Self {
        self.escalation = escalation;
        self
    }

    /// Returns the constraint with a different label scope, revalidated.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::EmptyLabel`] for a blank label name.
    pub fn with_scope(mut self, scope: LabelScope) -> Result<Self, ConstraintError> {
        self.scope = scope;
        self.validate()?;
        Ok(self)
    }

    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] for blank names, non-finite thresholds,
    /// negative tolerances, zero run counts, or inverted date ranges.
    pub fn validate(&self) -> Result<(), ConstraintError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ConstraintError::EmptyId);
        }
        if self.report.as_str().trim().is_empty() {
            return Err(ConstraintError::EmptyReport(self.id.clone()));
        }
        if let LabelScope::Label(label) = &self.scope
            && label.trim().is_empty()
        {
            return Err(ConstraintError::EmptyLabel(self.id.clone()));
        }
        match self.kind {
            ConstraintKind::Absolute { threshold } => {
                if !threshold.is_finite() {
                    return Err(ConstraintError::NonFiniteThreshold {
                        id: self.id.clone(),
                        value: threshold,
                    });
                }
            }
            ConstraintKind::Relative { history, tolerance_percent } => {
                if !tolerance_percent.is_finite() || tolerance_percent < 0.0 {
                    return Err(ConstraintError::InvalidTolerance {
                        id: self.id.clone(),
                        value: tolerance_percent,
                    });
                }
                validate_history(&self.id, history)?;
            }
        }
        Ok(())
    }
}

/// Validates a history selector.
fn validate_history(id: &ConstraintId, history: HistorySelector) -> Result<(), ConstraintError> {
    match history {
        HistorySelector::LastRuns { count: 0 } => Err(ConstraintError::ZeroRunCount(id.clone())),
        HistorySelector::DateRange { start, end } if start > end => {
            Err(ConstraintError::InvertedDateRange { id: id.clone(), start, end })
        }
        HistorySelector::LastRuns { .. }
        | HistorySelector::AllRuns
        | HistorySelector::DateRange { .. } => Ok(()),
    }
}

/// Parses a textual threshold.
///
/// # Errors
///
/// Returns [`ConstraintError::InvalidThreshold`] when the text is not a
/// finite number.
pub fn parse_threshold(value: &str) -> Result<f64, ConstraintError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| ConstraintError::InvalidThreshold(value.to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Malformed constraint definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintError {
    /// Metric name not recognized.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    /// Operator name not recognized.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    /// Escalation name not recognized.
    #[error("unknown escalation: {0}")]
    UnknownEscalation(String),
    /// Threshold text is not a number.
    #[error("threshold is not a finite number: {0}")]
    InvalidThreshold(String),
    /// Constraint identifier is blank.
    #[error("constraint id must be non-empty")]
    EmptyId,
    /// Report selector is blank.
    #[error("constraint {0} must name a report")]
    EmptyReport(ConstraintId),
    /// Label scope names a blank label.
    #[error("constraint {0} names an empty label")]
    EmptyLabel(ConstraintId),
    /// Absolute threshold is NaN or infinite.
    #[error("constraint {id} threshold must be finite: {value}")]
    NonFiniteThreshold {
        /// Constraint identifier.
        id: ConstraintId,
        /// Offending value.
        value: f64,
    },
    /// Relative tolerance is negative or not finite.
    #[error("constraint {id} tolerance must be a non-negative percentage: {value}")]
    InvalidTolerance {
        /// Constraint identifier.
        id: ConstraintId,
        /// Offending value.
        value: f64,
    },
    /// `LastRuns` selector with zero runs.
    #[error("constraint {0} must select at least one prior run")]
    ZeroRunCount(ConstraintId),
    /// Date range whose start is after its end.
    #[error("constraint {id} date range starts at {start} after it ends at {end}")]
    InvertedDateRange {
        /// Constraint identifier.
        id: ConstraintId,
        /// Range start.
        start: Timestamp,
        /// Range end.
        end: Timestamp,
    },
    /// Two constraints share an identifier.
    #[error("duplicate constraint id: {0}")]
    DuplicateId(ConstraintId),
}

/// Validates a constraint set, rejecting duplicate identifiers.
///
/// # Errors
///
/// Returns the first [`ConstraintError`] found, in input order.
pub fn validate_all(constraints: &[Constraint]) -> Result<(), ConstraintError> {
    let mut seen = BTreeSet::new();
    for constraint in constraints {
        constraint.validate()?;
        if !seen.insert(constraint.id.clone()) {
            return Err(ConstraintError::DuplicateId(constraint.id.clone()));
        }
    }
    Ok(())
}
