// crates/perf-gate-core/src/core/metrics.rs
// ============================================================================
// Module: Metric Snapshots
// Description: Metric identifiers, metric snapshots, and baseline deltas.
// Purpose: Give labels, runs, baselines, and constraints one metric vocabulary.
// Dependencies: crate::core::constraint, serde
// ============================================================================

//! ## Overview
//! [`MetricSet`] is an immutable snapshot of everything a report or label
//! exposes. Baselines are stored as snapshots and diffs are computed field by
//! field as `current - baseline`; a missing baseline yields
//! [`MetricDelta::zero`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::core::constraint::ConstraintError;

// ============================================================================
// SECTION: Metric Identifier
// ============================================================================

/// Metric a constraint can reference.
///
/// # Invariants
/// - Closed set; wire names are stable snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean duration in milliseconds.
    Average,
    /// 50th percentile duration in milliseconds.
    Median,
    /// 90th percentile duration in milliseconds.
    #[serde(rename = "p90")]
    Percentile90,
    /// Largest duration in milliseconds.
    Max,
    /// Smallest duration in milliseconds.
    Min,
    /// Failed samples as a percentage of all samples.
    ErrorPercent,
}

impl Metric {
    /// All metrics in a stable order.
    pub const ALL: [Self; 6] = [
        Self::Average,
        Self::Median,
        Self::Percentile90,
        Self::Max,
        Self::Min,
        Self::ErrorPercent,
    ];

    /// Returns the stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Median => "median",
            Self::Percentile90 => "p90",
            Self::Max => "max",
            Self::Min => "min",
            Self::ErrorPercent => "error_percent",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "average" | "avg" => Ok(Self::Average),
            "median" | "p50" => Ok(Self::Median),
            "p90" | "line90" | "percentile_90" => Ok(Self::Percentile90),
            "max" | "maximum" => Ok(Self::Max),
            "min" | "minimum" => Ok(Self::Min),
            "error_percent" | "errors" | "error" => Ok(Self::ErrorPercent),
            _ => Err(ConstraintError::UnknownMetric(value.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Metric Snapshot
// ============================================================================

/// Snapshot of the metrics exposed by a label or a whole report.
///
/// # Invariants
/// - Durations are milliseconds; `error_percent` is in `[0, 100]`.
/// - Empty scopes report zero for every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Number of samples represented.
    pub samples: u64,
    /// Number of failed samples represented.
    pub errors: u64,
    /// Mean duration.
    pub average: f64,
    /// 50th percentile duration.
    pub median: f64,
    /// 90th percentile duration.
    pub percentile_90: f64,
    /// Smallest duration.
    pub min: f64,
    /// Largest duration.
    pub max: f64,
    /// Failed samples as a percentage.
    pub error_percent: f64,
    /// Requests per second over the observed window.
    pub throughput: f64,
    /// Mean response size in bytes.
    pub average_size_bytes: f64,
}

impl MetricSet {
    /// Returns the value of a constraint metric.
    #[must_use]
    pub const fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Average => self.average,
            Metric::Median => self.median,
            Metric::Percentile90 => self.percentile_90,
            Metric::Max => self.max,
            Metric::Min => self.min,
            Metric::ErrorPercent => self.error_percent,
        }
    }

    /// Computes `self - baseline` for every field.
    #[must_use]
    pub fn delta_from(&self, baseline: &Self) -> MetricDelta {
        MetricDelta {
            samples: signed_difference(self.samples, baseline.samples),
            errors: signed_difference(self.errors, baseline.errors),
            average: self.average - baseline.average,
            median: self.median - baseline.median,
            percentile_90: self.percentile_90 - baseline.percentile_90,
            min: self.min - baseline.min,
            max: self.max - baseline.max,
            error_percent: self.error_percent - baseline.error_percent,
            throughput: self.throughput - baseline.throughput,
            average_size_bytes: self.average_size_bytes - baseline.average_size_bytes,
        }
    }
}

// ============================================================================
// SECTION: Metric Delta
// ============================================================================

/// Field-wise difference between a report and its baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    /// Sample count difference.
    pub samples: i64,
    /// Error count difference.
    pub errors: i64,
    /// Mean duration difference.
    pub average: f64,
    /// Median difference.
    pub median: f64,
    /// 90th percentile difference.
    pub percentile_90: f64,
    /// Minimum difference.
    pub min: f64,
    /// Maximum difference.
    pub max: f64,
    /// Error percentage difference.
    pub error_percent: f64,
    /// Throughput difference.
    pub throughput: f64,
    /// Mean response size difference.
    pub average_size_bytes: f64,
}

impl MetricDelta {
    /// Returns the neutral delta used when no baseline is attached.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            samples: 0,
            errors: 0,
            average: 0.0,
            median: 0.0,
            percentile_90: 0.0,
            min: 0.0,
            max: 0.0,
            error_percent: 0.0,
            throughput: 0.0,
            average_size_bytes: 0.0,
        }
    }

    /// Returns the delta of a constraint metric.
    #[must_use]
    pub const fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Average => self.average,
            Metric::Median => self.median,
            Metric::Percentile90 => self.percentile_90,
            Metric::Max => self.max,
            Metric::Min => self.min,
            Metric::ErrorPercent => self.error_percent,
        }
    }
}

/// Returns `left - right` as a saturating signed value.
fn signed_difference(left: u64, right: u64) -> i64 {
    if left >= right {
        i64::try_from(left - right).unwrap_or(i64::MAX)
    } else {
        i64::try_from(right - left).map_or(i64::MIN, |value| -value)
    }
}
