// crates/perf-gate-core/src/core/sample.rs
// ============================================================================
// Module: Sample Model
// Description: Request-level samples and pre-aggregated summary groups.
// Purpose: Provide the format-agnostic unit every adapter produces.
// Dependencies: crate::core::time, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Sample`] is one observed request. A [`SummaryGroup`] is a batch of
//! samples already reduced by the load-testing tool: counts, average, bounds
//! and a sparse percentile table. Groups are absorbed into aggregates as-is
//! and are never expanded back into samples.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::stats::Rank;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Percentile
// ============================================================================

/// Number of percentile steps per percent.
const HUNDREDTHS_PER_PERCENT: u32 = 100;
/// Upper bound of the percentile scale in hundredths.
const MAX_HUNDREDTHS: u32 = 100 * HUNDREDTHS_PER_PERCENT;

/// Percentile rank in `[0, 100]` with two decimal places of precision.
///
/// # Invariants
/// - Stored as hundredths of a percent, always `<= 10_000`.
/// - Equal ranks compare equal, so `90.0` and `99.9` are exact map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Percentile(u32);

impl Percentile {
    /// The 0th percentile (smallest value).
    pub const MIN: Self = Self(0);
    /// The 50th percentile (median).
    pub const MEDIAN: Self = Self(50 * HUNDREDTHS_PER_PERCENT);
    /// The 90th percentile.
    pub const P90: Self = Self(90 * HUNDREDTHS_PER_PERCENT);
    /// The 100th percentile (largest value).
    pub const MAX: Self = Self(MAX_HUNDREDTHS);

    /// Creates a percentile from a percentage in `[0, 100]`.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::InvalidPercentile`] when the value is not finite
    /// or falls outside `[0, 100]`.
    pub fn new(percent: f64) -> Result<Self, SampleError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(SampleError::InvalidPercentile(percent));
        }
        Ok(Self(percent_to_hundredths(percent)))
    }

    /// Creates a percentile from hundredths of a percent.
    #[must_use]
    pub const fn from_hundredths(hundredths: u32) -> Option<Self> {
        if hundredths > MAX_HUNDREDTHS { None } else { Some(Self(hundredths)) }
    }

    /// Returns the rank in hundredths of a percent.
    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }

    /// Returns the rank as a percentage.
    #[must_use]
    pub fn percent(self) -> f64 {
        f64::from(self.0) / f64::from(HUNDREDTHS_PER_PERCENT)
    }
}

impl TryFrom<u32> for Percentile {
    type Error = SampleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_hundredths(value).ok_or_else(|| {
            SampleError::InvalidPercentile(f64::from(value) / f64::from(HUNDREDTHS_PER_PERCENT))
        })
    }
}

impl From<Percentile> for u32 {
    fn from(value: Percentile) -> Self {
        value.0
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.percent())
    }
}

/// Converts a validated percentage into hundredths.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Input is validated to [0, 100], so the rounded value fits in u32."
)]
fn percent_to_hundredths(percent: f64) -> u32 {
    (percent * f64::from(HUNDREDTHS_PER_PERCENT)).round() as u32
}

// ============================================================================
// SECTION: Sample
// ============================================================================

/// One observed request.
///
/// # Invariants
/// - `duration_ms` is non-negative by construction.
/// - `label` is the raw label; normalization happens on insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Raw request label as emitted by the tool.
    pub label: String,
    /// Request start time.
    pub timestamp: Timestamp,
    /// Elapsed time in milliseconds.
    pub duration_ms: u64,
    /// Whether the request succeeded.
    pub success: bool,
    /// Optional HTTP status code text.
    pub http_code: Option<String>,
    /// Optional response size in bytes.
    pub size_bytes: Option<u64>,
}

impl Sample {
    /// Creates a successful sample without status or size details.
    #[must_use]
    pub fn new(label: impl Into<String>, timestamp: Timestamp, duration_ms: u64) -> Self {
        Self {
            label: label.into(),
            timestamp,
            duration_ms,
            success: true,
            http_code: None,
            size_bytes: None,
        }
    }

    /// Marks the sample as failed or successful.
    #[must_use]
    pub const fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Sets the HTTP status code.
    #[must_use]
    pub fn with_http_code(mut self, code: impl Into<String>) -> Self {
        self.http_code = Some(code.into());
        self
    }

    /// Sets the response size in bytes.
    #[must_use]
    pub const fn with_size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }
}

// ============================================================================
// SECTION: Summary Group
// ============================================================================

/// Pre-aggregated batch of samples sharing a label.
///
/// # Invariants
/// - All durations are finite and non-negative once [`SummaryGroup::validate`] passes.
/// - `percentiles` is sparse; tools report different rank sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryGroup {
    /// Raw group label.
    pub label: String,
    /// Number of successful samples.
    pub success_count: u64,
    /// Number of failed samples.
    pub failure_count: u64,
    /// Average duration in milliseconds.
    pub avg_ms: f64,
    /// Minimum duration in milliseconds.
    pub min_ms: f64,
    /// Maximum duration in milliseconds.
    pub max_ms: f64,
    /// Reported percentile values in milliseconds.
    pub percentiles: BTreeMap<Percentile, f64>,
    /// Total transferred bytes.
    pub bytes: u64,
}

impl SummaryGroup {
    /// Creates an empty group with the provided label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            success_count: 0,
            failure_count: 0,
            avg_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
            percentiles: BTreeMap::new(),
            bytes: 0,
        }
    }

    /// Returns the number of samples the group represents.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.success_count.saturating_add(self.failure_count)
    }

    /// Returns the value at a rank, interpolating when the tool did not
    /// report that rank.
    ///
    /// Known points are the reported percentiles anchored by `min_ms` at 0
    /// and `max_ms` at 100. Interpolation is linear between the nearest
    /// known neighbours.
    #[must_use]
    pub fn value_at(&self, rank: impl Into<Rank>) -> f64 {
        let rank = rank.into();
        if let Rank::Key(percentile) = rank
            && let Some(value) = self.percentiles.get(&percentile)
        {
            return *value;
        }
        let mut known: BTreeMap<Percentile, f64> = self.percentiles.clone();
        known.entry(Percentile::MIN).or_insert(self.min_ms);
        known.entry(Percentile::MAX).or_insert(self.max_ms);
        let points: Vec<(f64, f64)> =
            known.into_iter().map(|(key, value)| (key.percent(), value)).collect();
        let percent = rank.percent();
        let lower = points.iter().rev().find(|(at, _)| *at <= percent);
        let upper = points.iter().find(|(at, _)| *at >= percent);
        match (lower, upper) {
            (Some((lo_at, lo_value)), Some((hi_at, hi_value))) => {
                let span = hi_at - lo_at;
                if span <= 0.0 {
                    return *lo_value;
                }
                (hi_value - lo_value).mul_add((percent - lo_at) / span, *lo_value)
            }
            (Some((_, value)), None) | (None, Some((_, value))) => *value,
            (None, None) => self.avg_ms,
        }
    }

    /// Validates the group values.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::InvalidGroupValue`] when a duration is negative
    /// or not finite.
    pub fn validate(&self) -> Result<(), SampleError> {
        let named = [("avg", self.avg_ms), ("min", self.min_ms), ("max", self.max_ms)];
        for (name, value) in named {
            ensure_duration(&self.label, name, value)?;
        }
        for (rank, value) in &self.percentiles {
            ensure_duration(&self.label, &format!("p{rank}"), *value)?;
        }
        Ok(())
    }
}

/// Ensures a group duration is finite and non-negative.
fn ensure_duration(label: &str, field: &str, value: f64) -> Result<(), SampleError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(SampleError::InvalidGroupValue {
        label: label.to_string(),
        field: field.to_string(),
        value,
    })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Sample model validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// Percentile outside `[0, 100]` or not finite.
    #[error("percentile must be within [0, 100]: {0}")]
    InvalidPercentile(f64),
    /// Summary group carried a negative or non-finite duration.
    #[error("summary group {label} has invalid {field}: {value}")]
    InvalidGroupValue {
        /// Group label.
        label: String,
        /// Offending field name.
        field: String,
        /// Offending value.
        value: f64,
    },
}
