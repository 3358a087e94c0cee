// crates/perf-gate-core/src/core/stats.rs
// ============================================================================
// Module: Percentile Statistics
// Description: Index-rule percentile selection over sorted and weighted data.
// Purpose: Share one percentile convention across labels, runs, and groups.
// Dependencies: crate::core::sample
// ============================================================================

//! ## Overview
//! Percentiles use a fixed index rule: for `n` ascending values and rank `p`,
//! select index `floor(n * p / 100) - 1` clamped into `[0, n - 1]`. Rank 0
//! therefore selects the smallest value and rank 100 the largest. A
//! [`Rank::Key`] is evaluated in integer arithmetic over hundredths of a
//! percent; a [`Rank::Exact`] applies the floor to the requested percentage
//! as given, without rounding it to a key first.
//!
//! The weighted variant applies the same rule to `(value, weight)` pairs as
//! if each value were repeated `weight` times, without materializing the
//! repetition. Summary-only reports use it to approximate run-wide
//! percentiles from per-group values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use crate::core::sample::Percentile;

// ============================================================================
// SECTION: Index Rule
// ============================================================================

/// Hundredths of a percent in one whole.
const SCALE: u128 = 10_000;

/// Requested percentile rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rank {
    /// A rank on the hundredths scale used as a summary-group key.
    Key(Percentile),
    /// An arbitrary percentage in `[0, 100]`.
    Exact(f64),
}

impl Rank {
    /// Returns the rank as a percentage.
    #[must_use]
    pub fn percent(self) -> f64 {
        match self {
            Self::Key(percentile) => percentile.percent(),
            Self::Exact(percent) => percent,
        }
    }

    /// Returns the selected index for `count` values, or `None` when empty.
    #[must_use]
    pub fn index(self, count: u64) -> Option<u64> {
        match self {
            Self::Key(percentile) => percentile_index(count, percentile),
            Self::Exact(percent) => percent_index(count, percent),
        }
    }
}

impl From<Percentile> for Rank {
    fn from(value: Percentile) -> Self {
        Self::Key(value)
    }
}

/// Returns the selected index for `count` values at `percentile`.
///
/// Returns `None` when `count` is zero.
#[must_use]
pub fn percentile_index(count: u64, percentile: Percentile) -> Option<u64> {
    if count == 0 {
        return None;
    }
    let scaled = u128::from(count) * u128::from(percentile.hundredths()) / SCALE;
    let rank = u64::try_from(scaled).unwrap_or(u64::MAX);
    Some(rank.saturating_sub(1).min(count - 1))
}

/// Returns the selected index for `count` values at `percent`, applying the
/// floor to `count * percent / 100` directly.
///
/// Returns `None` when `count` is zero. `percent` is clamped into `[0, 100]`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The floored rank lies in [0, count] and the cast saturates."
)]
#[must_use]
pub fn percent_index(count: u64, percent: f64) -> Option<u64> {
    if count == 0 {
        return None;
    }
    let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
    let rank = (to_f64(count) * percent / 100.0).floor() as u64;
    Some(rank.saturating_sub(1).min(count - 1))
}

/// Selects the value at `rank` from an ascending slice.
#[must_use]
pub fn value_at_sorted<T: Copy>(sorted: &[T], rank: impl Into<Rank>) -> Option<T> {
    let count = u64::try_from(sorted.len()).ok()?;
    let index = rank.into().index(count)?;
    let index = usize::try_from(index).ok()?;
    sorted.get(index).copied()
}

/// Selects the value at `rank` from weighted points.
///
/// Points with zero weight are ignored. Returns `None` when the total weight
/// is zero.
#[must_use]
pub fn value_at_weighted(points: &[(f64, u64)], rank: impl Into<Rank>) -> Option<f64> {
    let mut ordered: Vec<(f64, u64)> =
        points.iter().copied().filter(|(_, weight)| *weight > 0).collect();
    ordered.sort_by(|left, right| left.0.partial_cmp(&right.0).unwrap_or(Ordering::Equal));
    let total = ordered.iter().fold(0_u64, |acc, (_, weight)| acc.saturating_add(*weight));
    let index = rank.into().index(total)?;
    let mut cumulative = 0_u64;
    for (value, weight) in &ordered {
        cumulative = cumulative.saturating_add(*weight);
        if index < cumulative {
            return Some(*value);
        }
    }
    ordered.last().map(|(value, _)| *value)
}

/// Returns the count-weighted mean of `(value, weight)` pairs.
///
/// Returns `0.0` when the total weight is zero.
#[must_use]
pub fn weighted_mean(points: &[(f64, u64)]) -> f64 {
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    for (value, weight) in points {
        let weight = to_f64(*weight);
        total_weight += weight;
        weighted_sum = value.mul_add(weight, weighted_sum);
    }
    if total_weight == 0.0 { 0.0 } else { weighted_sum / total_weight }
}

/// Returns `part / whole * 100`, or zero when `whole` is zero.
#[must_use]
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    to_f64(part) / to_f64(whole) * 100.0
}

/// Converts a counter into a float for statistics.
#[allow(clippy::cast_precision_loss, reason = "Counters beyond 2^53 lose only sub-unit precision.")]
#[must_use]
pub const fn to_f64(value: u64) -> f64 {
    value as f64
}
