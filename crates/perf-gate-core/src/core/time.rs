// crates/perf-gate-core/src/core/time.rs
// ============================================================================
// Module: Perf Gate Time Model
// Description: Canonical timestamp representation for samples and runs.
// Purpose: Provide deterministic, replayable time values across reports.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Perf Gate stores every instant as unix epoch milliseconds. The core never
//! reads wall-clock time; adapters derive timestamps from report content and
//! hosts supply run start times.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::PrimitiveDateTime;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp in unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No monotonicity is enforced; ordering is a caller responsibility.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(value: i64) -> Self {
        Self(value)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Converts an offset date-time into a timestamp.
    #[must_use]
    pub fn from_offset_datetime(value: OffsetDateTime) -> Self {
        let millis = value.unix_timestamp_nanos() / 1_000_000;
        Self(i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Converts a naive date-time, interpreted as UTC, into a timestamp.
    #[must_use]
    pub fn from_primitive_utc(value: PrimitiveDateTime) -> Self {
        Self::from_offset_datetime(value.assume_utc())
    }

    /// Returns the timestamp shifted forward by a duration in milliseconds.
    #[must_use]
    pub fn saturating_add_millis(self, millis: u64) -> Self {
        let delta = i64::try_from(millis).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(delta))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
