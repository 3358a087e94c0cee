// crates/perf-gate-adapters/src/summary.rs
// ============================================================================
// Module: Summary Group Assembly
// Description: Shared builder turning loosely reported fields into groups.
// Purpose: Give every summary-style adapter the same fallback rules.
// Dependencies: perf-gate-core
// ============================================================================

//! ## Overview
//! Summary tools report different subsets of counts and latency figures.
//! [`GroupFields`] collects whatever a row provides and resolves it into a
//! [`SummaryGroup`]:
//! - successes come from an explicit success count, else total minus failures;
//! - min and max come from explicit values, else the 0th and 100th
//!   percentiles, else the outermost reported percentile, else the average.

use perf_gate_core::Percentile;
use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportName;
use perf_gate_core::SummaryGroup;

use crate::FormatError;

/// Loosely reported fields of one summary row, durations in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct GroupFields {
    /// Successful sample count.
    pub success: Option<u64>,
    /// Failed sample count.
    pub failure: Option<u64>,
    /// Total sample count.
    pub total: Option<u64>,
    /// Average duration.
    pub average: Option<f64>,
    /// Smallest duration.
    pub min: Option<f64>,
    /// Largest duration.
    pub max: Option<f64>,
    /// Reported percentiles as `(percent, value)`.
    pub percentiles: Vec<(f64, f64)>,
    /// Total bytes.
    pub bytes: Option<u64>,
}

impl GroupFields {
    /// Resolves the fields into a summary group.
    ///
    /// # Errors
    ///
    /// Returns a reason when the row carries no sample count or an invalid
    /// percentile rank.
    pub fn into_group(self, label: &str) -> Result<SummaryGroup, String> {
        let failure = self.failure.unwrap_or(0);
        let success = match (self.success, self.total) {
            (Some(success), _) => success,
            (None, Some(total)) => total.saturating_sub(failure),
            (None, None) => return Err(format!("group {label:?} reports no sample count")),
        };
        let mut group = SummaryGroup::new(label);
        group.success_count = success;
        group.failure_count = failure;
        group.bytes = self.bytes.unwrap_or(0);
        for (percent, value) in self.percentiles {
            let rank = Percentile::new(percent)
                .map_err(|err| format!("group {label:?} has invalid percentile: {err}"))?;
            group.percentiles.insert(rank, value);
        }
        let lowest = group.percentiles.first_key_value().map(|(_, value)| *value);
        let highest = group.percentiles.last_key_value().map(|(_, value)| *value);
        let average = self.average.or(lowest).unwrap_or(0.0);
        group.avg_ms = average;
        group.min_ms = self
            .min
            .or_else(|| group.percentiles.get(&Percentile::MIN).copied())
            .or(lowest)
            .unwrap_or(average);
        group.max_ms = self
            .max
            .or_else(|| group.percentiles.get(&Percentile::MAX).copied())
            .or(highest)
            .unwrap_or(average);
        Ok(group)
    }
}

/// Inserts a group, storing it as the report totals when `is_total` holds.
///
/// # Errors
///
/// Returns [`FormatError`] when the report rejects the group.
pub fn insert_group(
    report: &mut PerformanceReport,
    name: &ReportName,
    group: SummaryGroup,
    is_total: bool,
) -> Result<(), FormatError> {
    let result =
        if is_total { report.set_summary_totals(group) } else { report.add_group(group) };
    result.map_err(|err| FormatError::from_report(name, &err))
}
