// crates/perf-gate-core/src/core/uri_report.rs
// ============================================================================
// Module: Label Aggregate
// Description: Per-label accumulation of samples or summary groups.
// Purpose: Compute per-label latency, error, and throughput statistics.
// Dependencies: crate::core::{label, metrics, report, sample, stats, time}
// ============================================================================

//! ## Overview
//! A [`UriReport`] accumulates everything observed for one normalized label
//! within one run. Running sums are updated on every insertion. Order
//! statistics come from a sorted duration list built lazily on first read
//! and dropped on every insertion, so a read after a write never observes a
//! stale ordering.
//!
//! Sample-based labels retain raw durations and compute percentiles exactly
//! with the index rule. Group-based labels never see raw durations; their
//! percentiles are the index rule applied to per-group values weighted by
//! group size.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use crate::core::label::LabelKey;
use crate::core::metrics::Metric;
use crate::core::metrics::MetricSet;
use crate::core::report::IngestionMode;
use crate::core::report::ReportError;
use crate::core::sample::Percentile;
use crate::core::sample::Sample;
use crate::core::sample::SummaryGroup;
use crate::core::stats::Rank;
use crate::core::stats::percent_of;
use crate::core::stats::to_f64;
use crate::core::stats::value_at_sorted;
use crate::core::stats::value_at_weighted;
use crate::core::stats::weighted_mean;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Content
// ============================================================================

/// Observations retained for one label.
#[derive(Debug, Clone, Default, PartialEq)]
enum LabelContent {
    /// Nothing inserted yet.
    #[default]
    Empty,
    /// Raw durations in insertion order.
    Samples(Vec<u64>),
    /// Summary groups in insertion order.
    Groups(Vec<SummaryGroup>),
}

// ============================================================================
// SECTION: Label Aggregate
// ============================================================================

/// Statistics for one normalized label within one run.
///
/// # Invariants
/// - `key` never changes after construction.
/// - Counters equal the sum over every inserted sample or group.
/// - A label holds either samples or groups, never both.
#[derive(Debug, Clone)]
pub struct UriReport {
    /// Normalized key.
    key: LabelKey,
    /// First raw label observed, used for display.
    raw_label: String,
    /// Retained observations.
    content: LabelContent,
    /// Number of samples represented.
    samples: u64,
    /// Number of failed samples represented.
    errors: u64,
    /// Sum of durations in milliseconds.
    total_duration_ms: f64,
    /// Sum of response sizes in bytes.
    total_bytes: u64,
    /// Earliest sample start.
    first_timestamp: Option<Timestamp>,
    /// Latest sample start.
    last_timestamp: Option<Timestamp>,
    /// Latest sample end (start plus duration).
    window_end: Option<Timestamp>,
    /// HTTP code of the most recent sample carrying one.
    http_code: Option<String>,
    /// Ascending durations, rebuilt on demand after each insertion.
    sorted: OnceLock<Vec<u64>>,
}

impl UriReport {
    /// Creates an empty aggregate for a raw label.
    #[must_use]
    pub fn new(raw_label: &str) -> Self {
        Self {
            key: LabelKey::normalize(raw_label),
            raw_label: raw_label.to_string(),
            content: LabelContent::Empty,
            samples: 0,
            errors: 0,
            total_duration_ms: 0.0,
            total_bytes: 0,
            first_timestamp: None,
            last_timestamp: None,
            window_end: None,
            http_code: None,
            sorted: OnceLock::new(),
        }
    }

    /// Returns the normalized key.
    #[must_use]
    pub const fn key(&self) -> &LabelKey {
        &self.key
    }

    /// Returns the first raw label observed.
    #[must_use]
    pub fn raw_label(&self) -> &str {
        &self.raw_label
    }

    /// Returns the ingestion mode, if anything has been inserted.
    #[must_use]
    pub const fn mode(&self) -> Option<IngestionMode> {
        match self.content {
            LabelContent::Empty => None,
            LabelContent::Samples(_) => Some(IngestionMode::Samples),
            LabelContent::Groups(_) => Some(IngestionMode::Summary),
        }
    }

    /// Adds one request-level sample.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IngestionModeConflict`] when the label already
    /// holds summary groups.
    pub fn add_sample(&mut self, sample: &Sample) -> Result<(), ReportError> {
        match &mut self.content {
            LabelContent::Groups(_) => {
                return Err(ReportError::IngestionModeConflict {
                    existing: IngestionMode::Summary,
                    attempted: IngestionMode::Samples,
                });
            }
            LabelContent::Samples(durations) => durations.push(sample.duration_ms),
            LabelContent::Empty => self.content = LabelContent::Samples(vec![sample.duration_ms]),
        }
        self.samples = self.samples.saturating_add(1);
        if !sample.success {
            self.errors = self.errors.saturating_add(1);
        }
        self.total_duration_ms += to_f64(sample.duration_ms);
        self.total_bytes = self.total_bytes.saturating_add(sample.size_bytes.unwrap_or(0));
        self.observe_window(sample.timestamp, sample.duration_ms);
        if let Some(code) = &sample.http_code {
            self.http_code = Some(code.clone());
        }
        self.sorted = OnceLock::new();
        Ok(())
    }

    /// Adds one pre-aggregated summary group.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IngestionModeConflict`] when the label already
    /// holds raw samples, or [`ReportError::InvalidGroup`] when the group
    /// values are not valid durations.
    pub fn add_group(&mut self, group: SummaryGroup) -> Result<(), ReportError> {
        group.validate().map_err(ReportError::InvalidGroup)?;
        if matches!(self.content, LabelContent::Samples(_)) {
            return Err(ReportError::IngestionModeConflict {
                existing: IngestionMode::Samples,
                attempted: IngestionMode::Summary,
            });
        }
        let count = group.total();
        self.samples = self.samples.saturating_add(count);
        self.errors = self.errors.saturating_add(group.failure_count);
        self.total_duration_ms = group.avg_ms.mul_add(to_f64(count), self.total_duration_ms);
        self.total_bytes = self.total_bytes.saturating_add(group.bytes);
        match &mut self.content {
            LabelContent::Groups(groups) => groups.push(group),
            LabelContent::Empty | LabelContent::Samples(_) => {
                self.content = LabelContent::Groups(vec![group]);
            }
        }
        self.sorted = OnceLock::new();
        Ok(())
    }

    /// Extends the observed time window with one sample.
    fn observe_window(&mut self, start: Timestamp, duration_ms: u64) {
        let end = start.saturating_add_millis(duration_ms);
        self.first_timestamp = Some(self.first_timestamp.map_or(start, |first| first.min(start)));
        self.last_timestamp = Some(self.last_timestamp.map_or(start, |last| last.max(start)));
        self.window_end = Some(self.window_end.map_or(end, |current| current.max(end)));
    }

    /// Returns the ascending duration list, building it if needed.
    fn sorted_durations(&self) -> &[u64] {
        self.sorted.get_or_init(|| match &self.content {
            LabelContent::Samples(durations) => {
                let mut sorted = durations.clone();
                sorted.sort_unstable();
                sorted
            }
            LabelContent::Empty | LabelContent::Groups(_) => Vec::new(),
        })
    }

    /// Returns the summary groups absorbed by this label.
    #[must_use]
    pub fn groups(&self) -> &[SummaryGroup] {
        match &self.content {
            LabelContent::Groups(groups) => groups,
            LabelContent::Empty | LabelContent::Samples(_) => &[],
        }
    }

    /// Returns the raw durations in insertion order.
    #[must_use]
    pub fn durations(&self) -> &[u64] {
        match &self.content {
            LabelContent::Samples(durations) => durations,
            LabelContent::Empty | LabelContent::Groups(_) => &[],
        }
    }

    /// Returns the number of samples represented.
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    /// Returns the number of failed samples represented.
    #[must_use]
    pub const fn errors(&self) -> u64 {
        self.errors
    }

    /// Returns the sum of durations in milliseconds.
    #[must_use]
    pub const fn total_duration_ms(&self) -> f64 {
        self.total_duration_ms
    }

    /// Returns the mean duration, or zero when empty.
    #[must_use]
    pub fn average(&self) -> f64 {
        match &self.content {
            LabelContent::Groups(groups) => weighted_mean(&group_points(groups, |g| g.avg_ms)),
            LabelContent::Empty | LabelContent::Samples(_) => {
                if self.samples == 0 { 0.0 } else { self.total_duration_ms / to_f64(self.samples) }
            }
        }
    }

    /// Returns the duration at a rank, or zero when empty.
    #[must_use]
    pub fn value_at(&self, rank: impl Into<Rank>) -> f64 {
        let rank = rank.into();
        match &self.content {
            LabelContent::Empty => 0.0,
            LabelContent::Samples(_) => {
                value_at_sorted(self.sorted_durations(), rank).map_or(0.0, to_f64)
            }
            LabelContent::Groups(groups) => {
                let points = group_points(groups, |group| group.value_at(rank));
                value_at_weighted(&points, rank).unwrap_or(0.0)
            }
        }
    }

    /// Returns the duration at a percentage in `[0, 100]`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidPercentile`] when `percent` is outside
    /// `[0, 100]` or not finite.
    pub fn duration_at(&self, percent: f64) -> Result<f64, ReportError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(ReportError::InvalidPercentile(percent));
        }
        Ok(self.value_at(Rank::Exact(percent)))
    }

    /// Returns the 50th percentile duration.
    #[must_use]
    pub fn median(&self) -> f64 {
        self.value_at(Percentile::MEDIAN)
    }

    /// Returns the 90th percentile duration.
    #[must_use]
    pub fn percentile_90(&self) -> f64 {
        self.value_at(Percentile::P90)
    }

    /// Returns the smallest duration, or zero when empty.
    #[must_use]
    pub fn min(&self) -> f64 {
        match &self.content {
            LabelContent::Groups(groups) => groups
                .iter()
                .filter(|group| group.total() > 0)
                .map(|group| group.min_ms)
                .reduce(f64::min)
                .unwrap_or(0.0),
            LabelContent::Empty | LabelContent::Samples(_) => self.value_at(Percentile::MIN),
        }
    }

    /// Returns the largest duration, or zero when empty.
    #[must_use]
    pub fn max(&self) -> f64 {
        match &self.content {
            LabelContent::Groups(groups) => groups
                .iter()
                .filter(|group| group.total() > 0)
                .map(|group| group.max_ms)
                .reduce(f64::max)
                .unwrap_or(0.0),
            LabelContent::Empty | LabelContent::Samples(_) => self.value_at(Percentile::MAX),
        }
    }

    /// Returns failed samples as a percentage of all samples.
    #[must_use]
    pub fn error_percent(&self) -> f64 {
        percent_of(self.errors, self.samples)
    }

    /// Returns the total response size in bytes.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Returns the mean response size in bytes.
    #[must_use]
    pub fn average_size_bytes(&self) -> f64 {
        if self.samples == 0 { 0.0 } else { to_f64(self.total_bytes) / to_f64(self.samples) }
    }

    /// Returns the HTTP code of the most recent sample carrying one.
    #[must_use]
    pub fn http_code(&self) -> Option<&str> {
        self.http_code.as_deref()
    }

    /// Returns the earliest sample start.
    #[must_use]
    pub const fn first_timestamp(&self) -> Option<Timestamp> {
        self.first_timestamp
    }

    /// Returns the latest sample start.
    #[must_use]
    pub const fn last_timestamp(&self) -> Option<Timestamp> {
        self.last_timestamp
    }

    /// Returns the latest sample end.
    #[must_use]
    pub const fn window_end(&self) -> Option<Timestamp> {
        self.window_end
    }

    /// Returns requests per second over the observed window.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        throughput(self.samples, self.first_timestamp, self.window_end)
    }

    /// Returns the value of one constraint metric.
    #[must_use]
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Average => self.average(),
            Metric::Median => self.median(),
            Metric::Percentile90 => self.percentile_90(),
            Metric::Max => self.max(),
            Metric::Min => self.min(),
            Metric::ErrorPercent => self.error_percent(),
        }
    }

    /// Returns a snapshot of every exposed metric.
    #[must_use]
    pub fn metrics(&self) -> MetricSet {
        MetricSet {
            samples: self.samples,
            errors: self.errors,
            average: self.average(),
            median: self.median(),
            percentile_90: self.percentile_90(),
            min: self.min(),
            max: self.max(),
            error_percent: self.error_percent(),
            throughput: self.throughput(),
            average_size_bytes: self.average_size_bytes(),
        }
    }
}

impl PartialEq for UriReport {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.raw_label == other.raw_label
            && self.content == other.content
            && self.samples == other.samples
            && self.errors == other.errors
            && self.total_bytes == other.total_bytes
            && self.http_code == other.http_code
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps non-empty groups to `(value, weight)` points.
pub(crate) fn group_points<'a>(
    groups: impl IntoIterator<Item = &'a SummaryGroup>,
    value: impl Fn(&SummaryGroup) -> f64,
) -> Vec<(f64, u64)> {
    groups
        .into_iter()
        .filter(|group| group.total() > 0)
        .map(|group| (value(group), group.total()))
        .collect()
}

/// Computes requests per second over `[start, end]`.
pub(crate) fn throughput(samples: u64, start: Option<Timestamp>, end: Option<Timestamp>) -> f64 {
    let (Some(start), Some(end)) = (start, end) else {
        return 0.0;
    };
    let window_ms = end.as_unix_millis().saturating_sub(start.as_unix_millis());
    let Ok(window_ms) = u64::try_from(window_ms) else {
        return 0.0;
    };
    if window_ms == 0 {
        return 0.0;
    }
    to_f64(samples) * 1_000.0 / to_f64(window_ms)
}
