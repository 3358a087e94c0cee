// crates/perf-gate-core/src/core/report.rs
// ============================================================================
// Module: Run Aggregate
// Description: Whole-run statistics over every label in one report file.
// Purpose: Own per-label aggregates, run counters, totals, and baselines.
// Dependencies: crate::core::{identifiers, label, metrics, sample, stats, time, uri_report}
// ============================================================================

//! ## Overview
//! A [`PerformanceReport`] owns every [`UriReport`] produced from one report
//! file. Its ingestion mode is fixed by the first insertion: request-level
//! reports retain durations and compute run-wide percentiles exactly, while
//! summary reports back-derive run-wide values from group summaries.
//!
//! Back-derivation is an approximation. Run-wide averages are the
//! count-weighted mean of group averages and run-wide percentiles apply the
//! index rule to per-group values weighted by group size. When the tool
//! reported a grand-total group, the totals are used directly instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ReportName;
use crate::core::label::LabelKey;
use crate::core::metrics::Metric;
use crate::core::metrics::MetricDelta;
use crate::core::metrics::MetricSet;
use crate::core::sample::Percentile;
use crate::core::sample::Sample;
use crate::core::sample::SampleError;
use crate::core::sample::SummaryGroup;
use crate::core::stats::Rank;
use crate::core::stats::percent_of;
use crate::core::stats::to_f64;
use crate::core::stats::value_at_sorted;
use crate::core::stats::value_at_weighted;
use crate::core::stats::weighted_mean;
use crate::core::time::Timestamp;
use crate::core::uri_report::UriReport;
use crate::core::uri_report::group_points;
use crate::core::uri_report::throughput;

// ============================================================================
// SECTION: Ingestion Mode
// ============================================================================

/// How a report receives its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionMode {
    /// Request-level samples with retained durations.
    Samples,
    /// Pre-aggregated summary groups.
    Summary,
}

impl fmt::Display for IngestionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Samples => f.write_str("samples"),
            Self::Summary => f.write_str("summary"),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report ingestion and query errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    /// Samples and summary groups were mixed within one report.
    #[error("report already ingests {existing}; cannot insert {attempted}")]
    IngestionModeConflict {
        /// Mode fixed by the first insertion.
        existing: IngestionMode,
        /// Mode of the rejected insertion.
        attempted: IngestionMode,
    },
    /// Insertion after ingestion completed.
    #[error("report {0} is sealed")]
    Sealed(ReportName),
    /// Percentile outside `[0, 100]`.
    #[error("percentile must be within [0, 100]: {0}")]
    InvalidPercentile(f64),
    /// A second baseline was attached.
    #[error("report {0} already has a baseline")]
    BaselineAlreadyAttached(ReportName),
    /// Summary group failed validation.
    #[error(transparent)]
    InvalidGroup(SampleError),
    /// Shared report lock was poisoned.
    #[error("shared report mutex poisoned")]
    LockPoisoned,
}

// ============================================================================
// SECTION: Baseline
// ============================================================================

/// Metric snapshot of a previous run used only for diffing.
///
/// # Invariants
/// - Captured once and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    /// Run-wide metrics of the baseline report.
    pub report: MetricSet,
    /// Per-label metrics of the baseline report.
    pub labels: BTreeMap<LabelKey, MetricSet>,
}

impl BaselineSnapshot {
    /// Captures the metrics of a finished report.
    #[must_use]
    pub fn capture(report: &PerformanceReport) -> Self {
        Self {
            report: report.metrics(),
            labels: report
                .labels
                .iter()
                .map(|(key, label)| (key.clone(), label.metrics()))
                .collect(),
        }
    }
}

// ============================================================================
// SECTION: Performance Report
// ============================================================================

/// Aggregated statistics for one report file of one run.
///
/// # Invariants
/// - `mode` is set by the first insertion and never changes.
/// - Run counters equal the sum over all labels.
/// - After [`PerformanceReport::seal`] no insertion succeeds.
/// - The baseline is attached at most once.
#[derive(Debug, Clone)]
pub struct PerformanceReport {
    /// Report identity (source file name).
    name: ReportName,
    /// Per-label aggregates keyed by normalized label.
    labels: BTreeMap<LabelKey, UriReport>,
    /// Ingestion mode fixed by the first insertion.
    mode: Option<IngestionMode>,
    /// Run-wide sample count.
    samples: u64,
    /// Run-wide failure count.
    errors: u64,
    /// Run-wide sum of durations.
    total_duration_ms: f64,
    /// Run-wide sum of response sizes.
    total_bytes: u64,
    /// Grand-total group reported by a summary tool.
    totals: Option<SummaryGroup>,
    /// Attached baseline snapshot.
    baseline: Option<BaselineSnapshot>,
    /// Whether ingestion has completed.
    sealed: bool,
    /// Ascending run-wide durations, rebuilt on demand after each insertion.
    sorted: OnceLock<Vec<u64>>,
}

impl PerformanceReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(name: impl Into<ReportName>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            mode: None,
            samples: 0,
            errors: 0,
            total_duration_ms: 0.0,
            total_bytes: 0,
            totals: None,
            baseline: None,
            sealed: false,
            sorted: OnceLock::new(),
        }
    }

    /// Returns the report name.
    #[must_use]
    pub const fn name(&self) -> &ReportName {
        &self.name
    }

    /// Returns the ingestion mode, if anything has been inserted.
    #[must_use]
    pub const fn mode(&self) -> Option<IngestionMode> {
        self.mode
    }

    /// Returns true once ingestion has completed.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Marks ingestion as complete.
    pub const fn seal(&mut self) {
        self.sealed = true;
    }

    /// Checks that an insertion in `attempted` mode is allowed.
    fn admit(&self, attempted: IngestionMode) -> Result<(), ReportError> {
        if self.sealed {
            return Err(ReportError::Sealed(self.name.clone()));
        }
        match self.mode {
            Some(existing) if existing != attempted => {
                Err(ReportError::IngestionModeConflict { existing, attempted })
            }
            _ => Ok(()),
        }
    }

    /// Returns the label entry for a raw label, creating it if needed.
    fn label_entry(&mut self, raw_label: &str) -> &mut UriReport {
        self.labels
            .entry(LabelKey::normalize(raw_label))
            .or_insert_with(|| UriReport::new(raw_label))
    }

    /// Adds one request-level sample.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Sealed`] after sealing or
    /// [`ReportError::IngestionModeConflict`] when the report holds groups.
    pub fn add_sample(&mut self, sample: &Sample) -> Result<(), ReportError> {
        self.admit(IngestionMode::Samples)?;
        self.label_entry(&sample.label).add_sample(sample)?;
        self.mode = Some(IngestionMode::Samples);
        self.samples = self.samples.saturating_add(1);
        if !sample.success {
            self.errors = self.errors.saturating_add(1);
        }
        self.total_duration_ms += to_f64(sample.duration_ms);
        self.total_bytes = self.total_bytes.saturating_add(sample.size_bytes.unwrap_or(0));
        self.sorted = OnceLock::new();
        Ok(())
    }

    /// Adds one summary group as a per-label entry.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Sealed`] after sealing,
    /// [`ReportError::IngestionModeConflict`] when the report holds samples,
    /// or [`ReportError::InvalidGroup`] for invalid group values.
    pub fn add_group(&mut self, group: SummaryGroup) -> Result<(), ReportError> {
        self.admit(IngestionMode::Summary)?;
        group.validate().map_err(ReportError::InvalidGroup)?;
        let count = group.total();
        let failures = group.failure_count;
        let duration = group.avg_ms * to_f64(count);
        let bytes = group.bytes;
        let raw_label = group.label.clone();
        self.label_entry(&raw_label).add_group(group)?;
        self.mode = Some(IngestionMode::Summary);
        self.samples = self.samples.saturating_add(count);
        self.errors = self.errors.saturating_add(failures);
        self.total_duration_ms += duration;
        self.total_bytes = self.total_bytes.saturating_add(bytes);
        Ok(())
    }

    /// Stores the grand-total group reported by a summary tool.
    ///
    /// A later totals group replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`PerformanceReport::add_group`].
    pub fn set_summary_totals(&mut self, totals: SummaryGroup) -> Result<(), ReportError> {
        self.admit(IngestionMode::Summary)?;
        totals.validate().map_err(ReportError::InvalidGroup)?;
        self.mode = Some(IngestionMode::Summary);
        self.totals = Some(totals);
        Ok(())
    }

    /// Returns the grand-total group, if the tool reported one.
    #[must_use]
    pub const fn summary_totals(&self) -> Option<&SummaryGroup> {
        self.totals.as_ref()
    }

    /// Returns the number of labels.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns the aggregate for a normalized key.
    #[must_use]
    pub fn label(&self, key: &LabelKey) -> Option<&UriReport> {
        self.labels.get(key)
    }

    /// Returns the aggregate for a raw label, normalizing it first.
    #[must_use]
    pub fn label_by_name(&self, raw_label: &str) -> Option<&UriReport> {
        self.labels.get(&LabelKey::normalize(raw_label))
    }

    /// Returns labels in display order: reverse lexicographic by raw label.
    #[must_use]
    pub fn labels(&self) -> Vec<&UriReport> {
        let mut ordered: Vec<&UriReport> = self.labels.values().collect();
        ordered.sort_by(|left, right| right.raw_label().cmp(left.raw_label()));
        ordered
    }

    /// Returns every summary group across labels.
    fn all_groups(&self) -> Vec<&SummaryGroup> {
        self.labels.values().flat_map(UriReport::groups).collect()
    }

    /// Returns the ascending run-wide duration list, building it if needed.
    fn sorted_durations(&self) -> &[u64] {
        self.sorted.get_or_init(|| {
            let mut sorted: Vec<u64> =
                self.labels.values().flat_map(|label| label.durations().iter().copied()).collect();
            sorted.sort_unstable();
            sorted
        })
    }

    /// Returns the run-wide sample count.
    #[must_use]
    pub fn samples(&self) -> u64 {
        self.totals.as_ref().map_or(self.samples, SummaryGroup::total)
    }

    /// Returns the run-wide failure count.
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.totals.as_ref().map_or(self.errors, |totals| totals.failure_count)
    }

    /// Returns the run-wide mean duration.
    #[must_use]
    pub fn average(&self) -> f64 {
        if let Some(totals) = &self.totals {
            return totals.avg_ms;
        }
        match self.mode {
            Some(IngestionMode::Summary) => {
                weighted_mean(&group_points(self.all_groups(), |group| group.avg_ms))
            }
            Some(IngestionMode::Samples) | None => {
                if self.samples == 0 { 0.0 } else { self.total_duration_ms / to_f64(self.samples) }
            }
        }
    }

    /// Returns the run-wide duration at a rank.
    #[must_use]
    pub fn value_at(&self, rank: impl Into<Rank>) -> f64 {
        let rank = rank.into();
        if let Some(totals) = &self.totals {
            return totals.value_at(rank);
        }
        match self.mode {
            Some(IngestionMode::Summary) => {
                let points = group_points(self.all_groups(), |group| group.value_at(rank));
                value_at_weighted(&points, rank).unwrap_or(0.0)
            }
            Some(IngestionMode::Samples) => {
                value_at_sorted(self.sorted_durations(), rank).map_or(0.0, to_f64)
            }
            None => 0.0,
        }
    }

    /// Returns the run-wide duration at a percentage in `[0, 100]`.
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

    /// Returns the run-wide median.
    #[must_use]
    pub fn median(&self) -> f64 {
        self.value_at(Percentile::MEDIAN)
    }

    /// Returns the run-wide 90th percentile.
    #[must_use]
    pub fn percentile_90(&self) -> f64 {
        self.value_at(Percentile::P90)
    }

    /// Returns the run-wide minimum.
    #[must_use]
    pub fn min(&self) -> f64 {
        if let Some(totals) = &self.totals {
            return totals.min_ms;
        }
        match self.mode {
            Some(IngestionMode::Summary) => self
                .labels
                .values()
                .filter(|label| label.samples() > 0)
                .map(UriReport::min)
                .reduce(f64::min)
                .unwrap_or(0.0),
            Some(IngestionMode::Samples) | None => self.value_at(Percentile::MIN),
        }
    }

    /// Returns the run-wide maximum.
    #[must_use]
    pub fn max(&self) -> f64 {
        if let Some(totals) = &self.totals {
            return totals.max_ms;
        }
        match self.mode {
            Some(IngestionMode::Summary) => self
                .labels
                .values()
                .filter(|label| label.samples() > 0)
                .map(UriReport::max)
                .reduce(f64::max)
                .unwrap_or(0.0),
            Some(IngestionMode::Samples) | None => self.value_at(Percentile::MAX),
        }
    }

    /// Returns failed samples as a percentage of all samples.
    #[must_use]
    pub fn error_percent(&self) -> f64 {
        percent_of(self.errors(), self.samples())
    }

    /// Returns the run-wide total response size.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.totals.as_ref().map_or(self.total_bytes, |totals| totals.bytes)
    }

    /// Returns the run-wide mean response size.
    #[must_use]
    pub fn average_size_bytes(&self) -> f64 {
        let samples = self.samples();
        if samples == 0 { 0.0 } else { to_f64(self.total_bytes()) / to_f64(samples) }
    }

    /// Returns the earliest sample start across labels.
    #[must_use]
    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.labels.values().filter_map(UriReport::first_timestamp).min()
    }

    /// Returns the latest sample start across labels.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.labels.values().filter_map(UriReport::last_timestamp).max()
    }

    /// Returns requests per second over the run window.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let end = self.labels.values().filter_map(UriReport::window_end).max();
        throughput(self.samples, self.first_timestamp(), end)
    }

    /// Returns the run-wide value of one constraint metric.
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

    /// Returns a snapshot of every run-wide metric.
    #[must_use]
    pub fn metrics(&self) -> MetricSet {
        MetricSet {
            samples: self.samples(),
            errors: self.errors(),
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

    /// Attaches a baseline snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::BaselineAlreadyAttached`] on a second call.
    pub fn attach_baseline(&mut self, baseline: BaselineSnapshot) -> Result<(), ReportError> {
        if self.baseline.is_some() {
            return Err(ReportError::BaselineAlreadyAttached(self.name.clone()));
        }
        self.baseline = Some(baseline);
        Ok(())
    }

    /// Returns the attached baseline, if any.
    #[must_use]
    pub const fn baseline(&self) -> Option<&BaselineSnapshot> {
        self.baseline.as_ref()
    }

    /// Returns run-wide deltas against the baseline, or zeros without one.
    #[must_use]
    pub fn diff(&self) -> MetricDelta {
        self.baseline
            .as_ref()
            .map_or_else(MetricDelta::zero, |baseline| self.metrics().delta_from(&baseline.report))
    }

    /// Returns per-label deltas against the baseline.
    ///
    /// Returns zeros when no baseline is attached, the label is unknown, or
    /// the baseline did not contain the label.
    #[must_use]
    pub fn label_diff(&self, key: &LabelKey) -> MetricDelta {
        let Some(baseline) = &self.baseline else {
            return MetricDelta::zero();
        };
        match (self.labels.get(key), baseline.labels.get(key)) {
            (Some(current), Some(previous)) => current.metrics().delta_from(previous),
            _ => MetricDelta::zero(),
        }
    }
}

// ============================================================================
// SECTION: Shared Report
// ============================================================================

/// Report shared by several writers combining partial files of one run.
///
/// # Invariants
/// - Every insertion holds the lock, so cached orderings are never raced.
#[derive(Debug, Clone)]
pub struct SharedPerformanceReport {
    /// Shared report instance.
    inner: Arc<Mutex<PerformanceReport>>,
}

impl SharedPerformanceReport {
    /// Wraps a report for shared insertion.
    #[must_use]
    pub fn new(report: PerformanceReport) -> Self {
        Self { inner: Arc::new(Mutex::new(report)) }
    }

    /// Runs `apply` while holding the report lock.
    fn with_report<T>(
        &self,
        apply: impl FnOnce(&mut PerformanceReport) -> Result<T, ReportError>,
    ) -> Result<T, ReportError> {
        let mut guard = self.inner.lock().map_err(|_| ReportError::LockPoisoned)?;
        apply(&mut guard)
    }

    /// Adds one sample under the lock.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the insertion is rejected or the lock is
    /// poisoned.
    pub fn add_sample(&self, sample: &Sample) -> Result<(), ReportError> {
        self.with_report(|report| report.add_sample(sample))
    }

    /// Adds one summary group under the lock.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the insertion is rejected or the lock is
    /// poisoned.
    pub fn add_group(&self, group: SummaryGroup) -> Result<(), ReportError> {
        self.with_report(|report| report.add_group(group))
    }

    /// Seals the report and returns a copy of its final state.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::LockPoisoned`] when the lock is poisoned.
    pub fn seal(&self) -> Result<PerformanceReport, ReportError> {
        self.with_report(|report| {
            report.seal();
            Ok(report.clone())
        })
    }
}
