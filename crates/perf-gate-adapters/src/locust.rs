// crates/perf-gate-adapters/src/locust.rs
// ============================================================================
// Module: Locust Adapter
// Description: Summary adapter for Locust request statistics CSV.
// Purpose: Turn per-endpoint Locust rows into summary groups.
// Dependencies: perf-gate-core, csv, serde, tracing
// ============================================================================

//! ## Overview
//! Locust writes one row per request type and name plus an aggregate row.
//! Both the legacy header (`Method`, `# requests`, `# failures`) and the
//! current header (`Type`, `Request Count`, `Failure Count`) are accepted.
//! Latency is in milliseconds. Percentile columns such as `90%` are read
//! when present; `N/A` cells are ignored. The request count includes
//! failures. Rows named by one of the configured total labels become the
//! report's summary totals.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportInput;
use perf_gate_core::stats::to_f64;
use serde::Deserialize;
use tracing::debug;

use crate::ContentProbe;
use crate::FormatError;
use crate::ReportAdapter;
use crate::numeric::parse_count;
use crate::numeric::parse_float;
use crate::numeric::round_to_u64;
use crate::summary::GroupFields;
use crate::summary::insert_group;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the Locust adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocustConfig {
    /// Row names treated as the grand total.
    #[serde(default = "default_total_labels")]
    pub total_labels: BTreeSet<String>,
}

impl Default for LocustConfig {
    fn default() -> Self {
        Self { total_labels: default_total_labels() }
    }
}

/// Returns the aggregate row names used by Locust releases.
fn default_total_labels() -> BTreeSet<String> {
    ["Aggregated", "Total"].into_iter().map(str::to_string).collect()
}

// ============================================================================
// SECTION: Column Layout
// ============================================================================

/// Column indices located from the header.
#[derive(Debug, Clone)]
struct Columns {
    /// Request type or method.
    kind: Option<usize>,
    /// Request name.
    name: usize,
    /// Request count.
    requests: usize,
    /// Failure count.
    failures: Option<usize>,
    /// Median latency.
    median: Option<usize>,
    /// Average latency.
    average: Option<usize>,
    /// Minimum latency.
    min: Option<usize>,
    /// Maximum latency.
    max: Option<usize>,
    /// Average response size.
    average_size: Option<usize>,
    /// Percentile columns as `(index, rank)`.
    percentiles: Vec<(usize, f64)>,
}

impl Columns {
    /// Locates columns in a header, case-insensitively.
    fn locate(header: &csv::StringRecord) -> Result<Self, String> {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|column| names.iter().any(|name| column.eq_ignore_ascii_case(name)))
        };
        let percentiles = header
            .iter()
            .enumerate()
            .filter_map(|(index, column)| {
                column.strip_suffix('%').and_then(parse_float).map(|rank| (index, rank))
            })
            .collect();
        Ok(Self {
            kind: find(&["Type", "Method"]),
            name: find(&["Name"]).ok_or("missing required column: Name")?,
            requests: find(&["# requests", "Request Count"])
                .ok_or("missing required column: # requests")?,
            failures: find(&["# failures", "Failure Count"]),
            median: find(&["Median response time", "Median Response Time"]),
            average: find(&["Average response time"]),
            min: find(&["Min response time"]),
            max: find(&["Max response time"]),
            average_size: find(&["Average Content Size", "Average content size"]),
            percentiles,
        })
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter for Locust statistics CSV.
#[derive(Debug, Clone, Default)]
pub struct LocustAdapter {
    /// Adapter configuration.
    config: LocustConfig,
}

impl LocustAdapter {
    /// Creates the adapter.
    #[must_use]
    pub const fn new(config: LocustConfig) -> Self {
        Self { config }
    }
}

impl ReportAdapter for LocustAdapter {
    fn name(&self) -> &'static str {
        "locust"
    }

    fn detect(&self, probe: &ContentProbe) -> bool {
        probe.header_has(&["name", "# requests"]) || probe.header_has(&["name", "request count"])
    }

    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError> {
        let name = &input.name;
        let mut reader =
            csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input.bytes.as_slice());
        let header = reader
            .headers()
            .map_err(|err| FormatError::new(name, format!("malformed CSV header: {err}")))?
            .clone();
        let columns = Columns::locate(&header).map_err(|reason| FormatError::new(name, reason))?;

        let mut report = PerformanceReport::new(name.clone());
        for record in reader.records() {
            let record =
                record.map_err(|err| FormatError::new(name, format!("malformed CSV: {err}")))?;
            let line = record.position().map_or(0, csv::Position::line);
            let row_name = record.get(columns.name).unwrap_or_default();
            let is_total = self.config.total_labels.contains(row_name);
            let label = match columns.kind.and_then(|index| record.get(index)) {
                Some(kind) if !kind.is_empty() && !is_total => format!("{kind} {row_name}"),
                _ => row_name.to_string(),
            };
            let group = fields_from(&record, &columns)
                .and_then(|fields| fields.into_group(&label))
                .map_err(|reason| FormatError::at_line(name, line, reason))?;
            insert_group(&mut report, name, group, is_total)?;
        }
        debug!(report = %name, labels = report.label_count(), "parsed Locust report");
        Ok(report)
    }
}

/// Reads the group fields of one row.
fn fields_from(record: &csv::StringRecord, columns: &Columns) -> Result<GroupFields, String> {
    let cell = |index: Option<usize>| {
        index
            .and_then(|index| record.get(index))
            .filter(|value| !value.is_empty() && *value != "N/A")
    };
    let millis = |index: Option<usize>, field: &str| -> Result<Option<f64>, String> {
        cell(index)
            .map(|value| parse_float(value).ok_or_else(|| format!("invalid {field}: {value}")))
            .transpose()
    };
    let requests = cell(Some(columns.requests)).unwrap_or("0");
    let requests =
        parse_count(requests).ok_or_else(|| format!("invalid request count: {requests}"))?;
    let failures = cell(columns.failures)
        .map(|value| parse_count(value).ok_or_else(|| format!("invalid failure count: {value}")))
        .transpose()?;

    let mut fields = GroupFields {
        total: Some(requests),
        failure: failures,
        average: millis(columns.average, "average response time")?,
        min: millis(columns.min, "min response time")?,
        max: millis(columns.max, "max response time")?,
        ..GroupFields::default()
    };
    if let Some(size) = millis(columns.average_size, "average content size")? {
        fields.bytes = round_to_u64(size * to_f64(requests));
    }
    if let Some(median) = millis(columns.median, "median response time")? {
        fields.percentiles.push((50.0, median));
    }
    for (index, rank) in &columns.percentiles {
        if let Some(value) = millis(Some(*index), "percentile")? {
            fields.percentiles.retain(|(existing, _)| (existing - rank).abs() > f64::EPSILON);
            fields.percentiles.push((*rank, value));
        }
    }
    Ok(fields)
}
