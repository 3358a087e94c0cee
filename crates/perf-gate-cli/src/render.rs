// crates/perf-gate-cli/src/render.rs
// ============================================================================
// Module: Report Rendering
// Description: One-line report summaries and export payloads.
// Purpose: Shared formatting for `parse`, `evaluate`, and `export`.
// Dependencies: perf-gate-core
// ============================================================================

//! ## Overview
//! Text summaries print every run-wide metric with two decimals. When a
//! baseline is attached the average and 90th percentile deltas follow.

use std::fmt::Write as _;

use perf_gate_core::ConstraintExport;
use perf_gate_core::ConstraintVerdict;
use perf_gate_core::ExportError;
use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportExport;

/// Serialization format for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty JSON document.
    Json,
    /// CSV with a header row.
    Csv,
}

impl ExportFormat {
    /// Returns the file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Renders a one-line summary of a report.
#[must_use]
pub fn report_line(report: &PerformanceReport) -> String {
    let mode = report.mode().map_or_else(|| "empty".to_string(), |mode| mode.to_string());
    let mut line = format!(
        "{} [{mode}] labels {} samples {} errors {} ({:.2}%) avg {:.2} median {:.2} \
         p90 {:.2} min {:.2} max {:.2} throughput {:.2}/s",
        report.name(),
        report.label_count(),
        report.samples(),
        report.errors(),
        report.error_percent(),
        report.average(),
        report.median(),
        report.percentile_90(),
        report.min(),
        report.max(),
        report.throughput(),
    );
    if report.baseline().is_some() {
        let delta = report.diff();
        let _ = write!(
            line,
            " | vs baseline avg {:+.2} p90 {:+.2} errors {:+.2}%",
            delta.average, delta.percentile_90, delta.error_percent
        );
    }
    line
}

/// Serializes one report export.
///
/// # Errors
///
/// Returns [`ExportError`] when serialization fails.
pub fn report_export(
    report: &PerformanceReport,
    format: ExportFormat,
) -> Result<String, ExportError> {
    let export = ReportExport::from_report(report);
    match format {
        ExportFormat::Json => export.to_json(),
        ExportFormat::Csv => export.to_csv(),
    }
}

/// Serializes the constraint verdict export.
///
/// # Errors
///
/// Returns [`ExportError`] when serialization fails.
pub fn constraint_export(
    verdicts: &[ConstraintVerdict],
    format: ExportFormat,
) -> Result<String, ExportError> {
    let export = ConstraintExport::from_verdicts(verdicts);
    match format {
        ExportFormat::Json => export.to_json(),
        ExportFormat::Csv => export.to_csv(),
    }
}
