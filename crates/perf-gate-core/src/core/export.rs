// crates/perf-gate-core/src/core/export.rs
// ============================================================================
// Module: Flat Export
// Description: Record-per-label and record-per-constraint export tables.
// Purpose: Provide stable JSON and CSV artifacts for downstream tooling.
// Dependencies: crate::core::{evaluation, report}, csv, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Exports are flat tables with stable field names. Numeric fields use the
//! shortest round-trip float representation in both JSON and CSV, so
//! re-reading an export reproduces the exported values exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::constraint::Escalation;
use crate::core::evaluation::ConstraintVerdict;
use crate::core::evaluation::VerdictStatus;
use crate::core::identifiers::ConstraintId;
use crate::core::identifiers::ReportName;
use crate::core::report::PerformanceReport;

// ============================================================================
// SECTION: Label Export
// ============================================================================

/// One exported label row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    /// Raw label.
    pub uri: String,
    /// Sample count.
    pub samples: u64,
    /// Mean duration.
    pub average: f64,
    /// Smallest duration.
    pub min: f64,
    /// Median duration.
    pub median: f64,
    /// 90th percentile duration.
    pub ninetieth: f64,
    /// Largest duration.
    pub max: f64,
    /// Last observed HTTP code.
    pub http_code: Option<String>,
    /// Failed samples in percent.
    pub error_percent: f64,
}

/// Exported label table of one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportExport {
    /// Report name.
    pub report: ReportName,
    /// Label rows in display order.
    pub labels: Vec<LabelRecord>,
}

impl ReportExport {
    /// Builds the export table of a report.
    #[must_use]
    pub fn from_report(report: &PerformanceReport) -> Self {
        let labels = report
            .labels()
            .into_iter()
            .map(|label| LabelRecord {
                uri: label.raw_label().to_string(),
                samples: label.samples(),
                average: label.average(),
                min: label.min(),
                median: label.median(),
                ninetieth: label.percentile_90(),
                max: label.max(),
                http_code: label.http_code().map(str::to_string),
                error_percent: label.error_percent(),
            })
            .collect();
        Self { report: report.name().clone(), labels }
    }

    /// Serializes the table as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] when serialization fails.
    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|err| ExportError::Json(err.to_string()))
    }

    /// Parses a JSON table.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] for malformed input.
    pub fn from_json(input: &str) -> Result<Self, ExportError> {
        serde_json::from_str(input).map_err(|err| ExportError::Json(err.to_string()))
    }

    /// Serializes the label rows as CSV with a header line.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] when serialization fails.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        write_csv(&self.labels)
    }

    /// Parses CSV label rows into a table for `report`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] for malformed input.
    pub fn from_csv(report: impl Into<ReportName>, input: &str) -> Result<Self, ExportError> {
        Ok(Self { report: report.into(), labels: read_csv(input)? })
    }
}

// ============================================================================
// SECTION: Constraint Export
// ============================================================================

/// One exported constraint row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    /// Constraint identifier.
    pub id: ConstraintId,
    /// Label the value was read from.
    pub label: Option<String>,
    /// Measured value, when evaluated.
    pub measured: Option<f64>,
    /// Effective threshold, when evaluated.
    pub threshold: Option<f64>,
    /// Constraint escalation.
    pub escalation: Escalation,
    /// Whether the comparison held; false unless evaluated.
    pub success: bool,
    /// Coarse status.
    pub status: VerdictStatus,
}

impl From<&ConstraintVerdict> for ConstraintRecord {
    fn from(verdict: &ConstraintVerdict) -> Self {
        let evaluation = verdict.evaluation();
        Self {
            id: verdict.constraint_id().clone(),
            label: evaluation.and_then(|evaluation| evaluation.label.clone()),
            measured: evaluation.map(|evaluation| evaluation.measured_value),
            threshold: evaluation.map(|evaluation| evaluation.constraint_value),
            escalation: verdict.escalation(),
            success: evaluation.is_some_and(|evaluation| evaluation.success),
            status: verdict.status(),
        }
    }
}

/// Exported constraint table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintExport {
    /// Constraint rows in evaluation order.
    pub constraints: Vec<ConstraintRecord>,
}

impl ConstraintExport {
    /// Builds the export table from verdicts.
    #[must_use]
    pub fn from_verdicts(verdicts: &[ConstraintVerdict]) -> Self {
        Self { constraints: verdicts.iter().map(ConstraintRecord::from).collect() }
    }

    /// Serializes the table as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] when serialization fails.
    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|err| ExportError::Json(err.to_string()))
    }

    /// Parses a JSON table.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] for malformed input.
    pub fn from_json(input: &str) -> Result<Self, ExportError> {
        serde_json::from_str(input).map_err(|err| ExportError::Json(err.to_string()))
    }

    /// Serializes the rows as CSV with a header line.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] when serialization fails.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        write_csv(&self.constraints)
    }

    /// Parses CSV constraint rows.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] for malformed input.
    pub fn from_csv(input: &str) -> Result<Self, ExportError> {
        Ok(Self { constraints: read_csv(input)? })
    }
}

// ============================================================================
// SECTION: CSV Helpers
// ============================================================================

/// Writes serializable rows as CSV with a header.
fn write_csv<T: Serialize>(rows: &[T]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|err| ExportError::Csv(err.to_string()))?;
    }
    let bytes = writer.into_inner().map_err(|err| ExportError::Csv(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Csv(err.to_string()))
}

/// Reads CSV rows with a header.
fn read_csv<T: for<'de> Deserialize<'de>>(input: &str) -> Result<Vec<T>, ExportError> {
    let mut reader = csv::Reader::from_reader(input.as_bytes());
    reader
        .deserialize()
        .map(|row| row.map_err(|err| ExportError::Csv(err.to_string())))
        .collect()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Export serialization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// JSON encoding or decoding failed.
    #[error("json export error: {0}")]
    Json(String),
    /// CSV encoding or decoding failed.
    #[error("csv export error: {0}")]
    Csv(String),
}
