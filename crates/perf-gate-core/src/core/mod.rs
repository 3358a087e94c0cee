// crates/perf-gate-core/src/core/mod.rs
// ============================================================================
// Module: Perf Gate Core Types
// Description: Sample model, aggregates, constraints, and export tables.
// Purpose: Provide the canonical in-memory model shared by every crate.
// Dependencies: csv, serde, sha2, thiserror, time
// ============================================================================

//! ## Overview
//! Perf Gate core types cover the format-agnostic sample model, per-label
//! and per-run aggregates, the constraint model, evaluation results, and the
//! flat export tables consumed by downstream tooling.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod constraint;
pub mod evaluation;
pub mod export;
pub mod identifiers;
pub mod label;
pub mod metrics;
pub mod report;
pub mod run;
pub mod sample;
pub mod stats;
pub mod time;
pub mod uri_report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use constraint::Constraint;
pub use constraint::ConstraintError;
pub use constraint::ConstraintKind;
pub use constraint::Escalation;
pub use constraint::HistorySelector;
pub use constraint::LabelScope;
pub use constraint::Operator;
pub use constraint::parse_threshold;
pub use constraint::validate_all;
pub use evaluation::ConstraintEvaluation;
pub use evaluation::ConstraintVerdict;
pub use evaluation::HistoryUnavailable;
pub use evaluation::ResolutionError;
pub use evaluation::VerdictStatus;
pub use export::ConstraintExport;
pub use export::ConstraintRecord;
pub use export::ExportError;
pub use export::LabelRecord;
pub use export::ReportExport;
pub use identifiers::ConstraintId;
pub use identifiers::ReportName;
pub use identifiers::RunId;
pub use label::LabelKey;
pub use label::normalize_label;
pub use metrics::Metric;
pub use metrics::MetricDelta;
pub use metrics::MetricSet;
pub use report::BaselineSnapshot;
pub use report::IngestionMode;
pub use report::PerformanceReport;
pub use report::ReportError;
pub use report::SharedPerformanceReport;
pub use run::RunRecord;
pub use sample::Percentile;
pub use sample::Sample;
pub use sample::SampleError;
pub use sample::SummaryGroup;
pub use stats::Rank;
pub use self::time::Timestamp;
pub use uri_report::UriReport;
