// crates/perf-gate-cli/src/sink.rs
// ============================================================================
// Module: Outcome Sinks
// Description: Text and JSON renderings of a gate outcome.
// Purpose: Publish verdicts to a writer for terminals and CI tooling.
// Dependencies: perf-gate-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Both sinks write to any [`std::io::Write`]. The text sink prints one line
//! per verdict followed by the folded outcome and any inputs that failed to
//! parse; the JSON sink writes a single document holding the summary, which
//! carries the failed-input count and names, and the ordered verdicts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use perf_gate_core::ConstraintId;
use perf_gate_core::ConstraintVerdict;
use perf_gate_core::OutcomeSink;
use perf_gate_core::ReportName;
use perf_gate_core::SinkError;
use perf_gate_core::VerdictSummary;
use serde::Serialize;

// ============================================================================
// SECTION: Text Sink
// ============================================================================

/// Human-readable outcome sink.
#[derive(Debug)]
pub struct TextSink<W> {
    /// Destination writer.
    writer: W,
}

impl<W: Write> TextSink<W> {
    /// Creates a sink writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one free-form line ahead of the outcome.
    ///
    /// # Errors
    ///
    /// Returns the writer's I/O error.
    pub fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{line}")
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutcomeSink for TextSink<W> {
    fn publish(
        &mut self,
        summary: &VerdictSummary,
        verdicts: &[ConstraintVerdict],
    ) -> Result<(), SinkError> {
        for verdict in verdicts {
            writeln!(self.writer, "{}", verdict_line(verdict)).map_err(write_error)?;
        }
        writeln!(
            self.writer,
            "outcome: {} (passed {}, failed {}, unresolved {}, skipped {}, failed inputs {})",
            summary.outcome,
            summary.passed,
            summary.failed,
            summary.unresolved,
            summary.skipped,
            summary.failed_inputs
        )
        .map_err(write_error)?;
        if !summary.failed_input_names.is_empty() {
            let names: Vec<&str> =
                summary.failed_input_names.iter().map(ReportName::as_str).collect();
            writeln!(self.writer, "failed inputs: {}", names.join(", ")).map_err(write_error)?;
        }
        if !summary.recorded_failures.is_empty() {
            let ids: Vec<&str> =
                summary.recorded_failures.iter().map(ConstraintId::as_str).collect();
            writeln!(self.writer, "recorded info failures: {}", ids.join(", "))
                .map_err(write_error)?;
        }
        self.writer.flush().map_err(write_error)
    }
}

/// Renders one verdict as a single line.
fn verdict_line(verdict: &ConstraintVerdict) -> String {
    match verdict {
        ConstraintVerdict::Evaluated(evaluation) => {
            let status = if evaluation.success { "PASS" } else { "FAIL" };
            let scope = evaluation
                .label
                .as_deref()
                .map_or_else(String::new, |label| format!(" [{label}]"));
            let reference = evaluation
                .reference_value
                .map_or_else(String::new, |value| format!(", history average {value:.2}"));
            format!(
                "{status} {} ({}){scope}: measured {:.2}, limit {:.2}{reference}",
                evaluation.constraint_id,
                evaluation.escalation,
                evaluation.measured_value,
                evaluation.constraint_value
            )
        }
        ConstraintVerdict::Unresolved { constraint_id, error, .. } => {
            format!("UNRESOLVED {constraint_id}: {error}")
        }
        ConstraintVerdict::Skipped { constraint_id, reason, .. } => {
            format!("SKIPPED {constraint_id}: {reason}")
        }
    }
}

// ============================================================================
// SECTION: JSON Sink
// ============================================================================

/// JSON document written by [`JsonSink`].
#[derive(Debug, Serialize)]
struct OutcomeDocument<'a> {
    /// Folded summary.
    summary: &'a VerdictSummary,
    /// Ordered verdicts.
    verdicts: &'a [ConstraintVerdict],
}

/// Machine-readable outcome sink.
#[derive(Debug)]
pub struct JsonSink<W> {
    /// Destination writer.
    writer: W,
}

impl<W: Write> JsonSink<W> {
    /// Creates a sink writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutcomeSink for JsonSink<W> {
    fn publish(
        &mut self,
        summary: &VerdictSummary,
        verdicts: &[ConstraintVerdict],
    ) -> Result<(), SinkError> {
        let document = OutcomeDocument { summary, verdicts };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|err| SinkError::Publish(err.to_string()))?;
        writeln!(self.writer, "{json}").map_err(write_error)?;
        self.writer.flush().map_err(write_error)
    }
}

/// Maps a writer failure to a sink error.
fn write_error(err: std::io::Error) -> SinkError {
    SinkError::Publish(err.to_string())
}
