// crates/perf-gate-core/src/core/run.rs
// ============================================================================
// Module: Run Records
// Description: One run of a performance test and its sealed reports.
// Purpose: Give the evaluator and history providers a single run unit.
// Dependencies: crate::core::{identifiers, report, time}
// ============================================================================

//! ## Overview
//! A [`RunRecord`] groups the reports produced by one execution. Runs are
//! ordered by `number`; the evaluator treats every run numbered below the
//! current one as history.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::ReportName;
use crate::core::identifiers::RunId;
use crate::core::report::PerformanceReport;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Run Record
// ============================================================================

/// One run and the reports it produced.
///
/// # Invariants
/// - `number` increases monotonically across a project's runs.
/// - Reports are sealed before the run is evaluated.
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// Run identifier.
    pub run_id: RunId,
    /// Sequential run number.
    pub number: u64,
    /// Run start time.
    pub started_at: Timestamp,
    /// Reports produced by the run.
    pub reports: Vec<PerformanceReport>,
}

impl RunRecord {
    /// Creates a run without reports.
    #[must_use]
    pub fn new(run_id: impl Into<RunId>, number: u64, started_at: Timestamp) -> Self {
        Self { run_id: run_id.into(), number, started_at, reports: Vec::new() }
    }

    /// Adds a report, sealing it first.
    #[must_use]
    pub fn with_report(mut self, mut report: PerformanceReport) -> Self {
        report.seal();
        self.reports.push(report);
        self
    }

    /// Returns the report with the given name.
    #[must_use]
    pub fn report(&self, name: &ReportName) -> Option<&PerformanceReport> {
        self.reports.iter().find(|report| report.name() == name)
    }

    /// Seals every report.
    pub fn seal_all(&mut self) {
        for report in &mut self.reports {
            report.seal();
        }
    }
}
