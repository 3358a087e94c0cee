// crates/perf-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Perf Gate Interfaces
// Description: Contracts for file discovery, report caching, history, and sinks.
// Purpose: Keep I/O outside the core behind narrow, synchronous traits.
// Dependencies: crate::{core, runtime}, sha2, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Perf Gate consumes collaborators without embedding
//! their backends. The core never performs I/O itself: inputs arrive as
//! in-memory bytes and prior runs arrive as materialized [`RunRecord`]s.
//! Absence is never an error: no matching files is an empty list and no
//! history is `None` or an empty list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::fmt;

use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::evaluation::ConstraintVerdict;
use crate::core::identifiers::ReportName;
use crate::core::report::PerformanceReport;
use crate::core::run::RunRecord;
use crate::runtime::verdict::VerdictSummary;

// ============================================================================
// SECTION: Report Input
// ============================================================================

/// Raw report file handed to an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportInput {
    /// Report name, usually the source file name.
    pub name: ReportName,
    /// File content.
    pub bytes: Vec<u8>,
}

impl ReportInput {
    /// Creates an input from a name and bytes.
    #[must_use]
    pub fn new(name: impl Into<ReportName>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }

    /// Returns the content as UTF-8 text, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

// ============================================================================
// SECTION: File Provider
// ============================================================================

/// File provider errors.
#[derive(Debug, Error)]
pub enum FileProviderError {
    /// Pattern could not be interpreted.
    #[error("invalid file pattern {pattern}: {reason}")]
    InvalidPattern {
        /// Offending pattern.
        pattern: String,
        /// Failure reason.
        reason: String,
    },
    /// A matched file could not be read.
    #[error("file provider io error: {0}")]
    Io(String),
}

/// Resolves patterns into report inputs.
pub trait FileProvider {
    /// Returns every input matching `pattern`.
    ///
    /// No match is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`FileProviderError`] when the pattern is malformed or a
    /// matched file cannot be read.
    fn resolve(&self, pattern: &str) -> Result<Vec<ReportInput>, FileProviderError>;
}

// ============================================================================
// SECTION: Report Cache
// ============================================================================

/// Cache key: report name plus SHA-256 of the content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportKey {
    /// Report name.
    pub name: ReportName,
    /// Lowercase hex SHA-256 digest of the content.
    pub digest: String,
}

impl ReportKey {
    /// Computes the key of an input.
    #[must_use]
    pub fn for_input(input: &ReportInput) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&input.bytes);
        Self { name: input.name.clone(), digest: hex_encode(&hasher.finalize()) }
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@sha256:{}", self.name, self.digest)
    }
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}

/// Report cache errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache backend I/O failure.
    #[error("report cache io error: {0}")]
    Io(String),
    /// Cache backend reported an error.
    #[error("report cache error: {0}")]
    Cache(String),
}

/// Non-durable cache of parsed reports.
pub trait ReportCache {
    /// Returns a previously parsed report.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails. A miss is `Ok(None)`.
    fn load(&self, key: &ReportKey) -> Result<Option<PerformanceReport>, CacheError>;

    /// Stores a parsed report.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    fn store(&self, key: &ReportKey, report: &PerformanceReport) -> Result<(), CacheError>;
}

// ============================================================================
// SECTION: History Provider
// ============================================================================

/// History lookup request.
///
/// # Invariants
/// - `cursor`, when present, is the lowest run number the caller has already
///   walked; providers return only runs numbered below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Number of the run under evaluation.
    pub run_number: u64,
    /// Last-seen run number from a previous walk.
    pub cursor: Option<u64>,
}

impl HistoryRequest {
    /// Creates a request for the run numbered `run_number`.
    #[must_use]
    pub const fn for_run(run_number: u64) -> Self {
        Self { run_number, cursor: None }
    }

    /// Returns the request continuing a walk below `cursor`.
    #[must_use]
    pub const fn with_cursor(self, cursor: u64) -> Self {
        Self { run_number: self.run_number, cursor: Some(cursor) }
    }

    /// Returns the exclusive upper bound on returned run numbers.
    #[must_use]
    pub const fn upper_bound(&self) -> u64 {
        match self.cursor {
            Some(cursor) if cursor < self.run_number => cursor,
            _ => self.run_number,
        }
    }
}

/// History provider errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Backend failure.
    #[error("history provider error: {0}")]
    Provider(String),
}

/// Supplies prior runs.
pub trait HistoryProvider {
    /// Returns the most recent run below the request bound.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] only on backend failure.
    fn previous_run(&self, request: &HistoryRequest) -> Result<Option<RunRecord>, HistoryError>;

    /// Returns every run below the request bound, ordered by run number.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] only on backend failure.
    fn prior_runs(&self, request: &HistoryRequest) -> Result<Vec<RunRecord>, HistoryError>;
}

// ============================================================================
// SECTION: Outcome Sink
// ============================================================================

/// Outcome sink errors.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Sink could not publish the outcome.
    #[error("outcome sink error: {0}")]
    Publish(String),
}

/// Receives the final outcome and the ordered verdicts.
pub trait OutcomeSink {
    /// Publishes the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when publishing fails.
    fn publish(
        &mut self,
        summary: &VerdictSummary,
        verdicts: &[ConstraintVerdict],
    ) -> Result<(), SinkError>;
}
