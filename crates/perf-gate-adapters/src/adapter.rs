// crates/perf-gate-adapters/src/adapter.rs
// ============================================================================
// Module: Adapter Contract
// Description: Report adapter trait, content probe, and adapter errors.
// Purpose: Define the seam every input format plugs into.
// Dependencies: perf-gate-core, thiserror
// ============================================================================

//! ## Overview
//! A [`ReportAdapter`] turns the bytes of one report file into a
//! [`PerformanceReport`]. Adapters are stateless and shareable across
//! threads; any per-file state (such as a cached timestamp pattern) lives on
//! the stack of [`ReportAdapter::parse`].
//!
//! Detection works on a [`ContentProbe`]: the file name and the first few
//! kilobytes of content, decoded lossily.

// ============================================================================
// SECTION: Imports
// ============================================================================

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportError;
use perf_gate_core::ReportInput;
use perf_gate_core::ReportName;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of leading bytes inspected during detection.
pub const PROBE_BYTES: usize = 4096;

// ============================================================================
// SECTION: Adapter Trait
// ============================================================================

/// Parser for one performance-report format.
pub trait ReportAdapter {
    /// Returns the stable adapter name used for explicit selection.
    fn name(&self) -> &'static str;

    /// Returns true when the probed content looks like this format.
    fn detect(&self, probe: &ContentProbe) -> bool;

    /// Parses a whole report.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the content is malformed.
    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError>;
}

// ============================================================================
// SECTION: Content Probe
// ============================================================================

/// Leading slice of a report used for format detection.
///
/// # Invariants
/// - `head` holds at most [`PROBE_BYTES`] bytes of the input, decoded lossily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentProbe {
    /// Report name, usually the file name.
    name: ReportName,
    /// Decoded leading content.
    head: String,
}

impl ContentProbe {
    /// Builds a probe from a report input.
    #[must_use]
    pub fn from_input(input: &ReportInput) -> Self {
        let end = input.bytes.len().min(PROBE_BYTES);
        let head = String::from_utf8_lossy(&input.bytes[.. end]);
        Self { name: input.name.clone(), head: head.trim_start_matches('\u{feff}').to_string() }
    }

    /// Returns the report name.
    #[must_use]
    pub const fn name(&self) -> &ReportName {
        &self.name
    }

    /// Returns the decoded leading content.
    #[must_use]
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Returns the first non-blank line.
    #[must_use]
    pub fn first_line(&self) -> &str {
        self.head.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or_default()
    }

    /// Returns true when the head contains `marker`.
    #[must_use]
    pub fn contains(&self, marker: &str) -> bool {
        self.head.contains(marker)
    }

    /// Returns the lowercase file extension of the report name, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let name = self.name.as_str();
        let (stem, extension) = name.rsplit_once('.')?;
        if stem.is_empty() || extension.contains(['/', '\\']) {
            return None;
        }
        Some(extension.to_ascii_lowercase())
    }

    /// Returns the name of the first XML element, skipping the prolog,
    /// comments, and doctype declarations.
    #[must_use]
    pub fn xml_root(&self) -> Option<&str> {
        let mut rest = self.head.trim_start();
        loop {
            let body = rest.strip_prefix('<')?;
            if let Some(after) = body.strip_prefix("!--") {
                let end = after.find("-->")?;
                rest = after[end + 3 ..].trim_start();
                continue;
            }
            if body.starts_with('?') || body.starts_with('!') {
                let end = body.find('>')?;
                rest = body[end + 1 ..].trim_start();
                continue;
            }
            let end = body
                .find(|ch: char| ch.is_whitespace() || ch == '>' || ch == '/')
                .unwrap_or(body.len());
            let name = &body[.. end];
            return (!name.is_empty()).then_some(name);
        }
    }

    /// Returns true when the first line names every column in `columns`,
    /// compared case-insensitively.
    #[must_use]
    pub fn header_has(&self, columns: &[&str]) -> bool {
        let header = self.first_line().to_ascii_lowercase();
        columns.iter().all(|column| header.contains(&column.to_ascii_lowercase()))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure to turn one report file into a report.
///
/// # Invariants
/// - Scoped to a single input; sibling inputs are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse {report}: {reason}")]
pub struct FormatError {
    /// Report the failure belongs to.
    pub report: ReportName,
    /// Human-readable reason.
    pub reason: String,
}

impl FormatError {
    /// Creates a format error for a report.
    #[must_use]
    pub fn new(report: &ReportName, reason: impl Into<String>) -> Self {
        Self { report: report.clone(), reason: reason.into() }
    }

    /// Creates a format error located at a 1-based line.
    #[must_use]
    pub fn at_line(report: &ReportName, line: u64, reason: impl AsRef<str>) -> Self {
        Self::new(report, format!("line {line}: {}", reason.as_ref()))
    }

    /// Wraps a report model error raised while inserting parsed data.
    #[must_use]
    pub fn from_report(report: &ReportName, error: &ReportError) -> Self {
        Self::new(report, error.to_string())
    }
}

/// Adapter registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An adapter with the same name is already registered.
    #[error("adapter already registered: {0}")]
    DuplicateAdapter(String),
}
