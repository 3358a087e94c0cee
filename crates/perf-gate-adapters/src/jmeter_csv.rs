// crates/perf-gate-adapters/src/jmeter_csv.rs
// ============================================================================
// Module: JMeter CSV Adapter
// Description: Request-level adapter for JMeter CSV result files.
// Purpose: Sniff the delimiter and columns, then read one sample per row.
// Dependencies: perf-gate-core, csv, serde, tracing
// ============================================================================

//! ## Overview
//! JMeter CSV output has a header line but no fixed delimiter or column
//! order. The adapter sniffs the delimiter by trying `,`, tab, `;`, and `|`
//! in that order and picking the first that yields a `timeStamp` column.
//! Columns are then located case-insensitively; `timeStamp`, `elapsed`,
//! `responseCode`, `success`, and `label` are required and `bytes` is
//! optional. A missing required column fails the file with a message naming
//! the column.

// ============================================================================
// SECTION: Imports
// ============================================================================

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportInput;
use perf_gate_core::Sample;
use serde::Deserialize;
use tracing::debug;

use crate::ContentProbe;
use crate::FormatError;
use crate::ReportAdapter;
use crate::TimestampParser;
use crate::numeric::parse_bool;
use crate::numeric::parse_count;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Delimiters tried during sniffing, in order.
pub const CANDIDATE_DELIMITERS: [char; 4] = [',', '\t', ';', '|'];

/// Configuration for the JMeter CSV adapter.
///
/// # Invariants
/// - `delimiter`, when set, must be a single-byte character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JmeterCsvConfig {
    /// Forced delimiter; sniffed from the header when absent.
    #[serde(default)]
    pub delimiter: Option<char>,
}

// ============================================================================
// SECTION: Column Layout
// ============================================================================

/// Column indices located from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    /// Start time column.
    timestamp: usize,
    /// Elapsed time column.
    elapsed: usize,
    /// Response code column.
    response_code: usize,
    /// Success flag column.
    success: usize,
    /// Label column.
    label: usize,
    /// Optional byte count column.
    bytes: Option<usize>,
}

impl Columns {
    /// Locates columns in a header, case-insensitively.
    fn locate(header: &[String]) -> Result<Self, String> {
        let find = |name: &str| header.iter().position(|column| column.eq_ignore_ascii_case(name));
        let require =
            |name: &str| find(name).ok_or_else(|| format!("missing required column: {name}"));
        Ok(Self {
            timestamp: require("timeStamp")?,
            elapsed: require("elapsed")?,
            response_code: require("responseCode")?,
            success: require("success")?,
            label: require("label")?,
            bytes: find("bytes"),
        })
    }
}

/// Splits a header line and normalizes column names.
fn split_header(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(|column| column.trim().trim_matches('"').to_string()).collect()
}

/// Picks the delimiter for a header line.
///
/// # Errors
///
/// Returns a reason when no candidate yields a `timeStamp` column.
pub fn sniff_delimiter(header: &str, forced: Option<char>) -> Result<char, String> {
    let candidates = forced.map_or_else(|| CANDIDATE_DELIMITERS.to_vec(), |forced| vec![forced]);
    candidates
        .into_iter()
        .find(|delimiter| {
            split_header(header, *delimiter)
                .iter()
                .any(|column| column.eq_ignore_ascii_case("timeStamp"))
        })
        .ok_or_else(|| "header has no timeStamp column for any supported delimiter".to_string())
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter for JMeter CSV results.
#[derive(Debug, Clone, Copy, Default)]
pub struct JmeterCsvAdapter {
    /// Adapter configuration.
    config: JmeterCsvConfig,
}

impl JmeterCsvAdapter {
    /// Creates the adapter.
    #[must_use]
    pub const fn new(config: JmeterCsvConfig) -> Self {
        Self { config }
    }
}

impl ReportAdapter for JmeterCsvAdapter {
    fn name(&self) -> &'static str {
        "jmeter-csv"
    }

    fn detect(&self, probe: &ContentProbe) -> bool {
        sniff_delimiter(probe.first_line(), self.config.delimiter).is_ok()
            && probe.header_has(&["elapsed"])
    }

    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError> {
        let name = &input.name;
        let text = input.text();
        let header = text.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or_default();
        let delimiter = sniff_delimiter(header, self.config.delimiter)
            .map_err(|reason| FormatError::new(name, reason))?;
        let delimiter = u8::try_from(delimiter)
            .map_err(|_| {
                FormatError::new(name, format!("delimiter is not one byte: {delimiter}"))
            })?;
        let columns = Columns::locate(&split_header(header, char::from(delimiter)))
            .map_err(|reason| FormatError::new(name, reason))?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.trim_start().as_bytes());
        let mut report = PerformanceReport::new(name.clone());
        let mut timestamps = TimestampParser::new();
        for record in reader.records() {
            let record =
                record.map_err(|err| FormatError::new(name, format!("malformed CSV: {err}")))?;
            let line = record.position().map_or(0, csv::Position::line);
            let sample = sample_from(&record, columns, &mut timestamps)
                .map_err(|reason| FormatError::at_line(name, line, reason))?;
            report.add_sample(&sample).map_err(|err| FormatError::from_report(name, &err))?;
        }
        debug!(
            report = %name,
            samples = report.samples(),
            labels = report.label_count(),
            "parsed JMeter CSV report"
        );
        Ok(report)
    }
}

/// Builds a sample from one CSV record.
fn sample_from(
    record: &csv::StringRecord,
    columns: Columns,
    timestamps: &mut TimestampParser,
) -> Result<Sample, String> {
    let field = |index: usize, name: &str| {
        record.get(index).ok_or_else(|| format!("row has no {name} field"))
    };
    let started = field(columns.timestamp, "timeStamp")?;
    let started = timestamps.parse(started).ok_or_else(|| format!("invalid timestamp: {started}"))?;
    let elapsed = field(columns.elapsed, "elapsed")?;
    let elapsed = parse_count(elapsed).ok_or_else(|| format!("invalid elapsed time: {elapsed}"))?;
    let success = field(columns.success, "success")?;
    let success = parse_bool(success).ok_or_else(|| format!("invalid success flag: {success}"))?;
    let label = field(columns.label, "label")?;

    let mut sample = Sample::new(label, started, elapsed).with_success(success);
    let code = field(columns.response_code, "responseCode")?;
    if !code.is_empty() {
        sample = sample.with_http_code(code);
    }
    if let Some(bytes) = columns.bytes.and_then(|index| record.get(index)).and_then(parse_count) {
        sample = sample.with_size_bytes(bytes);
    }
    Ok(sample)
}
