// crates/perf-gate-adapters/src/wrk.rs
// ============================================================================
// Module: wrk Adapter
// Description: Summary adapter for wrk console output.
// Purpose: Turn one wrk run into a single summary group.
// Dependencies: perf-gate-core, tracing
// ============================================================================

//! ## Overview
//! wrk prints one summary per run: the target URL, a latency stats line
//! (average, deviation, max), an optional latency distribution, the request
//! count, and optional socket error and non-2xx/3xx counts. The run becomes
//! one group labelled with the target URL. Errors are socket errors plus
//! non-2xx/3xx responses, capped at the request count.
//!
//! wrk reports no minimum. The group's `min` is left to the summary
//! builder's fallback: the lowest distribution rank wrk printed (usually the
//! 50th percentile, so `min` is then the median), or the average when no
//! distribution was printed. Either way it is an upper bound on the true
//! minimum.

// ============================================================================
// SECTION: Imports
// ============================================================================

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportInput;
use tracing::debug;

use crate::ContentProbe;
use crate::FormatError;
use crate::ReportAdapter;
use crate::numeric::parse_count;
use crate::numeric::parse_duration_millis;
use crate::numeric::parse_float;
use crate::numeric::parse_size_bytes;
use crate::summary::GroupFields;
use crate::summary::insert_group;

/// Label used when the output has no `Running ... @ <url>` line.
pub const DEFAULT_LABEL: &str = "wrk";

/// Adapter for wrk output.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrkAdapter;

impl ReportAdapter for WrkAdapter {
    fn name(&self) -> &'static str {
        "wrk"
    }

    fn detect(&self, probe: &ContentProbe) -> bool {
        probe.contains("requests in") && probe.contains("Latency")
    }

    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError> {
        let name = &input.name;
        let text = input.text();
        let mut label = DEFAULT_LABEL.to_string();
        let mut fields = GroupFields::default();
        let mut errors = 0_u64;
        let mut in_distribution = false;
        for (index, raw) in text.lines().enumerate() {
            let line_number = u64::try_from(index + 1).unwrap_or(u64::MAX);
            let line = raw.trim();
            let at_line = |reason: String| FormatError::at_line(name, line_number, reason);
            let running = line.strip_prefix("Running").and_then(|rest| rest.split_once(" @ "));
            if let Some((_, target)) = running {
                label = target.trim().to_string();
            } else if line.starts_with("Latency Distribution") {
                in_distribution = true;
            } else if in_distribution && let Some((rank, value)) = distribution_entry(line) {
                let value = parse_duration_millis(value)
                    .ok_or_else(|| at_line(format!("invalid latency percentile: {value}")))?;
                fields.percentiles.push((rank, value));
            } else if let Some(stats) = line.strip_prefix("Latency") {
                in_distribution = false;
                let columns: Vec<&str> = stats.split_whitespace().collect();
                let average = columns.first().and_then(|value| parse_duration_millis(value));
                let max = columns.get(2).and_then(|value| parse_duration_millis(value));
                let invalid = || at_line(format!("invalid latency line: {line}"));
                fields.average = Some(average.ok_or_else(invalid)?);
                fields.max = Some(max.ok_or_else(invalid)?);
            } else if let Some((count, rest)) = line.split_once(" requests in ") {
                in_distribution = false;
                let total = parse_count(count)
                    .ok_or_else(|| at_line(format!("invalid request count: {count}")))?;
                fields.total = Some(total);
                fields.bytes = rest
                    .split_once(", ")
                    .and_then(|(_, read)| read.strip_suffix(" read"))
                    .and_then(parse_size_bytes);
            } else if let Some(socket) = line.strip_prefix("Socket errors:") {
                errors = errors.saturating_add(socket_errors(socket).map_err(at_line)?);
            } else if let Some(non_success) = line.strip_prefix("Non-2xx or 3xx responses:") {
                let count = parse_count(non_success)
                    .ok_or_else(|| at_line(format!("invalid non-2xx count: {non_success}")))?;
                errors = errors.saturating_add(count);
            } else {
                in_distribution = false;
            }
        }
        let total =
            fields.total.ok_or_else(|| FormatError::new(name, "missing `requests in` line"))?;
        fields.failure = Some(errors.min(total));
        let group = fields.into_group(&label).map_err(|reason| FormatError::new(name, reason))?;

        let mut report = PerformanceReport::new(name.clone());
        insert_group(&mut report, name, group, false)?;
        debug!(report = %name, samples = report.samples(), "parsed wrk output");
        Ok(report)
    }
}

/// Parses a `50%  250.00us` distribution line.
fn distribution_entry(line: &str) -> Option<(f64, &str)> {
    let (rank, value) = line.split_once('%')?;
    let rank = parse_float(rank)?;
    Some((rank, value.trim()))
}

/// Sums `connect N, read N, write N, timeout N`.
fn socket_errors(text: &str) -> Result<u64, String> {
    text.split(',').try_fold(0_u64, |sum, entry| {
        let count = entry
            .split_whitespace()
            .last()
            .ok_or_else(|| format!("invalid socket errors: {text}"))?;
        let count =
            parse_count(count).ok_or_else(|| format!("invalid socket error count: {count}"))?;
        Ok(sum.saturating_add(count))
    })
}
