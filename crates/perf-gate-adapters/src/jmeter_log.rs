// crates/perf-gate-adapters/src/jmeter_log.rs
// ============================================================================
// Module: JMeter Summariser Log Adapter
// Description: Summary adapter for JMeter console summariser output.
// Purpose: Read the cumulative `summary =` line as one summary group.
// Dependencies: perf-gate-core, tracing
// ============================================================================

//! ## Overview
//! The JMeter summariser periodically prints `summary +` lines with the
//! delta since the previous line and `summary =` lines with the cumulative
//! totals. Only the last `summary =` line is used; deltas are ignored. It
//! becomes both the single `summary` label and the report totals.

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
use crate::numeric::parse_float;
use crate::summary::GroupFields;
use crate::summary::insert_group;

/// Marker of cumulative summariser lines.
const CUMULATIVE_MARKER: &str = "summary =";

/// Marker of delta summariser lines.
const DELTA_MARKER: &str = "summary +";

/// Label of the group built from the cumulative line.
pub const SUMMARY_LABEL: &str = "summary";

/// Adapter for JMeter summariser logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JmeterLogAdapter;

impl ReportAdapter for JmeterLogAdapter {
    fn name(&self) -> &'static str {
        "jmeter-log"
    }

    fn detect(&self, probe: &ContentProbe) -> bool {
        probe.contains(CUMULATIVE_MARKER) || probe.contains(DELTA_MARKER)
    }

    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError> {
        let name = &input.name;
        let text = input.text();
        let (line_number, line) = text
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(CUMULATIVE_MARKER))
            .last()
            .ok_or_else(|| FormatError::new(name, "no cumulative `summary =` line"))?;
        let line_number = u64::try_from(line_number + 1).unwrap_or(u64::MAX);
        let at_line = |reason: String| FormatError::at_line(name, line_number, reason);
        let group = parse_summary_line(line)
            .and_then(|fields| fields.into_group(SUMMARY_LABEL))
            .map_err(at_line)?;

        let mut report = PerformanceReport::new(name.clone());
        insert_group(&mut report, name, group.clone(), false)?;
        insert_group(&mut report, name, group, true)?;
        debug!(report = %name, samples = report.samples(), "parsed JMeter summariser log");
        Ok(report)
    }
}

/// Parses the fields after the cumulative marker.
///
/// Expected shape: `summary = <count> in <hh:mm:ss> = <rate>/s Avg: <n>
/// Min: <n> Max: <n> Err: <n> (<pct>%)`. Keys may be glued to values.
fn parse_summary_line(line: &str) -> Result<GroupFields, String> {
    let (_, rest) = line.split_once(CUMULATIVE_MARKER).ok_or("missing summary marker")?;
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let count = tokens.first().ok_or("missing sample count")?;
    let count = parse_count(count).ok_or_else(|| format!("invalid sample count: {count}"))?;
    let value_of = |key: &str| {
        tokens.iter().enumerate().find_map(|(index, token)| {
            let rest = token.strip_prefix(key)?;
            if rest.is_empty() { tokens.get(index + 1).copied() } else { Some(rest) }
        })
    };
    let millis = |key: &str| -> Result<Option<f64>, String> {
        value_of(key)
            .map(|value| parse_float(value).ok_or_else(|| format!("invalid {key} value: {value}")))
            .transpose()
    };
    let errors = value_of("Err:")
        .map(|value| parse_count(value).ok_or_else(|| format!("invalid Err: value: {value}")))
        .transpose()?;
    Ok(GroupFields {
        total: Some(count),
        failure: errors,
        average: millis("Avg:")?,
        min: millis("Min:")?,
        max: millis("Max:")?,
        ..GroupFields::default()
    })
}
