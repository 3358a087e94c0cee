// crates/perf-gate-adapters/src/taurus.rs
// ============================================================================
// Module: Taurus Adapters
// Description: Summary adapters for Taurus final-stats XML and CSV reports.
// Purpose: Turn per-label Taurus groups into summary groups.
// Dependencies: perf-gate-core, quick-xml, csv, serde, tracing
// ============================================================================

//! ## Overview
//! Taurus reports latency in seconds; both adapters convert to milliseconds.
//! The group whose label equals the configured total label (empty by
//! default) is the run's grand total and is stored as summary totals rather
//! than as a label.

// ============================================================================
// SECTION: Imports
// ============================================================================

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportInput;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use tracing::debug;

use crate::ContentProbe;
use crate::FormatError;
use crate::ReportAdapter;
use crate::numeric::parse_count;
use crate::numeric::parse_float;
use crate::numeric::seconds_to_millis;
use crate::summary::GroupFields;
use crate::summary::insert_group;
use crate::xml::Attributes;
use crate::xml::element_name;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration shared by the Taurus adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaurusConfig {
    /// Label of the grand-total group.
    #[serde(default)]
    pub total_label: String,
}

// ============================================================================
// SECTION: Field Mapping
// ============================================================================

/// Applies one named Taurus value to the group fields.
///
/// `param` carries the percentile rank for `perc` values.
fn apply_field(
    fields: &mut GroupFields,
    name: &str,
    param: Option<&str>,
    value: &str,
) -> Result<(), String> {
    let seconds = || {
        parse_float(value)
            .map(seconds_to_millis)
            .ok_or_else(|| format!("invalid {name} value: {value}"))
    };
    let count = || parse_count(value).ok_or_else(|| format!("invalid {name} value: {value}"));
    match name {
        "succ" => fields.success = Some(count()?),
        "fail" => fields.failure = Some(count()?),
        "n" | "throughput" => fields.total = Some(count()?),
        "avg_rt" => fields.average = Some(seconds()?),
        "min_rt" => fields.min = Some(seconds()?),
        "max_rt" => fields.max = Some(seconds()?),
        "bytes" => fields.bytes = Some(count()?),
        "perc" => {
            let rank = param.ok_or("perc value without param")?;
            let rank = parse_float(rank).ok_or_else(|| format!("invalid perc param: {rank}"))?;
            fields.percentiles.push((rank, seconds()?));
        }
        _ => {}
    }
    Ok(())
}

// ============================================================================
// SECTION: XML Adapter
// ============================================================================

/// Adapter for Taurus final-stats XML.
#[derive(Debug, Clone, Default)]
pub struct TaurusXmlAdapter {
    /// Adapter configuration.
    config: TaurusConfig,
}

impl TaurusXmlAdapter {
    /// Creates the adapter.
    #[must_use]
    pub const fn new(config: TaurusConfig) -> Self {
        Self { config }
    }
}

impl ReportAdapter for TaurusXmlAdapter {
    fn name(&self) -> &'static str {
        "taurus-xml"
    }

    fn detect(&self, probe: &ContentProbe) -> bool {
        probe.xml_root() == Some("FinalStatus")
    }

    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError> {
        let name = &input.name;
        let text = input.text();
        let mut reader = Reader::from_str(&text);
        let mut report = PerformanceReport::new(name.clone());
        let mut current: Option<(String, GroupFields)> = None;
        loop {
            match reader.read_event() {
                Ok(Event::Start(element) | Event::Empty(element)) => {
                    let tag = element_name(&element);
                    let attributes =
                        Attributes::of(&element).map_err(|reason| FormatError::new(name, reason))?;
                    if tag == "Group" {
                        let label = attributes.get("label").unwrap_or_default().to_string();
                        current = Some((label, GroupFields::default()));
                    } else if let Some((label, fields)) = &mut current
                        && let Some(value) = attributes.get("value")
                    {
                        apply_field(fields, &tag, attributes.get("param"), value).map_err(
                            |reason| FormatError::new(name, format!("group {label:?}: {reason}")),
                        )?;
                    }
                }
                Ok(Event::End(element)) => {
                    if element.local_name().as_ref() == b"Group"
                        && let Some((label, fields)) = current.take()
                    {
                        let group = fields
                            .into_group(&label)
                            .map_err(|reason| FormatError::new(name, reason))?;
                        insert_group(&mut report, name, group, label == self.config.total_label)?;
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(FormatError::new(
                        name,
                        format!("malformed XML at byte {}: {err}", reader.buffer_position()),
                    ));
                }
            }
        }
        debug!(report = %name, labels = report.label_count(), "parsed Taurus XML report");
        Ok(report)
    }
}

// ============================================================================
// SECTION: CSV Adapter
// ============================================================================

/// Adapter for Taurus CSV summaries.
#[derive(Debug, Clone, Default)]
pub struct TaurusCsvAdapter {
    /// Adapter configuration.
    config: TaurusConfig,
}

impl TaurusCsvAdapter {
    /// Creates the adapter.
    #[must_use]
    pub const fn new(config: TaurusConfig) -> Self {
        Self { config }
    }
}

impl ReportAdapter for TaurusCsvAdapter {
    fn name(&self) -> &'static str {
        "taurus-csv"
    }

    fn detect(&self, probe: &ContentProbe) -> bool {
        probe.first_line().starts_with("label,") && probe.header_has(&["avg_rt", "succ"])
    }

    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError> {
        let name = &input.name;
        let mut reader =
            csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input.bytes.as_slice());
        let header = reader
            .headers()
            .map_err(|err| FormatError::new(name, format!("malformed CSV header: {err}")))?
            .clone();
        let label_column = header
            .iter()
            .position(|column| column == "label")
            .ok_or_else(|| FormatError::new(name, "missing required column: label"))?;

        let mut report = PerformanceReport::new(name.clone());
        for record in reader.records() {
            let record =
                record.map_err(|err| FormatError::new(name, format!("malformed CSV: {err}")))?;
            let line = record.position().map_or(0, csv::Position::line);
            let label = record.get(label_column).unwrap_or_default().to_string();
            let mut fields = GroupFields::default();
            for (column, value) in header.iter().zip(record.iter()) {
                if value.is_empty() {
                    continue;
                }
                let applied = match column.strip_prefix("perc_") {
                    Some(rank) => apply_field(&mut fields, "perc", Some(rank), value),
                    None => apply_field(&mut fields, column, None, value),
                };
                applied.map_err(|reason| FormatError::at_line(name, line, reason))?;
            }
            let group = fields
                .into_group(&label)
                .map_err(|reason| FormatError::at_line(name, line, reason))?;
            insert_group(&mut report, name, group, label == self.config.total_label)?;
        }
        debug!(report = %name, labels = report.label_count(), "parsed Taurus CSV report");
        Ok(report)
    }
}
