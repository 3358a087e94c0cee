// crates/perf-gate-adapters/src/jmeter_xml.rs
// ============================================================================
// Module: JMeter XML Adapter
// Description: Request-level adapter for JMeter XML result files.
// Purpose: Turn every `httpSample` and `sample` element into a sample.
// Dependencies: perf-gate-core, quick-xml, tracing
// ============================================================================

//! ## Overview
//! JMeter writes results under a `testResults` root. Every `httpSample` or
//! `sample` element is one request, including samples nested inside
//! transaction samples. Attribute names come in a short and a long form; the
//! short form is always tried first:
//!
//! | Field | Short | Long |
//! |---|---|---|
//! | start time | `ts` | `timeStamp` |
//! | elapsed | `t` | `time` |
//! | success | `s` | `success` |
//! | label | `lb` | `label` |
//! | response code | `rc` | `responseCode` |
//! | bytes | `by` | `bytes` |

// ============================================================================
// SECTION: Imports
// ============================================================================

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportInput;
use perf_gate_core::Sample;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::ContentProbe;
use crate::FormatError;
use crate::ReportAdapter;
use crate::TimestampParser;
use crate::numeric::parse_bool;
use crate::numeric::parse_count;
use crate::xml::Attributes;
use crate::xml::element_name;

// ============================================================================
// SECTION: Attribute Names
// ============================================================================

/// Start time attribute names, short form first.
const TIMESTAMP: [&str; 2] = ["ts", "timeStamp"];
/// Elapsed time attribute names.
const ELAPSED: [&str; 2] = ["t", "time"];
/// Success flag attribute names.
const SUCCESS: [&str; 2] = ["s", "success"];
/// Label attribute names.
const LABEL: [&str; 2] = ["lb", "label"];
/// Response code attribute names.
const RESPONSE_CODE: [&str; 2] = ["rc", "responseCode"];
/// Byte count attribute names.
const BYTES: [&str; 2] = ["by", "bytes"];

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter for JMeter XML results.
#[derive(Debug, Clone, Copy, Default)]
pub struct JmeterXmlAdapter;

impl ReportAdapter for JmeterXmlAdapter {
    fn name(&self) -> &'static str {
        "jmeter-xml"
    }

    fn detect(&self, probe: &ContentProbe) -> bool {
        probe.xml_root() == Some("testResults")
    }

    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError> {
        let text = input.text();
        let mut reader = Reader::from_str(&text);
        let mut report = PerformanceReport::new(input.name.clone());
        let mut timestamps = TimestampParser::new();
        loop {
            let element = match reader.read_event() {
                Ok(Event::Start(element) | Event::Empty(element)) => element,
                Ok(Event::Eof) => break,
                Ok(_) => continue,
                Err(err) => {
                    return Err(FormatError::new(
                        &input.name,
                        format!("malformed XML at byte {}: {err}", reader.buffer_position()),
                    ));
                }
            };
            let name = element_name(&element);
            if name != "httpSample" && name != "sample" {
                continue;
            }
            let attributes =
                Attributes::of(&element).map_err(|reason| FormatError::new(&input.name, reason))?;
            let sample = sample_from(&attributes, &mut timestamps)
                .map_err(|reason| FormatError::new(&input.name, format!("{name}: {reason}")))?;
            report
                .add_sample(&sample)
                .map_err(|err| FormatError::from_report(&input.name, &err))?;
        }
        debug!(report = %input.name, samples = report.samples(), "parsed JMeter XML report");
        Ok(report)
    }
}

/// Builds a sample from the attributes of one sample element.
fn sample_from(
    attributes: &Attributes,
    timestamps: &mut TimestampParser,
) -> Result<Sample, String> {
    let label = attributes.first_of(&LABEL).ok_or("missing label attribute (lb/label)")?;
    let elapsed = attributes.first_of(&ELAPSED).ok_or("missing elapsed attribute (t/time)")?;
    let elapsed = parse_count(elapsed).ok_or_else(|| format!("invalid elapsed time: {elapsed}"))?;
    let started =
        attributes.first_of(&TIMESTAMP).ok_or("missing timestamp attribute (ts/timeStamp)")?;
    let started = timestamps.parse(started).ok_or_else(|| format!("invalid timestamp: {started}"))?;
    let success = match attributes.first_of(&SUCCESS) {
        Some(flag) => parse_bool(flag).ok_or_else(|| format!("invalid success flag: {flag}"))?,
        None => true,
    };

    let mut sample = Sample::new(label, started, elapsed).with_success(success);
    if let Some(code) = attributes.first_of(&RESPONSE_CODE).filter(|code| !code.is_empty()) {
        sample = sample.with_http_code(code);
    }
    if let Some(bytes) = attributes.first_of(&BYTES).and_then(parse_count) {
        sample = sample.with_size_bytes(bytes);
    }
    Ok(sample)
}
