// crates/perf-gate-adapters/src/junit.rs
// ============================================================================
// Module: JUnit XML Adapter
// Description: Request-level adapter for JUnit XML test reports.
// Purpose: Treat each test case as one timed sample.
// Dependencies: perf-gate-core, quick-xml, tracing
// ============================================================================

//! ## Overview
//! Each `testcase` becomes a sample labelled `classname.name` (or `name`
//! alone) whose duration is the `time` attribute in seconds converted to
//! milliseconds. A case fails when it has a `failure` or `error` child.
//!
//! Start times come from the enclosing `testsuite` `timestamp` attribute;
//! cases within a suite are laid out back to back from that instant. Suites
//! without a timestamp start at the epoch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportInput;
use perf_gate_core::ReportName;
use perf_gate_core::Sample;
use perf_gate_core::Timestamp;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::ContentProbe;
use crate::FormatError;
use crate::ReportAdapter;
use crate::TimestampParser;
use crate::numeric::parse_float;
use crate::numeric::round_to_u64;
use crate::numeric::seconds_to_millis;
use crate::xml::Attributes;
use crate::xml::element_name;

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter for JUnit XML reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct JunitAdapter;

impl ReportAdapter for JunitAdapter {
    fn name(&self) -> &'static str {
        "junit"
    }

    fn detect(&self, probe: &ContentProbe) -> bool {
        matches!(probe.xml_root(), Some("testsuites" | "testsuite"))
    }

    fn parse(&self, input: &ReportInput) -> Result<PerformanceReport, FormatError> {
        let text = input.text();
        let mut reader = Reader::from_str(&text);
        let mut state = SuiteState::new(&input.name);
        loop {
            match reader.read_event() {
                Ok(Event::Start(element)) => {
                    let attributes = Attributes::of(&element)
                        .map_err(|reason| FormatError::new(&input.name, reason))?;
                    state.open(&element_name(&element), &attributes, false)?;
                }
                Ok(Event::Empty(element)) => {
                    let attributes = Attributes::of(&element)
                        .map_err(|reason| FormatError::new(&input.name, reason))?;
                    state.open(&element_name(&element), &attributes, true)?;
                }
                Ok(Event::End(element)) => {
                    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                    state.close(&name)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(FormatError::new(
                        &input.name,
                        format!("malformed XML at byte {}: {err}", reader.buffer_position()),
                    ));
                }
            }
        }
        let report = state.report;
        debug!(report = %input.name, samples = report.samples(), "parsed JUnit report");
        Ok(report)
    }
}

// ============================================================================
// SECTION: Parse State
// ============================================================================

/// Test case awaiting its closing tag.
struct PendingCase {
    /// Sample label.
    label: String,
    /// Duration in milliseconds.
    duration_ms: u64,
    /// Whether a failure or error child was seen.
    failed: bool,
}

/// Streaming state while walking a JUnit document.
struct SuiteState<'a> {
    /// Report name for errors.
    name: &'a ReportName,
    /// Report under construction.
    report: PerformanceReport,
    /// Per-file timestamp parser.
    timestamps: TimestampParser,
    /// Start time of the next case in the current suite.
    clock: Timestamp,
    /// Case currently open.
    pending: Option<PendingCase>,
}

impl<'a> SuiteState<'a> {
    /// Creates the state for one report.
    fn new(name: &'a ReportName) -> Self {
        Self {
            name,
            report: PerformanceReport::new(name.clone()),
            timestamps: TimestampParser::new(),
            clock: Timestamp::default(),
            pending: None,
        }
    }

    /// Handles an opening or self-closing tag.
    fn open(
        &mut self,
        element: &str,
        attributes: &Attributes,
        empty: bool,
    ) -> Result<(), FormatError> {
        match element {
            "testsuite" => {
                if let Some(value) = attributes.get("timestamp") {
                    self.clock = self.timestamps.parse(value).ok_or_else(|| {
                        FormatError::new(self.name, format!("invalid suite timestamp: {value}"))
                    })?;
                }
            }
            "testcase" => {
                let case = pending_case(attributes)
                    .map_err(|reason| FormatError::new(self.name, reason))?;
                self.pending = Some(case);
                if empty {
                    self.finish_case()?;
                }
            }
            "failure" | "error" => {
                if let Some(case) = &mut self.pending {
                    case.failed = true;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Handles a closing tag.
    fn close(&mut self, element: &str) -> Result<(), FormatError> {
        if element == "testcase" {
            self.finish_case()?;
        }
        Ok(())
    }

    /// Records the pending case as a sample.
    fn finish_case(&mut self) -> Result<(), FormatError> {
        let Some(case) = self.pending.take() else {
            return Ok(());
        };
        let sample =
            Sample::new(case.label, self.clock, case.duration_ms).with_success(!case.failed);
        self.clock = self.clock.saturating_add_millis(case.duration_ms);
        self.report.add_sample(&sample).map_err(|err| FormatError::from_report(self.name, &err))
    }
}

/// Reads the label and duration of a test case.
fn pending_case(attributes: &Attributes) -> Result<PendingCase, String> {
    let name = attributes.get("name").ok_or("testcase without name attribute")?;
    let label = match attributes.get("classname").filter(|class| !class.is_empty()) {
        Some(class) => format!("{class}.{name}"),
        None => name.to_string(),
    };
    let duration_ms = match attributes.get("time") {
        Some(time) => {
            let seconds = parse_float(&time.replace(',', ""))
                .ok_or_else(|| format!("invalid time for {label}: {time}"))?;
            round_to_u64(seconds_to_millis(seconds))
                .ok_or_else(|| format!("time out of range for {label}: {time}"))?
        }
        None => 0,
    };
    Ok(PendingCase { label, duration_ms, failed: false })
}
