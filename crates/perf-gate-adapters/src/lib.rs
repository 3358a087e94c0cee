// crates/perf-gate-adapters/src/lib.rs
// ============================================================================
// Module: Perf Gate Adapters
// Description: Format adapters, detection, and batch parsing.
// Purpose: Turn performance-tool output files into core performance reports.
// Dependencies: perf-gate-core, quick-xml, csv, time, serde, tracing
// ============================================================================

//! ## Overview
//! This crate ships one adapter per supported report format and a registry
//! that routes report inputs to adapters by name or by content detection.
//! Request-level formats (JMeter XML and CSV, JUnit XML) produce samples;
//! summary formats (Taurus XML and CSV, Locust CSV, JMeter summariser logs,
//! wrk output) produce summary groups.
//! Invariants:
//! - One malformed file yields one [`FormatError`] and never aborts a batch.
//! - Adapters hold no per-file state; they are shared across worker threads.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod batch;
pub mod jmeter_csv;
pub mod jmeter_log;
pub mod jmeter_xml;
pub mod junit;
pub mod locust;
pub mod registry;
pub mod taurus;
pub mod timestamp;
pub mod wrk;

mod numeric;
mod summary;
mod xml;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::ContentProbe;
pub use adapter::FormatError;
pub use adapter::PROBE_BYTES;
pub use adapter::RegistryError;
pub use adapter::ReportAdapter;
pub use batch::BatchOptions;
pub use batch::BatchOutcome;
pub use batch::parse_batch;
pub use jmeter_csv::JmeterCsvAdapter;
pub use jmeter_csv::JmeterCsvConfig;
pub use jmeter_log::JmeterLogAdapter;
pub use jmeter_xml::JmeterXmlAdapter;
pub use junit::JunitAdapter;
pub use locust::LocustAdapter;
pub use locust::LocustConfig;
pub use registry::AdapterAccessPolicy;
pub use registry::AdapterRegistry;
pub use registry::BuiltinAdapterConfigs;
pub use taurus::TaurusConfig;
pub use taurus::TaurusCsvAdapter;
pub use taurus::TaurusXmlAdapter;
pub use timestamp::TimestampParser;
pub use wrk::WrkAdapter;

#[cfg(test)]
mod tests;
