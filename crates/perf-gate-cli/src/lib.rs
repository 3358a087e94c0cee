// crates/perf-gate-cli/src/lib.rs
// ============================================================================
// Module: Perf Gate CLI Library
// Description: Building blocks behind the `perf-gate` binary.
// Purpose: Keep file resolution, pipeline wiring, and rendering testable.
// Dependencies: perf-gate-core, perf-gate-adapters, perf-gate-config
// ============================================================================

//! ## Overview
//! The `perf-gate` binary is a thin dispatcher over this library. The
//! library resolves report files from disk, runs the configured ingestion
//! and evaluation pipeline, and renders reports and verdicts for terminals
//! and CI tooling.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod files;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod sink;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use files::FsFileProvider;
pub use logging::LoggingError;
pub use logging::init_logging;
pub use pipeline::CurrentRun;
pub use pipeline::GateReport;
pub use pipeline::GateSession;
pub use pipeline::PipelineError;
pub use sink::JsonSink;
pub use sink::TextSink;
