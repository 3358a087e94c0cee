// crates/perf-gate-core/src/lib.rs
// ============================================================================
// Module: Perf Gate Core Library
// Description: Public API surface for the Perf Gate core.
// Purpose: Expose the report model, interfaces, and runtime evaluation.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Perf Gate core normalizes performance-test output into one statistical
//! model and decides whether a run is acceptable. It aggregates samples and
//! summary groups per label and per run, diffs runs against baselines, and
//! evaluates absolute and relative constraints against run history.
//!
//! The core performs no I/O. Files, caches, and history are reached only
//! through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CacheError;
pub use interfaces::FileProvider;
pub use interfaces::FileProviderError;
pub use interfaces::HistoryError;
pub use interfaces::HistoryProvider;
pub use interfaces::HistoryRequest;
pub use interfaces::OutcomeSink;
pub use interfaces::ReportCache;
pub use interfaces::ReportInput;
pub use interfaces::ReportKey;
pub use interfaces::SinkError;
pub use runtime::ConstraintEvaluator;
pub use runtime::GateOutcome;
pub use runtime::InMemoryReportCache;
pub use runtime::InMemoryRunHistory;
pub use runtime::SharedHistoryProvider;
pub use runtime::SharedReportCache;
pub use runtime::VerdictSummary;
pub use runtime::aggregate;
