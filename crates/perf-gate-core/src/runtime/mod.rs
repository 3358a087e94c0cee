// crates/perf-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Perf Gate Runtime
// Description: Constraint evaluation, verdict aggregation, and in-memory stores.
// Purpose: Turn sealed reports and history into a gate outcome.
// Dependencies: crate::core, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! The runtime evaluates constraints against a sealed run and its history,
//! folds the verdicts into a [`GateOutcome`], and provides in-memory
//! collaborator implementations.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod evaluator;
pub mod store;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use evaluator::COMPARISON_EPSILON;
pub use evaluator::ConstraintEvaluator;
pub use evaluator::apply_operator;
pub use evaluator::relative_threshold;
pub use store::InMemoryReportCache;
pub use store::InMemoryRunHistory;
pub use store::SharedHistoryProvider;
pub use store::SharedReportCache;
pub use verdict::GateOutcome;
pub use verdict::VerdictSummary;
pub use verdict::aggregate;
