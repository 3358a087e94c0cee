// crates/perf-gate-config/src/lib.rs
// ============================================================================
// Module: Perf Gate Config Library
// Description: Canonical config model, validation, and constraint conversion.
// Purpose: Single source of truth for perf-gate.toml semantics.
// Dependencies: perf-gate-core, perf-gate-adapters, serde, toml
// ============================================================================

//! ## Overview
//! `perf-gate-config` defines the configuration model for Perf Gate: the run
//! under evaluation, its report inputs, adapter policy, prior-run history,
//! constraint definitions, and logging. Validation is strict and fail-closed;
//! every constraint is converted into a core [`perf_gate_core::Constraint`]
//! before a config is accepted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
