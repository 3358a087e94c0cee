// crates/perf-gate-cli/src/logging.rs
// ============================================================================
// Module: Logging
// Description: tracing subscriber initialization for the CLI.
// Purpose: Route library events to stderr with a configurable filter.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Filter precedence: an explicit level override, then `RUST_LOG`, then the
//! configured `[logging] level`. Output goes to stderr so stdout stays
//! reserved for command results.

use std::env;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Logging initialization errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter {directive}: {reason}")]
    Filter {
        /// Offending directive.
        directive: String,
        /// Parser message.
        reason: String,
    },
    /// A global subscriber is already installed.
    #[error("logging init failed: {0}")]
    Init(String),
}

/// Builds the event filter.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when a directive is malformed.
pub fn build_filter(
    override_level: Option<&str>,
    configured: &str,
) -> Result<EnvFilter, LoggingError> {
    let directive = match override_level {
        Some(level) => level.to_string(),
        None => env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| configured.to_string()),
    };
    EnvFilter::try_new(&directive)
        .map_err(|err| LoggingError::Filter { directive, reason: err.to_string() })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is malformed or a subscriber is
/// already installed.
pub fn init_logging(
    override_level: Option<&str>,
    configured: &str,
    ansi: bool,
) -> Result<(), LoggingError> {
    let filter = build_filter(override_level, configured)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}
