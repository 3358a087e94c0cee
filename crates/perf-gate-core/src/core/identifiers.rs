// crates/perf-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Perf Gate Identifiers
// Description: Canonical opaque identifiers for runs, reports, and constraints.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the identifiers used throughout Perf Gate. Identifiers
//! are opaque strings on the wire. Report names double as report identity: a
//! report is named after the source file it was parsed from.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Run identifier for one execution of a performance test.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Creates a new run identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RunId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Report name, the identity of a performance report within a run.
///
/// # Invariants
/// - Matches the file name of the source the report was parsed from.
/// - Compared byte-for-byte; no case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportName(String);

impl ReportName {
    /// Creates a new report name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ReportName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ReportName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Constraint identifier used to correlate evaluations with rules.
///
/// # Invariants
/// - Opaque UTF-8 string; uniqueness is enforced by constraint set validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintId(String);

impl ConstraintId {
    /// Creates a new constraint identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ConstraintId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConstraintId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
