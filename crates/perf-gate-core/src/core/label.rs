// crates/perf-gate-core/src/core/label.rs
// ============================================================================
// Module: Label Keys
// Description: Normalized label keys for per-label aggregation.
// Purpose: Collapse textually different but equivalent labels into one key.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Load-testing tools emit request labels with or without a protocol prefix
//! and with either path separator. Normalization strips every `https:` and
//! `http:` occurrence until none remain, then maps `/` and `\` to `_`. The
//! mapping is total and idempotent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Protocol prefixes removed during normalization, longest first.
const STRIPPED_PREFIXES: [&str; 2] = ["https:", "http:"];
/// Replacement for path separators.
const SEPARATOR_REPLACEMENT: char = '_';

// ============================================================================
// SECTION: Label Key
// ============================================================================

/// Normalized label key.
///
/// # Invariants
/// - Contains no `http:`/`https:` substrings and no `/` or `\` characters.
/// - Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelKey(String);

impl LabelKey {
    /// Normalizes a raw label into a key.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self(normalize_label(raw))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for LabelKey {
    fn from(value: &str) -> Self {
        Self::normalize(value)
    }
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes a raw label string.
///
/// Removal repeats until a fixed point so that overlapping inputs such as
/// `hhttp:ttp:` cannot reintroduce a prefix after one pass.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let mut next = current.clone();
        for prefix in STRIPPED_PREFIXES {
            next = next.replace(prefix, "");
        }
        if next == current {
            break;
        }
        current = next;
    }
    current
        .chars()
        .map(|ch| if ch == '/' || ch == '\\' { SEPARATOR_REPLACEMENT } else { ch })
        .collect()
}
