// crates/perf-gate-adapters/src/timestamp.rs
// ============================================================================
// Module: Timestamp Parsing
// Description: Epoch and textual timestamp parsing with a per-file pattern cache.
// Purpose: Convert report timestamps into unix milliseconds deterministically.
// Dependencies: perf-gate-core, time
// ============================================================================

//! ## Overview
//! Report tools emit either epoch milliseconds or one of a handful of
//! textual layouts. [`TimestampParser`] accepts a numeric value first and
//! otherwise tries the known layouts in a fixed order. The first layout that
//! matches is cached for the rest of the file and tried first on every later
//! line; layouts that failed before the cache was set are never retried.
//! Textual timestamps carry no zone and are interpreted as UTC.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use perf_gate_core::Timestamp;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Known textual layouts, as `(display name, format description)` pairs, in
/// the order they are tried.
const LAYOUTS: [(&str, &str); 7] = [
    (
        "yyyy/MM/dd HH:mm:ss.SSS",
        "[year]/[month]/[day] [hour]:[minute]:[second].[subsecond digits:3]",
    ),
    ("yyyy/MM/dd HH:mm:ss", "[year]/[month]/[day] [hour]:[minute]:[second]"),
    (
        "yyyy-MM-dd HH:mm:ss.SSS",
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]",
    ),
    (
        "yyyy-MM-dd HH:mm:ss,SSS",
        "[year]-[month]-[day] [hour]:[minute]:[second],[subsecond digits:3]",
    ),
    ("yyyy-MM-dd HH:mm:ss", "[year]-[month]-[day] [hour]:[minute]:[second]"),
    ("yyyy-MM-dd'T'HH:mm:ss", "[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ("MM/dd/yyyy HH:mm:ss", "[month]/[day]/[year] [hour]:[minute]:[second]"),
];

/// Compiled layout.
struct Pattern {
    /// Display name of the layout.
    name: &'static str,
    /// Compiled format description.
    items: Vec<BorrowedFormatItem<'static>>,
}

/// Layouts compiled once per process.
static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    LAYOUTS
        .iter()
        .filter_map(|&(name, description)| {
            time::format_description::parse(description)
                .ok()
                .map(|items| Pattern { name, items })
        })
        .collect()
});

/// Returns the display names of the supported textual layouts.
#[must_use]
pub fn supported_layouts() -> Vec<&'static str> {
    PATTERNS.iter().map(|pattern| pattern.name).collect()
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Per-file timestamp parser.
///
/// # Invariants
/// - `cached`, once set, indexes the layout that matched first in this file.
/// - `rejected[i]` is set only for layouts that failed before `cached` was set.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    /// Index of the cached layout.
    cached: Option<usize>,
    /// Layouts ruled out before a layout was cached.
    rejected: Vec<bool>,
}

impl TimestampParser {
    /// Creates a parser with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self { cached: None, rejected: vec![false; PATTERNS.len()] }
    }

    /// Returns the display name of the cached layout.
    #[must_use]
    pub fn cached_layout(&self) -> Option<&'static str> {
        self.cached.and_then(|index| PATTERNS.get(index)).map(|pattern| pattern.name)
    }

    /// Parses one timestamp value.
    ///
    /// Returns `None` when the value is neither epoch milliseconds nor any
    /// known layout.
    pub fn parse(&mut self, value: &str) -> Option<Timestamp> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Ok(millis) = value.parse::<i64>() {
            return Some(Timestamp::from_unix_millis(millis));
        }
        if let Some(index) = self.cached {
            if let Some(timestamp) = try_layout(index, value) {
                return Some(timestamp);
            }
            return self.scan(value, Some(index));
        }
        self.scan(value, None)
    }

    /// Tries every layout that is neither cached nor rejected, in order.
    ///
    /// Layouts that fail ahead of the first successful match are rejected
    /// for the rest of the file; a line matching no layout rejects nothing.
    fn scan(&mut self, value: &str, skip: Option<usize>) -> Option<Timestamp> {
        let mut failed = Vec::new();
        for index in 0 .. PATTERNS.len() {
            if Some(index) == skip || self.rejected.get(index).copied().unwrap_or(true) {
                continue;
            }
            let Some(timestamp) = try_layout(index, value) else {
                failed.push(index);
                continue;
            };
            if self.cached.is_none() {
                self.cached = Some(index);
                for rejected in failed {
                    if let Some(flag) = self.rejected.get_mut(rejected) {
                        *flag = true;
                    }
                }
            }
            return Some(timestamp);
        }
        None
    }
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `value` with the layout at `index`.
fn try_layout(index: usize, value: &str) -> Option<Timestamp> {
    let pattern = PATTERNS.get(index)?;
    PrimitiveDateTime::parse(value, pattern.items.as_slice())
        .ok()
        .map(Timestamp::from_primitive_utc)
}
