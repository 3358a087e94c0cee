// crates/perf-gate-adapters/src/numeric.rs
// ============================================================================
// Module: Numeric Field Parsing
// Description: Lenient number parsing and unit conversion for report fields.
// Purpose: Share field parsing rules across adapters.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Report tools are inconsistent about number formatting. These helpers trim
//! whitespace, accept integral floats for counters, and convert seconds and
//! unit-suffixed values into milliseconds or bytes.

/// Exclusive upper bound of `u64` as a float (2^64).
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Parses a non-negative integer field, accepting integral floats like `12.0`.
pub fn parse_count(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(parsed) = value.parse::<u64>() {
        return Some(parsed);
    }
    let parsed = parse_float(value)?;
    if parsed.fract().abs() > f64::EPSILON {
        return None;
    }
    round_to_u64(parsed)
}

/// Parses a finite, non-negative float field.
pub fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|parsed| parsed.is_finite() && *parsed >= 0.0)
}

/// Parses a boolean field, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Converts seconds to milliseconds.
pub fn seconds_to_millis(seconds: f64) -> f64 {
    seconds * 1000.0
}

/// Rounds a finite, non-negative float to the nearest integer.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Value is finite, non-negative, rounded, and checked against the u64 range."
)]
pub fn round_to_u64(value: f64) -> Option<u64> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < 0.0 || rounded >= U64_LIMIT {
        return None;
    }
    Some(rounded as u64)
}

/// Parses a duration with a unit suffix (`us`, `ms`, `s`, `m`, `h`) into
/// milliseconds.
pub fn parse_duration_millis(value: &str) -> Option<f64> {
    let value = value.trim();
    let split = value.find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))?;
    let (number, unit) = value.split_at(split);
    let number = parse_float(number)?;
    let factor = match unit.trim() {
        "us" | "µs" => 0.001,
        "ms" => 1.0,
        "s" => 1000.0,
        "m" => 60_000.0,
        "h" => 3_600_000.0,
        _ => return None,
    };
    Some(number * factor)
}

/// Parses a size with a unit suffix (`B`, `KB`, `MB`, `GB`, `TB`) into bytes.
pub fn parse_size_bytes(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value.find(|ch: char| !(ch.is_ascii_digit() || ch == '.')).unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number = parse_float(number)?;
    let factor = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1.0,
        "KB" => 1024.0,
        "MB" => 1024.0 * 1024.0,
        "GB" => 1024.0 * 1024.0 * 1024.0,
        "TB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    round_to_u64(number * factor)
}
