//! Hex-or-decimal value parsing
//!
//! Configuration values may be written as plain integers (`291`), decimal
//! strings (`"291"`) or hex strings (`"0x123"`, prefix case-insensitive).

use crate::types::{Result, ValidationError};
use serde_json::Value;

/// Parse a raw configuration value into an unsigned integer
///
/// # Arguments
/// * `value` - JSON value taken from a raw rule description
///
/// # Returns
/// * `Ok(u64)` for a non-negative integer, decimal string or `0x` hex string
/// * `Err(ValidationError::InvalidValueType)` for anything else
pub fn parse_value(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ValidationError::InvalidValueType(n.to_string())),
        Value::String(s) => parse_str(s),
        other => Err(ValidationError::InvalidValueType(other.to_string())),
    }
}

fn parse_str(s: &str) -> Result<u64> {
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| ValidationError::InvalidValueType(format!("{:?}", s)))
}

/// Parse a value and check it does not exceed `max`
pub(crate) fn parse_bounded(field: &str, value: &Value, max: u64) -> Result<u64> {
    let parsed = parse_value(value)?;
    if parsed > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: parsed,
            max,
        });
    }
    Ok(parsed)
}
