//! Raw rule validation
//!
//! Converts untyped rule descriptions (parsed JSON objects) into
//! [`SignalRule`] values. Malformed rules are rejected here, before a
//! monitoring session starts.

use crate::rules::model::{MatchPolicy, Protocol, SignalRule};
use crate::rules::value::parse_bounded;
use crate::types::{Result, ValidationError};
use serde_json::{Map, Value};

/// Highest byte index accepted for range and bit rules
///
/// Indices past the end of a received payload are a non-match at
/// evaluation time, so anything up to this bound is kept as-is.
const MAX_BYTE_INDEX: u64 = u16::MAX as u64;

/// A rule rejected while validating a whole configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Signal #{index}{}: {source}", label(.name))]
pub struct RuleSetError {
    /// Position of the rule in the configuration
    pub index: usize,
    /// Rule name, if the raw description had a usable one
    pub name: Option<String>,
    /// Why the rule was rejected
    #[source]
    pub source: ValidationError,
}

/// Validate one raw rule description
///
/// Required for every rule: `name`, `can_id`, `match_type`. The policy
/// selector then decides which other fields are required:
/// - `exact`: `data` (a list of byte values)
/// - `range`: `byte_index` (or legacy `data_byte_index`), `min_value`, `max_value`
/// - `bit`: `byte_index`, `bit_index`, `bit_value`
///
/// `protocol` is optional (`standard` or `j1939`, default `standard`).
///
/// # Example
/// ```
/// use can_signal_matcher::{validate_rule, MatchPolicy};
/// use serde_json::json;
///
/// let rule = validate_rule(&json!({
///     "name": "Brake",
///     "can_id": "0x119",
///     "match_type": "bit",
///     "byte_index": 3,
///     "bit_index": 0,
///     "bit_value": 1
/// })).unwrap();
///
/// assert_eq!(rule.identifier, 0x119);
/// assert!(matches!(rule.policy, MatchPolicy::Bit { byte_index: 3, .. }));
/// ```
pub fn validate_rule(raw: &Value) -> Result<SignalRule> {
    let fields = raw
        .as_object()
        .ok_or_else(|| ValidationError::InvalidValueType(raw.to_string()))?;

    let name = match require(fields, "name")? {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        other => return Err(ValidationError::InvalidValueType(other.to_string())),
    };
    let identifier = parse_bounded("can_id", require(fields, "can_id")?, u32::MAX as u64)? as u32;
    let match_type = match require(fields, "match_type")? {
        Value::String(s) => s.as_str(),
        other => return Err(ValidationError::UnknownMatchType(other.to_string())),
    };
    let protocol = parse_protocol(fields.get("protocol"))?;

    let policy = match match_type {
        "exact" => parse_exact(fields)?,
        "range" => parse_range(fields)?,
        "bit" => parse_bit(fields)?,
        other => return Err(ValidationError::UnknownMatchType(other.to_string())),
    };

    Ok(SignalRule {
        name,
        identifier,
        protocol,
        policy,
    })
}

/// Validate every rule of a configuration, stopping at the first failure
pub fn validate_rules(raws: &[Value]) -> std::result::Result<Vec<SignalRule>, RuleSetError> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| {
            validate_rule(raw).map_err(|source| RuleSetError {
                index,
                name: raw.get("name").and_then(Value::as_str).map(str::to_string),
                source,
            })
        })
        .collect()
}

fn label(name: &Option<String>) -> String {
    name.as_deref().map(|n| format!(" ({})", n)).unwrap_or_default()
}

fn require<'a>(fields: &'a Map<String, Value>, field: &str) -> Result<&'a Value> {
    fields
        .get(field)
        .ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn parse_protocol(value: Option<&Value>) -> Result<Protocol> {
    match value {
        None | Some(Value::Null) => Ok(Protocol::Standard),
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Protocol::Standard),
            "j1939" => Ok(Protocol::J1939),
            _ => Err(ValidationError::UnknownProtocol(s.clone())),
        },
        Some(other) => Err(ValidationError::InvalidValueType(other.to_string())),
    }
}

fn parse_exact(fields: &Map<String, Value>) -> Result<MatchPolicy> {
    let items = match require(fields, "data")? {
        Value::Array(items) => items,
        other => return Err(ValidationError::InvalidValueType(other.to_string())),
    };

    let expected_data = items
        .iter()
        .map(|item| parse_bounded("data", item, u8::MAX as u64).map(|b| b as u8))
        .collect::<Result<Vec<u8>>>()?;

    Ok(MatchPolicy::Exact { expected_data })
}

fn parse_range(fields: &Map<String, Value>) -> Result<MatchPolicy> {
    // Older configurations spell the offset `data_byte_index`
    let byte_index = match fields.get("byte_index").or_else(|| fields.get("data_byte_index")) {
        Some(value) => parse_bounded("byte_index", value, MAX_BYTE_INDEX)? as usize,
        None => return Err(ValidationError::MissingField("byte_index".to_string())),
    };
    let min_value = parse_bounded("min_value", require(fields, "min_value")?, u8::MAX as u64)? as u8;
    let max_value = parse_bounded("max_value", require(fields, "max_value")?, u8::MAX as u64)? as u8;

    if min_value > max_value {
        log::debug!(
            "Range 0x{:02X}..=0x{:02X} is inverted and will never match",
            min_value,
            max_value
        );
    }

    Ok(MatchPolicy::Range {
        byte_index,
        min_value,
        max_value,
    })
}

fn parse_bit(fields: &Map<String, Value>) -> Result<MatchPolicy> {
    let byte_index = parse_bounded("byte_index", require(fields, "byte_index")?, MAX_BYTE_INDEX)? as usize;
    let bit_index = parse_bounded("bit_index", require(fields, "bit_index")?, 7)? as u8;
    let bit_value = parse_bounded("bit_value", require(fields, "bit_value")?, 1)? as u8;

    Ok(MatchPolicy::Bit {
        byte_index,
        bit_index,
        bit_value,
    })
}
