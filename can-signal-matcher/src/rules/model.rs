//! Validated signal rule model
//!
//! A `SignalRule` is produced once at configuration-load time and is
//! immutable for the lifetime of a monitoring session. Every field is a
//! normalized integer; the hot matching path never re-checks types.

use serde::Serialize;
use std::fmt;

/// Identifier interpretation used by the relevance filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Exact identifier comparison
    #[default]
    Standard,
    /// Compare only the PGN of a 29-bit identifier
    J1939,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Standard => write!(f, "standard"),
            Protocol::J1939 => write!(f, "j1939"),
        }
    }
}

/// Payload match policy, carrying only the fields it needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "match_type", rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Payload must equal `expected_data` byte for byte, same length
    Exact {
        expected_data: Vec<u8>,
    },
    /// `payload[byte_index]` must lie in `min_value..=max_value`
    Range {
        byte_index: usize,
        min_value: u8,
        max_value: u8,
    },
    /// Bit `bit_index` (0 = LSB) of `payload[byte_index]` must equal `bit_value`
    Bit {
        byte_index: usize,
        bit_index: u8,
        bit_value: u8,
    },
}

impl MatchPolicy {
    /// Selector string used in configuration files
    pub fn match_type(&self) -> &'static str {
        match self {
            MatchPolicy::Exact { .. } => "exact",
            MatchPolicy::Range { .. } => "range",
            MatchPolicy::Bit { .. } => "bit",
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Exact { expected_data } => {
                write!(f, "{} [", self.match_type())?;
                for (i, byte) in expected_data.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{:02X}", byte)?;
                }
                write!(f, "]")
            }
            MatchPolicy::Range {
                byte_index,
                min_value,
                max_value,
            } => write!(
                f,
                "{} byte[{}] in 0x{:02X}..=0x{:02X}",
                self.match_type(),
                byte_index,
                min_value,
                max_value
            ),
            MatchPolicy::Bit {
                byte_index,
                bit_index,
                bit_value,
            } => write!(
                f,
                "{} byte[{}].{} == {}",
                self.match_type(),
                byte_index,
                bit_index,
                bit_value
            ),
        }
    }
}

/// One monitored condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalRule {
    /// Display label (not required to be unique)
    pub name: String,
    /// Frame identifier to match against
    pub identifier: u32,
    /// How the identifier is compared
    pub protocol: Protocol,
    /// How the payload is compared once the identifier is relevant
    #[serde(flatten)]
    pub policy: MatchPolicy,
}

impl SignalRule {
    /// Create a standard-protocol rule
    pub fn new(name: impl Into<String>, identifier: u32, policy: MatchPolicy) -> Self {
        Self {
            name: name.into(),
            identifier,
            protocol: Protocol::Standard,
            policy,
        }
    }

    /// Builder method: set the protocol
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Shorthand for an exact-data rule
    pub fn exact(name: impl Into<String>, identifier: u32, expected_data: Vec<u8>) -> Self {
        Self::new(name, identifier, MatchPolicy::Exact { expected_data })
    }

    /// Shorthand for a byte range rule
    pub fn range(
        name: impl Into<String>,
        identifier: u32,
        byte_index: usize,
        min_value: u8,
        max_value: u8,
    ) -> Self {
        Self::new(
            name,
            identifier,
            MatchPolicy::Range {
                byte_index,
                min_value,
                max_value,
            },
        )
    }

    /// Shorthand for a single-bit rule
    ///
    /// Callers building rules by hand are expected to keep `bit_index`
    /// below 8; [`validate_rule`](super::validate_rule) enforces it for
    /// configuration input.
    pub fn bit(
        name: impl Into<String>,
        identifier: u32,
        byte_index: usize,
        bit_index: u8,
        bit_value: u8,
    ) -> Self {
        Self::new(
            name,
            identifier,
            MatchPolicy::Bit {
                byte_index,
                bit_index,
                bit_value,
            },
        )
    }
}

impl fmt::Display for SignalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (0x{:X}, {}): {}",
            self.name, self.identifier, self.protocol, self.policy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_display() {
        let rule = SignalRule::range("Coolant", 0x18F00401, 3, 0x06, 0xFF)
            .with_protocol(Protocol::J1939);
        assert_eq!(
            rule.to_string(),
            "Coolant (0x18F00401, j1939): range byte[3] in 0x06..=0xFF"
        );

        let rule = SignalRule::exact("Door", 0x123, vec![0x01, 0xAB]);
        assert_eq!(rule.to_string(), "Door (0x123, standard): exact [01 AB]");

        let rule = SignalRule::bit("Brake", 0x119, 3, 0, 1);
        assert_eq!(rule.to_string(), "Brake (0x119, standard): bit byte[3].0 == 1");
    }

    #[test]
    fn test_rule_serialization() {
        let rule = SignalRule::bit("Brake", 0x119, 3, 0, 1);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["name"], "Brake");
        assert_eq!(json["identifier"], 0x119);
        assert_eq!(json["protocol"], "standard");
        assert_eq!(json["match_type"], "bit");
        assert_eq!(json["bit_index"], 0);
    }

    #[test]
    fn test_default_protocol() {
        assert_eq!(Protocol::default(), Protocol::Standard);
        assert_eq!(MatchPolicy::Exact { expected_data: vec![] }.match_type(), "exact");
    }
}
