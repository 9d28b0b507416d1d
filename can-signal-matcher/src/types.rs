//! Core types for the signal matcher library
//!
//! This module defines the frame descriptor consumed by the matcher, the
//! notification emitted when a latch is updated, and the validation error
//! taxonomy reported at configuration-load time. Live matching itself has no
//! error conditions.

use chrono::{DateTime, Utc};
use std::fmt;

/// Timestamp type used throughout the matcher
pub type Timestamp = DateTime<Utc>;

/// Result type for rule validation
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Display label of a signal rule (also the key of its latch entry)
pub type RuleName = String;

/// Highest identifier that fits in an 11-bit standard frame
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Raw CAN frame as handed over by the reception path
///
/// The matcher treats the payload as untrusted input of arbitrary length;
/// nothing here enforces the classic 8-byte limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Reception timestamp in nanoseconds since epoch (0 if unknown)
    pub timestamp_ns: u64,
    /// CAN identifier (11-bit or 29-bit)
    pub identifier: u32,
    /// Frame data bytes
    pub payload: Vec<u8>,
    /// True if this is an extended (29-bit) identifier
    pub is_extended: bool,
}

impl Frame {
    /// Create a frame without a timestamp
    ///
    /// Identifiers above 0x7FF are flagged as extended.
    pub fn new(identifier: u32, payload: Vec<u8>) -> Self {
        Self {
            timestamp_ns: 0,
            identifier,
            payload,
            is_extended: identifier > MAX_STANDARD_ID,
        }
    }

    /// Builder method: set the reception timestamp
    pub fn with_timestamp_ns(mut self, timestamp_ns: u64) -> Self {
        self.timestamp_ns = timestamp_ns;
        self
    }

    /// Builder method: force the extended-identifier flag
    pub fn with_extended(mut self, is_extended: bool) -> Self {
        self.is_extended = is_extended;
        self
    }

    /// Convert timestamp from nanoseconds to DateTime<Utc>
    pub fn timestamp(&self) -> Timestamp {
        let secs = (self.timestamp_ns / 1_000_000_000) as i64;
        let nsecs = (self.timestamp_ns % 1_000_000_000) as u32;
        DateTime::from_timestamp(secs, nsecs).unwrap_or_default()
    }

    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.payload.len()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = if self.is_extended {
            format!("0x{:08X}", self.identifier)
        } else {
            format!("0x{:03X}", self.identifier)
        };
        write!(f, "{:10} |", id)?;
        for byte in &self.payload {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// One relevant evaluation produced while handling a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatchUpdate {
    /// Rule name (latch key)
    pub name: RuleName,
    /// New latched value
    pub matched: bool,
    /// True if the stored value differs from the previous one
    pub changed: bool,
}

/// Errors that can occur while turning a raw rule description into a
/// [`SignalRule`](crate::rules::SignalRule)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown match type: {0}")]
    UnknownMatchType(String),

    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("Invalid value type: {0}")]
    InvalidValueType(String),

    #[error("Value {value} out of range for '{field}' (max {max})")]
    OutOfRange { field: String, value: u64, max: u64 },
}
