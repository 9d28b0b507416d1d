//! CAN Signal Matcher Library
//!
//! Classifies received CAN frames against user-defined signal rules and
//! keeps a latching match state per signal, the way LED-style status
//! indicators expect it.
//!
//! # Architecture
//!
//! This library is intentionally small and pure:
//! - Validates raw rule descriptions into typed [`SignalRule`]s
//! - Decides identifier relevance (exact ID or J1939 PGN)
//! - Evaluates payload policies (exact bytes, byte range, single bit)
//! - Latches per-rule match state, only updating on relevant frames
//!
//! The library does NOT:
//! - Talk to CAN hardware or read trace files
//! - Parse configuration files
//! - Render or export anything
//!
//! All of that lives in the application layer (can-monitor-cli).
//!
//! # Example Usage
//!
//! ```
//! use can_signal_matcher::{validate_rule, Frame, MonitorSession, SessionConfig};
//! use serde_json::json;
//!
//! let rule = validate_rule(&json!({
//!     "name": "Coolant Temp",
//!     "can_id": "0x18F00401",
//!     "protocol": "j1939",
//!     "match_type": "range",
//!     "byte_index": 3,
//!     "min_value": "0x06",
//!     "max_value": "0xFF"
//! })).unwrap();
//!
//! let mut session = MonitorSession::new(vec![rule], SessionConfig::new());
//!
//! // Same PGN from a different source address and priority
//! let frame = Frame::new(0x0CF00400, vec![0, 0, 0, 0x10, 0, 0, 0, 0]);
//! for update in session.handle_frame(&frame) {
//!     println!("{}: {}", update.name, if update.matched { "MATCH" } else { "NO MATCH" });
//! }
//!
//! assert_eq!(session.state("Coolant Temp"), Some(true));
//! ```

// Public modules
pub mod config;
pub mod latch;
pub mod matcher;
pub mod rules;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use config::{NotifyPolicy, SessionConfig};
pub use latch::{on_frame, LatchMap, LatchSnapshot};
pub use matcher::{evaluate, extract_pgn, is_relevant, matches_payload};
pub use rules::{
    parse_value, validate_rule, validate_rules, MatchPolicy, Protocol, RuleSetError,
    SignalRule,
};
pub use session::{MonitorSession, SessionStats};
pub use types::{Frame, LatchUpdate, Result, RuleName, Timestamp, ValidationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
