//! Signal rule model, value parsing and validation
//!
//! This module turns raw rule descriptions into typed rules consumed by
//! the matcher.

pub mod model;
pub mod validate;
pub mod value;

// Re-export key types for convenience
pub use model::{MatchPolicy, Protocol, SignalRule};
pub use validate::{validate_rule, validate_rules, RuleSetError};
pub use value::parse_value;
