//! Session configuration types
//!
//! This module defines the small set of knobs a monitoring session takes.
//! Rule definitions are not configured here; they arrive already validated.

use serde::{Deserialize, Serialize};

/// When a session reports a relevant evaluation to its readers
///
/// The stored latch state is updated on every relevant frame either way;
/// this only controls which updates `handle_frame` hands back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// Report only updates that flip the stored value
    #[default]
    OnChange,
    /// Report every relevant evaluation, even if the value is unchanged
    EveryRelevantFrame,
}

/// Configuration for a monitoring session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Which latch updates are reported back to the caller
    #[serde(default)]
    pub notify: NotifyPolicy,

    /// Log every handled frame at debug level
    #[serde(default)]
    pub log_frames: bool,
}

impl SessionConfig {
    /// Create a new session configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the notification policy
    pub fn with_notify(mut self, notify: NotifyPolicy) -> Self {
        self.notify = notify;
        self
    }

    /// Builder method: enable or disable per-frame logging
    pub fn with_frame_logging(mut self, enabled: bool) -> Self {
        self.log_frames = enabled;
        self
    }

    /// Check if an update should be reported under this configuration
    pub fn should_notify(&self, changed: bool) -> bool {
        match self.notify {
            NotifyPolicy::OnChange => changed,
            NotifyPolicy::EveryRelevantFrame => true,
        }
    }
}
