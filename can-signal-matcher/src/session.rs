//! Monitoring session API
//!
//! A `MonitorSession` owns the rule set and the latch state for one
//! monitoring run. It is the single writer of that state: frames go in
//! through `handle_frame(&mut self)`, readers get owned snapshots or the
//! returned [`LatchUpdate`] messages, never a reference into the live map.

use crate::config::SessionConfig;
use crate::latch::{apply_frame, LatchMap, LatchSnapshot};
use crate::rules::SignalRule;
use crate::types::{Frame, LatchUpdate};

/// Counters collected over the lifetime of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames handed to the session
    pub frames_seen: u64,
    /// Rule evaluations triggered by relevant frames
    pub relevant_evaluations: u64,
    /// Evaluations that flipped a stored value
    pub state_changes: u64,
}

/// One monitoring session: immutable rules plus their latch state
pub struct MonitorSession {
    /// Rules loaded for this session, in configuration order
    rules: Vec<SignalRule>,
    /// Latched match state, keyed by rule name
    latch: LatchMap,
    config: SessionConfig,
    stats: SessionStats,
}

impl MonitorSession {
    /// Start a session; every rule starts out unmatched
    pub fn new(rules: Vec<SignalRule>, config: SessionConfig) -> Self {
        log::debug!("Starting monitoring session with {} rule(s)", rules.len());
        let latch = LatchMap::for_rules(&rules);
        Self {
            rules,
            latch,
            config,
            stats: SessionStats::default(),
        }
    }

    /// Handle one received frame
    ///
    /// Updates the latch of every rule relevant to the frame and returns
    /// the updates selected by the session's
    /// [`NotifyPolicy`](crate::config::NotifyPolicy).
    ///
    /// # Example
    /// ```
    /// use can_signal_matcher::{Frame, MonitorSession, SessionConfig, SignalRule};
    ///
    /// let rules = vec![SignalRule::bit("Brake", 0x119, 3, 0, 1)];
    /// let mut session = MonitorSession::new(rules, SessionConfig::new());
    ///
    /// let updates = session.handle_frame(&Frame::new(0x119, vec![0, 0, 0, 0x29]));
    /// assert_eq!(updates.len(), 1);
    /// assert!(updates[0].matched);
    /// ```
    pub fn handle_frame(&mut self, frame: &Frame) -> Vec<LatchUpdate> {
        self.stats.frames_seen += 1;
        if self.config.log_frames {
            log::debug!("{} {}", frame.timestamp().format("%H:%M:%S%.3f"), frame);
        }

        let updates = apply_frame(frame, &self.rules, &mut self.latch);
        self.stats.relevant_evaluations += updates.len() as u64;
        self.stats.state_changes += updates.iter().filter(|u| u.changed).count() as u64;

        updates
            .into_iter()
            .filter(|update| self.config.should_notify(update.changed))
            .collect()
    }

    /// Copy the current latch state
    pub fn snapshot(&self) -> LatchSnapshot {
        self.latch.snapshot()
    }

    /// Current state of one rule name
    pub fn state(&self, name: &str) -> Option<bool> {
        self.latch.get(name)
    }

    /// Rules loaded for this session
    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Counters collected so far
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Discard latch state and counters, keeping the rules
    pub fn reset(&mut self) {
        log::debug!("Resetting monitoring session");
        self.latch.reset();
        self.stats = SessionStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotifyPolicy;

    fn session(notify: NotifyPolicy) -> MonitorSession {
        let rules = vec![
            SignalRule::bit("Brake", 0x119, 3, 0, 1),
            SignalRule::exact("Door", 0x123, vec![0x01]),
        ];
        MonitorSession::new(rules, SessionConfig::new().with_notify(notify))
    }

    fn brake(byte3: u8) -> Frame {
        Frame::new(0x119, vec![0, 0, 0, byte3, 0, 0, 0, 0])
    }

    #[test]
    fn test_session_creation() {
        let session = session(NotifyPolicy::OnChange);
        assert_eq!(session.rules().len(), 2);
        assert_eq!(session.state("Brake"), Some(false));
        assert_eq!(session.stats(), SessionStats::default());
    }

    #[test]
    fn test_on_change_notifications() {
        let mut session = session(NotifyPolicy::OnChange);

        let updates = session.handle_frame(&brake(0x29));
        assert_eq!(updates.len(), 1);
        assert!(updates[0].matched && updates[0].changed);

        // Same value again: stored, not reported
        assert!(session.handle_frame(&brake(0x29)).is_empty());
        // Unrelated
        assert!(session.handle_frame(&Frame::new(0x555, vec![])).is_empty());

        let updates = session.handle_frame(&brake(0x28));
        assert_eq!(updates.len(), 1);
        assert!(!updates[0].matched);

        // Relevant non-match while already false: nothing to report
        assert!(session.handle_frame(&brake(0x28)).is_empty());

        let stats = session.stats();
        assert_eq!(stats.frames_seen, 5);
        assert_eq!(stats.relevant_evaluations, 4);
        assert_eq!(stats.state_changes, 2);
    }

    #[test]
    fn test_every_relevant_frame_notifications() {
        let mut session = session(NotifyPolicy::EveryRelevantFrame);

        // Relevant non-match from the initial state is still reported
        let updates = session.handle_frame(&brake(0x00));
        assert_eq!(updates.len(), 1);
        assert!(!updates[0].matched);
        assert!(!updates[0].changed);

        session.handle_frame(&brake(0x01));
        let updates = session.handle_frame(&brake(0x01));
        assert_eq!(updates.len(), 1);
        assert!(updates[0].matched);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut session = session(NotifyPolicy::OnChange);
        let before = session.snapshot();

        session.handle_frame(&Frame::new(0x123, vec![0x01]));

        assert_eq!(before.get("Door"), Some(&false));
        assert_eq!(session.snapshot().get("Door"), Some(&true));
    }

    #[test]
    fn test_reset() {
        let mut session = session(NotifyPolicy::OnChange);
        session.handle_frame(&brake(0x01));
        session.reset();

        assert_eq!(session.state("Brake"), Some(false));
        assert_eq!(session.stats().frames_seen, 0);
        assert_eq!(session.rules().len(), 2);
    }
}
