//! Latching display state
//!
//! Each rule name maps to a boolean that starts out `false` (no match). A
//! frame only touches the entries of rules it is relevant to; unrelated
//! traffic leaves every other entry exactly as it was.

use crate::matcher::{is_relevant, matches_payload};
use crate::rules::SignalRule;
use crate::types::{Frame, LatchUpdate, RuleName};
use std::collections::BTreeMap;

/// Owned copy of the latch state, in rule-name order
pub type LatchSnapshot = BTreeMap<RuleName, bool>;

/// Per-rule-name latch state for one monitoring session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatchMap {
    states: BTreeMap<RuleName, bool>,
}

impl LatchMap {
    /// Create an empty latch map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a latch map with every rule name set to `false`
    pub fn for_rules(rules: &[SignalRule]) -> Self {
        Self {
            states: rules.iter().map(|rule| (rule.name.clone(), false)).collect(),
        }
    }

    /// Current state of a rule, `None` if the name is unknown
    pub fn get(&self, name: &str) -> Option<bool> {
        self.states.get(name).copied()
    }

    /// Number of latched rule names
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True if no rule names are tracked
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Copy the current state for readers outside the frame-handling path
    pub fn snapshot(&self) -> LatchSnapshot {
        self.states.clone()
    }

    /// Put every entry back to `false`
    pub fn reset(&mut self) {
        self.states.values_mut().for_each(|state| *state = false);
    }

    /// Store a new value, returning true if it differs from the previous one
    ///
    /// Unknown names start from `false`.
    pub(crate) fn store(&mut self, name: &str, matched: bool) -> bool {
        match self.states.get_mut(name) {
            Some(state) => {
                let changed = *state != matched;
                *state = matched;
                changed
            }
            None => {
                self.states.insert(name.to_string(), matched);
                matched
            }
        }
    }
}

/// Apply one frame to the latch state, reporting every relevant rule
///
/// Rules are visited in order. Rules sharing a name share one entry, so
/// the last relevant one decides the stored value.
pub(crate) fn apply_frame(
    frame: &Frame,
    rules: &[SignalRule],
    state: &mut LatchMap,
) -> Vec<LatchUpdate> {
    rules
        .iter()
        .filter(|rule| is_relevant(rule, frame.identifier))
        .map(|rule| {
            let matched = matches_payload(&rule.policy, &frame.payload);
            let changed = state.store(&rule.name, matched);
            log::trace!(
                "{} -> {} (frame 0x{:X}{})",
                rule.name,
                matched,
                frame.identifier,
                if changed { ", changed" } else { "" }
            );
            LatchUpdate {
                name: rule.name.clone(),
                matched,
                changed,
            }
        })
        .collect()
}

/// Latch update entry point
///
/// Mutates `state` in place and returns `(name, matched)` for each rule
/// whose identifier was relevant to this frame. Rules that are not
/// relevant are not evaluated and keep their previous state.
///
/// # Example
/// ```
/// use can_signal_matcher::{on_frame, Frame, LatchMap, SignalRule};
///
/// let rules = vec![SignalRule::bit("Brake", 0x119, 3, 0, 1)];
/// let mut state = LatchMap::for_rules(&rules);
///
/// let updates = on_frame(&Frame::new(0x119, vec![0, 0, 0, 0x29]), &rules, &mut state);
/// assert_eq!(updates, vec![("Brake".to_string(), true)]);
///
/// // Unrelated traffic leaves the latch alone
/// let updates = on_frame(&Frame::new(0x200, vec![0; 8]), &rules, &mut state);
/// assert!(updates.is_empty());
/// assert_eq!(state.get("Brake"), Some(true));
/// ```
pub fn on_frame(
    frame: &Frame,
    rules: &[SignalRule],
    state: &mut LatchMap,
) -> Vec<(RuleName, bool)> {
    apply_frame(frame, rules, state)
        .into_iter()
        .map(|update| (update.name, update.matched))
        .collect()
}
