//! Frame Matching Engine
//!
//! Classifies a received frame against a signal rule in two steps:
//! 1. Identifier relevance (exact ID, or J1939 PGN for address-independent rules)
//! 2. Payload policy (exact bytes, byte range, or single bit)
//!
//! Every function here is pure. Frames are untrusted input of arbitrary
//! length, so out-of-bounds indices and length mismatches are a plain
//! non-match rather than an error.

use crate::rules::{MatchPolicy, Protocol, SignalRule};

/// Extract the J1939 Parameter Group Number from a 29-bit identifier
///
/// Keeps bits 8..=23 (`(identifier >> 8) & 0xFFFF`), dropping the source
/// address (bits 0-7) and priority (bits 26-28). Messages of the same
/// parameter group from different senders or priorities share a PGN.
#[inline]
pub const fn extract_pgn(identifier: u32) -> u16 {
    ((identifier >> 8) & 0xFFFF) as u16
}

/// Decide whether a frame identifier pertains to a rule
#[inline]
pub fn is_relevant(rule: &SignalRule, identifier: u32) -> bool {
    match rule.protocol {
        Protocol::Standard => identifier == rule.identifier,
        Protocol::J1939 => extract_pgn(identifier) == extract_pgn(rule.identifier),
    }
}

/// Apply a rule's payload policy, ignoring the identifier
pub fn matches_payload(policy: &MatchPolicy, payload: &[u8]) -> bool {
    match policy {
        MatchPolicy::Exact { expected_data } => payload == expected_data.as_slice(),
        MatchPolicy::Range {
            byte_index,
            min_value,
            max_value,
        } => payload
            .get(*byte_index)
            .is_some_and(|byte| (*min_value..=*max_value).contains(byte)),
        MatchPolicy::Bit {
            byte_index,
            bit_index,
            bit_value,
        } => payload
            .get(*byte_index)
            .is_some_and(|byte| extract_bit(*byte, *bit_index) == *bit_value),
    }
}

/// Evaluate a frame against a rule: relevance, then payload policy
///
/// Returns `false` when the identifier is not relevant. Callers that need
/// to tell "not relevant" apart from "relevant but no match" (the latch)
/// should call [`is_relevant`] first.
///
/// # Example
/// ```
/// use can_signal_matcher::{evaluate, Protocol, SignalRule};
///
/// let rule = SignalRule::range("Coolant", 0x18F00401, 3, 0x06, 0xFF)
///     .with_protocol(Protocol::J1939);
///
/// // Same PGN (0xF004), different priority and source address
/// assert!(evaluate(&rule, 0x0CF00400, &[0, 0, 0, 0x10, 0, 0, 0, 0]));
/// // Different PGN
/// assert!(!evaluate(&rule, 0x18F00501, &[0, 0, 0, 0x10, 0, 0, 0, 0]));
/// ```
pub fn evaluate(rule: &SignalRule, identifier: u32, payload: &[u8]) -> bool {
    is_relevant(rule, identifier) && matches_payload(&rule.policy, payload)
}

/// Extract one bit (0 = LSB); indices past bit 7 read as 0
#[inline]
fn extract_bit(byte: u8, bit_index: u8) -> u8 {
    byte.checked_shr(bit_index as u32).unwrap_or(0) & 0x01
}

#[cfg(test)]
mod tests {
    use super::*;

    const J1939_ID: u32 = 0x18F00401;

    fn frame_with_byte(index: usize, value: u8) -> Vec<u8> {
        let mut data = vec![0u8; 8];
        data[index] = value;
        data
    }

    #[test]
    fn test_extract_pgn() {
        assert_eq!(extract_pgn(0x18F00401), 0xF004);
        // Different source address
        assert_eq!(extract_pgn(0x18F00402), 0xF004);
        // Different priority
        assert_eq!(extract_pgn(0x1CF00401), 0xF004);
        assert_eq!(extract_pgn(0x0CF00400), 0xF004);
        assert_eq!(extract_pgn(0x18F00501), 0xF005);
        assert_eq!(extract_pgn(0x119), 0x0001);
    }

    #[test]
    fn test_standard_relevance_is_exact() {
        let rule = SignalRule::exact("Door", 0x119, vec![0x01]);
        assert!(is_relevant(&rule, 0x119));
        assert!(!is_relevant(&rule, 0x118));
        assert!(!is_relevant(&rule, 0x1119));
        assert!(!evaluate(&rule, 0x118, &[0x01]));
    }

    #[test]
    fn test_j1939_relevance_ignores_source_and_priority() {
        let rule = SignalRule::range("Coolant", J1939_ID, 3, 0x06, 0xFF)
            .with_protocol(Protocol::J1939);

        assert!(is_relevant(&rule, 0x18F00401));
        assert!(is_relevant(&rule, 0x18F004FE));
        assert!(is_relevant(&rule, 0x0CF00400));
        assert!(!is_relevant(&rule, 0x18F00501));
        assert!(!is_relevant(&rule, 0x18FEF101));
    }

    #[test]
    fn test_exact_policy() {
        let rule = SignalRule::exact("Door", 0x123, vec![0x01, 0x02, 0x03]);
        assert!(evaluate(&rule, 0x123, &[0x01, 0x02, 0x03]));
        assert!(!evaluate(&rule, 0x123, &[0x01, 0x02, 0x04]));
        assert!(!evaluate(&rule, 0x123, &[0x01, 0x02]));
        assert!(!evaluate(&rule, 0x123, &[0x01, 0x02, 0x03, 0x00]));
        assert!(!evaluate(&rule, 0x123, &[0x03, 0x02, 0x01]));

        let empty = SignalRule::exact("Empty", 0x123, vec![]);
        assert!(evaluate(&empty, 0x123, &[]));
        assert!(!evaluate(&empty, 0x123, &[0x00]));
    }

    #[test]
    fn test_range_policy_boundaries() {
        let rule = SignalRule::range("Speed", 0x200, 2, 0x10, 0x20);
        assert!(evaluate(&rule, 0x200, &frame_with_byte(2, 0x10)));
        assert!(evaluate(&rule, 0x200, &frame_with_byte(2, 0x18)));
        assert!(evaluate(&rule, 0x200, &frame_with_byte(2, 0x20)));
        assert!(!evaluate(&rule, 0x200, &frame_with_byte(2, 0x0F)));
        assert!(!evaluate(&rule, 0x200, &frame_with_byte(2, 0x21)));
    }

    #[test]
    fn test_range_policy_out_of_bounds() {
        let rule = SignalRule::range("Speed", 0x200, 7, 0x00, 0xFF);
        assert!(!evaluate(&rule, 0x200, &[0x00, 0x00]));
        assert!(!evaluate(&rule, 0x200, &[]));
        assert!(evaluate(&rule, 0x200, &[0u8; 8]));
    }

    #[test]
    fn test_range_policy_inverted_never_matches() {
        let rule = SignalRule::range("Inverted", 0x200, 0, 0x80, 0x10);
        for value in 0..=u8::MAX {
            assert!(!evaluate(&rule, 0x200, &[value]));
        }
    }

    #[test]
    fn test_bit_policy_scenario() {
        let rule = SignalRule::bit("Brake", 0x119, 3, 0, 1);
        assert!(evaluate(&rule, 0x119, &frame_with_byte(3, 0x29)));
        assert!(!evaluate(&rule, 0x119, &frame_with_byte(3, 0x28)));
        assert!(evaluate(&rule, 0x119, &frame_with_byte(3, 0xFF)));
        assert!(!evaluate(&rule, 0x119, &frame_with_byte(3, 0xFE)));
    }

    #[test]
    fn test_bit_policy_each_bit() {
        for bit in 0..8u8 {
            let expect_set = SignalRule::bit("Set", 0x119, 2, bit, 1);
            let expect_clear = SignalRule::bit("Clear", 0x119, 2, bit, 0);

            let set = frame_with_byte(2, 1 << bit);
            let cleared = frame_with_byte(2, !(1 << bit));

            assert!(evaluate(&expect_set, 0x119, &set), "bit {} set", bit);
            assert!(!evaluate(&expect_set, 0x119, &cleared), "bit {} cleared", bit);
            assert!(evaluate(&expect_clear, 0x119, &cleared), "bit {} cleared", bit);
            assert!(!evaluate(&expect_clear, 0x119, &set), "bit {} set", bit);
        }
    }

    #[test]
    fn test_bit_policy_out_of_bounds() {
        let rule = SignalRule::bit("Brake", 0x119, 3, 0, 1);
        assert!(!evaluate(&rule, 0x119, &[0xFF, 0xFF, 0xFF]));

        // Hand-built rule with an unreachable bit never panics
        let rule = SignalRule::bit("Wide", 0x119, 0, 12, 0);
        assert!(evaluate(&rule, 0x119, &[0xFF]));
    }

    #[test]
    fn test_j1939_range_scenario() {
        let rule = SignalRule::range("Coolant", J1939_ID, 3, 0x06, 0xFF)
            .with_protocol(Protocol::J1939);
        let payload = [0, 0, 0, 0x10, 0, 0, 0, 0];

        assert!(evaluate(&rule, 0x0CF00400, &payload));
        assert!(!evaluate(&rule, 0x18F00501, &payload));
        assert!(!evaluate(&rule, 0x0CF00400, &[0, 0, 0, 0x05, 0, 0, 0, 0]));
    }
}
