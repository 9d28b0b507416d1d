// End-to-end scenarios: raw JSON rules through a monitoring session
use can_signal_matcher::{
    on_frame, validate_rules, Frame, LatchMap, MonitorSession, NotifyPolicy, SessionConfig,
};
use serde_json::{json, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn configuration_signals() -> Vec<Value> {
    json!([
        {
            "name": "Brake Pedal",
            "can_id": "0x119",
            "match_type": "bit",
            "byte_index": 3,
            "bit_index": 0,
            "bit_value": 1
        },
        {
            "name": "Coolant Temp",
            "can_id": "0x18F00401",
            "protocol": "j1939",
            "match_type": "range",
            "byte_index": 3,
            "min_value": "0x06",
            "max_value": "0xFF"
        },
        {
            "name": "Door Open",
            "can_id": 291,
            "match_type": "exact",
            "data": ["0x01", "0x00", 255]
        }
    ])
    .as_array()
    .cloned()
    .unwrap()
}

#[test]
fn test_latching_across_mixed_traffic() {
    init_logging();
    let rules = validate_rules(&configuration_signals()).unwrap();
    let mut state = LatchMap::for_rules(&rules);

    let updates = on_frame(
        &Frame::new(0x0CF00400, vec![0, 0, 0, 0x10, 0, 0, 0, 0]),
        &rules,
        &mut state,
    );
    assert_eq!(updates, vec![("Coolant Temp".to_string(), true)]);

    // Different PGN: no state change
    let updates = on_frame(&Frame::new(0x18F00501, vec![0; 8]), &rules, &mut state);
    assert!(updates.is_empty());
    assert_eq!(state.get("Coolant Temp"), Some(true));

    on_frame(&Frame::new(0x119, vec![0, 0, 0, 0x29, 0, 0, 0, 0]), &rules, &mut state);
    on_frame(&Frame::new(0x123, vec![0x01, 0x00, 0xFF]), &rules, &mut state);

    let snapshot = state.snapshot();
    assert_eq!(snapshot.get("Brake Pedal"), Some(&true));
    assert_eq!(snapshot.get("Door Open"), Some(&true));
    assert_eq!(snapshot.get("Coolant Temp"), Some(&true));

    on_frame(&Frame::new(0x119, vec![0, 0, 0, 0x28, 0, 0, 0, 0]), &rules, &mut state);
    assert_eq!(state.get("Brake Pedal"), Some(false));
    assert_eq!(state.get("Door Open"), Some(true));
}

#[test]
fn test_session_reports_only_changes() {
    init_logging();
    let rules = validate_rules(&configuration_signals()).unwrap();
    let mut session = MonitorSession::new(rules, SessionConfig::new());

    let frames = [
        Frame::new(0x119, vec![0, 0, 0, 0x29, 0, 0, 0, 0]), // Brake on
        Frame::new(0x119, vec![0, 0, 0, 0x29, 0, 0, 0, 0]), // Brake still on
        Frame::new(0x300, vec![0x01]),                      // unrelated
        Frame::new(0x119, vec![0, 0, 0, 0x28, 0, 0, 0, 0]), // Brake off
        Frame::new(0x123, vec![0x01, 0x00]),                // Door, short payload
    ];

    let reported: Vec<(String, bool)> = frames
        .iter()
        .flat_map(|frame| session.handle_frame(frame))
        .map(|update| (update.name, update.matched))
        .collect();

    assert_eq!(
        reported,
        vec![
            ("Brake Pedal".to_string(), true),
            ("Brake Pedal".to_string(), false),
        ]
    );
    assert_eq!(session.stats().frames_seen, 5);
    assert_eq!(session.stats().relevant_evaluations, 4);
}

#[test]
fn test_session_every_relevant_frame() {
    init_logging();
    let rules = validate_rules(&configuration_signals()).unwrap();
    let config = SessionConfig::new().with_notify(NotifyPolicy::EveryRelevantFrame);
    let mut session = MonitorSession::new(rules, config);

    let updates = session.handle_frame(&Frame::new(0x123, vec![0x01, 0x00]));
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].name, "Door Open");
    assert!(!updates[0].matched);
    assert!(!updates[0].changed);
}

#[test]
fn test_invalid_configuration_rejected() {
    init_logging();
    let mut signals = configuration_signals();
    signals[1].as_object_mut().unwrap().remove("max_value");

    let err = validate_rules(&signals).unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.name.as_deref(), Some("Coolant Temp"));
}
