// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::AgentId;
use crate::session::SessionId;

#[test]
fn timer_id_display() {
    let id = TimerId::from_string("test-timer");
    assert_eq!(id.to_string(), "test-timer");
}

#[test]
fn timer_id_equality() {
    let id1 = TimerId::from_string("timer-1");
    let id2 = TimerId::from_string("timer-1");
    let id3 = TimerId::from_string("timer-2");

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn timer_id_from_str() {
    let id: TimerId = "test".into();
    assert_eq!(id.as_str(), "test");
}

#[test]
fn timer_id_serde() {
    let id = TimerId::from_string("my-timer");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"my-timer\"");

    let parsed: TimerId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn factory_methods_format() {
    assert_eq!(TimerId::agent_rest(&AgentId::new("agt-123")).as_str(), "agent-rest:agt-123");
    assert_eq!(
        TimerId::coordinator_fire(&SessionId::new("PS_000001")).as_str(),
        "coordinator-fire:PS_000001"
    );
}

#[test]
fn kind_unknown_returns_none() {
    assert!(TimerId::from_string("other-timer").kind().is_none());
}

#[test]
fn timer_kind_parse_unknown_returns_none() {
    assert!(TimerKind::parse("other-timer").is_none());
    assert!(TimerKind::parse("").is_none());
    assert!(TimerKind::parse("unknown:foo").is_none());
}

#[test]
fn timer_kind_round_trip_all_factory_methods() {
    let cases = vec![
        TimerId::agent_rest(&AgentId::new("agt-1")),
        TimerId::agent_rest(&AgentId::new("agt-2")),
        TimerId::coordinator_fire(&SessionId::new("PS_000001")),
        TimerId::coordinator_fire(&SessionId::new("PS_000002")),
    ];

    for timer_id in &cases {
        let kind = TimerKind::parse(timer_id.as_str())
            .unwrap_or_else(|| panic!("failed to parse: {}", timer_id));
        let round_tripped = kind.to_timer_id();
        assert_eq!(timer_id, &round_tripped, "round-trip failed for: {}", timer_id);
    }
}
