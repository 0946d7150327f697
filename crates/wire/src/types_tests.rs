// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn pool_changed_serializes_with_event_name_tag() {
    let event = BroadcastEvent::PoolChanged { before_available: 1, after_available: 2 };
    let json = serde_json::to_value(&event).expect("serialize failed");
    assert_eq!(json["name"], "pool.changed");
    assert_eq!(json["payload"]["before_available"], 1);
}

#[test]
fn user_question_asked_round_trips() {
    let event = BroadcastEvent::UserQuestionAsked {
        task_id: TaskId::parse("PS_000001_T1").expect("valid task id"),
        decision_id: DecisionId::new(),
        question: "which approach?".to_string(),
    };
    let json = serde_json::to_string(&event).expect("serialize failed");
    let back: BroadcastEvent = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(back, event);
}
