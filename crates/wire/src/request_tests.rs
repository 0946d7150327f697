// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn category_and_action_splits_on_first_dot() {
    let req = Request::new("1", "taskAgent.assign", serde_json::json!({}));
    assert_eq!(req.category_and_action(), Some(("taskAgent", "assign")));
}

#[test]
fn category_and_action_is_none_without_a_dot() {
    let req = Request::new("1", "ping", serde_json::Value::Null);
    assert_eq!(req.category_and_action(), None);
}

#[test]
fn deserializes_missing_params_as_null() {
    let json = r#"{"id":"1","cmd":"system.ping"}"#;
    let req: Request = serde_json::from_str(json).expect("deserialize failed");
    assert_eq!(req.params, serde_json::Value::Null);
}

#[test]
fn command_category_round_trips_through_parse() {
    for cat in [
        CommandCategory::Session,
        CommandCategory::TaskAgent,
        CommandCategory::Coordinator,
        CommandCategory::User,
    ] {
        assert_eq!(CommandCategory::parse(cat.as_str()), Some(cat));
    }
}

#[test]
fn command_category_rejects_unknown_string() {
    assert_eq!(CommandCategory::parse("bogus"), None);
}
