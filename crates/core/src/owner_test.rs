// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::task::TaskId;
use crate::workflow::WorkflowId;
use crate::OwnerId;

#[test]
fn serializes_as_string() {
    let task = OwnerId::Task(TaskId::parse("PS_000001_T1").unwrap());
    assert_eq!(serde_json::to_string(&task).unwrap(), r#""task-PS_000001_T1""#);

    let wfl = OwnerId::Workflow(WorkflowId::from_string("wfl-xyz789"));
    assert_eq!(serde_json::to_string(&wfl).unwrap(), r#""wfl-xyz789""#);
}

#[test]
fn deserializes_from_string() {
    let owner: OwnerId = serde_json::from_str(r#""task-PS_000001_T1""#).unwrap();
    assert!(matches!(owner, OwnerId::Task(_)));

    let owner: OwnerId = serde_json::from_str(r#""wfl-run456""#).unwrap();
    assert!(matches!(owner, OwnerId::Workflow(_)));
}

#[test]
fn roundtrip() {
    let original = OwnerId::Task(TaskId::parse("PS_000001_T1").unwrap());
    let json = serde_json::to_string(&original).unwrap();
    let decoded: OwnerId = serde_json::from_str(&json).unwrap();
    assert_eq!(original, decoded);
}
