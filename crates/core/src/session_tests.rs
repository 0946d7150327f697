// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn session_id_display() {
    let id = SessionId::new("PS_000042");
    assert_eq!(id.to_string(), "PS_000042");
}

#[test]
fn session_id_equality() {
    let id1 = SessionId::new("PS_000001");
    let id2 = SessionId::new("PS_000001");
    let id3 = SessionId::new("PS_000002");

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn session_id_from_str() {
    let id: SessionId = "PS_000007".into();
    assert_eq!(id.as_str(), "PS_000007");
}

#[test]
fn session_id_serde() {
    let id = SessionId::new("PS_000009");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"PS_000009\"");

    let parsed: SessionId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn next_ids_are_zero_padded_and_increasing() {
    let a = SessionId::next();
    let b = SessionId::next();
    assert!(a.as_str().starts_with("PS_"));
    assert_eq!(a.as_str().len(), 9);
    assert_ne!(a, b);
}

#[test]
fn new_session_starts_with_no_plan() {
    let session = PlanSession::new(SessionId::new("PS_000001"), 1_000);
    assert_eq!(session.status, SessionStatus::NoPlan);
    assert!(!session.is_approved());
}

#[test]
fn only_approved_status_reports_approved() {
    let mut session = PlanSession::new(SessionId::new("PS_000001"), 1_000);
    session.status = SessionStatus::Approved;
    assert!(session.is_approved());
}
