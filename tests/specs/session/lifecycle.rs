//! Session lifecycle specs (§3, §4.6): create -> plan.setPath -> approve,
//! plus cancel/pause/resume/complete gating.

use crate::prelude::*;

#[test]
fn session_create_starts_at_no_plan() {
    let ws = Workspace::new();
    ws.start_daemon();

    let created = ws.oj(&["session", "create"]).passes().json();
    assert_eq!(created["status"], "no_plan");
    assert!(created["id"].as_str().unwrap().starts_with("PS_"));

    ws.stop_daemon();
}

#[test]
fn approve_without_a_plan_fails() {
    let ws = Workspace::new();
    ws.start_daemon();

    let created = ws.oj(&["session", "create"]).passes().json();
    let session = created["id"].as_str().unwrap().to_string();

    ws.oj(&["session", "approve", &session]).fails().stderr_has("no plan");

    ws.stop_daemon();
}

#[test]
fn set_plan_path_moves_session_to_reviewing_then_approve_succeeds() {
    let ws = Workspace::new();
    ws.start_daemon();

    let created = ws.oj(&["session", "create"]).passes().json();
    let session = created["id"].as_str().unwrap().to_string();

    let after_path = ws.oj(&["plan", "set-path", &session, "plan.md"]).passes().json();
    assert_eq!(after_path["status"], "reviewing");

    let approved = ws.oj(&["session", "approve", &session]).passes().json();
    assert_eq!(approved["status"], "approved");

    let status = ws.oj(&["session", "status", &session]).passes().json();
    assert_eq!(status["status"], "approved");

    ws.stop_daemon();
}

#[test]
fn complete_session_refuses_unless_approved() {
    let ws = Workspace::new();
    ws.start_daemon();

    let created = ws.oj(&["session", "create"]).passes().json();
    let session = created["id"].as_str().unwrap().to_string();

    ws.oj(&["session", "complete", &session]).fails().stderr_has("not approved");

    ws.oj(&["plan", "set-path", &session, "plan.md"]).passes();
    ws.oj(&["session", "approve", &session]).passes();
    ws.oj(&["session", "complete", &session]).passes().stdout_has("completed");

    ws.stop_daemon();
}

#[test]
fn cancel_session_is_accepted_regardless_of_status() {
    let ws = Workspace::new();
    ws.start_daemon();

    let created = ws.oj(&["session", "create"]).passes().json();
    let session = created["id"].as_str().unwrap().to_string();

    ws.oj(&["session", "cancel", &session]).passes().stdout_has("cancelled");

    ws.stop_daemon();
}

#[test]
fn pause_then_resume_evaluations_round_trips() {
    let ws = Workspace::new();
    ws.start_daemon();

    let session = ws.approved_session();

    ws.oj(&["session", "pause", &session, "--reason", "manual pause"]).passes();
    ws.oj(&["session", "resume", &session]).passes();

    ws.stop_daemon();
}
