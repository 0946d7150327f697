// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_bare_digit_suffix() {
    let id = TaskId::parse("PS_000001_T24").unwrap();
    assert_eq!(id.as_str(), "PS_000001_T24");
}

#[test]
fn parses_letter_suffix() {
    let id = TaskId::parse("PS_000001_T7A").unwrap();
    assert_eq!(id.as_str(), "PS_000001_T7A");
}

#[test]
fn parses_word_suffix() {
    let id = TaskId::parse("PS_000001_T24_EVENTS").unwrap();
    assert_eq!(id.as_str(), "PS_000001_T24_EVENTS");
}

#[test]
fn normalizes_to_uppercase() {
    let id = TaskId::parse("ps_000001_t7a").unwrap();
    assert_eq!(id.as_str(), "PS_000001_T7A");
}

#[test]
fn rejects_simple_id() {
    assert!(TaskId::parse("T7").is_err());
}

#[test]
fn rejects_short_session_digits() {
    assert!(TaskId::parse("PS_001_T7").is_err());
}

#[test]
fn rejects_missing_task_digits() {
    assert!(TaskId::parse("PS_000001_TA").is_err());
}

#[test]
fn rejects_lowercase_suffix_word() {
    assert!(TaskId::parse("PS_000001_T24_events").is_err());
}

#[test]
fn session_id_derived_from_prefix() {
    let id = TaskId::parse("PS_000001_T24_EVENTS").unwrap();
    assert_eq!(id.session_id().as_str(), "PS_000001");
}

#[test]
fn equality_is_case_insensitive() {
    let id = TaskId::parse("PS_000001_T7A").unwrap();
    assert_eq!(id, *"ps_000001_t7a");
}

#[test]
fn task_status_succeeded_is_terminal() {
    assert!(TaskStatus::Succeeded.is_terminal());
    assert!(!TaskStatus::InProgress.is_terminal());
}

#[test]
fn record_failure_updates_previous_fix_summary() {
    let mut task = Task::new(
        TaskId::parse("PS_000001_T1").unwrap(),
        SessionId::new("PS_000001"),
        "do the thing",
        TaskType::Implementation,
        1_000,
    );
    task.record_failure(WorkflowId::new(), "hit a null pointer", 2_000);
    assert_eq!(task.previous_attempts.len(), 1);
    assert_eq!(task.previous_fix_summary.as_deref(), Some("hit a null pointer"));
}
