// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for `Event::log_summary()` and `Event::name()`.

use super::*;
use crate::agent::{AgentError, AgentId, AgentState};
use crate::owner::OwnerId;
use crate::task::TaskId;

#[test]
fn log_summary_agent_state_events() {
    let cases = vec![
        (
            Event::from_agent_state(
                AgentId::new("a1"),
                AgentState::Working,
                OwnerId::Task(TaskId::parse("PS_000001_T1").unwrap()),
            ),
            "agent:working agent=a1",
        ),
        (
            Event::from_agent_state(
                AgentId::new("a1"),
                AgentState::WaitingForInput,
                OwnerId::Task(TaskId::parse("PS_000001_T1").unwrap()),
            ),
            "agent:waiting agent=a1",
        ),
        (
            Event::from_agent_state(
                AgentId::new("a1"),
                AgentState::Failed(AgentError::RateLimited),
                OwnerId::Task(TaskId::parse("PS_000001_T1").unwrap()),
            ),
            "agent:failed agent=a1",
        ),
    ];

    for (event, expected) in cases {
        assert_eq!(event.log_summary(), expected, "failed for {:?}", event);
    }
}

#[test]
fn log_summary_agent_input() {
    let event = Event::AgentInput { agent_id: AgentId::new("a1"), input: "go".to_string() };
    assert_eq!(event.log_summary(), "agent:input agent=a1");
}

#[test]
fn log_summary_agent_idle() {
    let event = Event::AgentIdle { agent_id: AgentId::new("a1") };
    assert_eq!(event.log_summary(), "agent:idle agent=a1");
}

#[test]
fn log_summary_session_events() {
    let created = Event::SessionCreated {
        session_id: crate::session::SessionId::new("PS_000001"),
        created_at_ms: 1,
    };
    assert_eq!(created.log_summary(), "session:created id=PS_000001");

    let updated = Event::SessionUpdated {
        session_id: crate::session::SessionId::new("PS_000001"),
        status: crate::session::SessionStatus::Approved,
    };
    assert_eq!(updated.log_summary(), "session:updated id=PS_000001 status=approved");
}

#[test]
fn log_summary_workflow_events() {
    let workflow_id = crate::workflow::WorkflowId::from_string("wfl-abc123");
    let completed = Event::WorkflowCompleted {
        workflow_id,
        session_id: crate::session::SessionId::new("PS_000001"),
        status: crate::workflow::WorkflowStatus::Succeeded,
    };
    assert_eq!(
        completed.log_summary(),
        "workflow:completed id=wfl-abc123 session=PS_000001 status=succeeded"
    );
}

#[test]
fn log_summary_deps_list() {
    let event = Event::DepsList {
        task_id: TaskId::parse("PS_000001_T1").unwrap(),
        dependencies: vec![TaskId::parse("PS_000001_T2").unwrap()],
    };
    assert_eq!(event.log_summary(), "deps:list task=PS_000001_T1 count=1");
}

#[test]
fn log_summary_pool_changed() {
    let event = Event::PoolChanged { available: 2, resting: 1, allocated: 0, busy: 3 };
    assert_eq!(event.log_summary(), "pool:changed available=2 resting=1 allocated=0 busy=3");
}

#[test]
fn log_summary_shutdown_and_custom() {
    assert_eq!(Event::Shutdown.log_summary(), "system:shutdown");
    assert_eq!(Event::Custom.log_summary(), "custom");
}

#[test]
fn unknown_type_tag_deserializes_to_custom() {
    let event: Event = serde_json::from_str(r#"{"type":"something:unheard_of"}"#).unwrap();
    assert_eq!(event, Event::Custom);
}

#[test]
fn event_serde_roundtrip() {
    let event = Event::PoolChanged { available: 1, resting: 0, allocated: 1, busy: 0 };
    let json = serde_json::to_string(&event).unwrap();
    let parsed: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(event, parsed);
}
