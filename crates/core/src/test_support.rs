// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::agent::AgentId;
use crate::event::{Event, QuestionData};
use crate::owner::OwnerId;
use crate::session::SessionId;
use crate::task::TaskId;
use crate::workflow::{WorkflowId, WorkflowStatus};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::task::TaskStatus;
    use crate::workflow::WorkflowStatus;
    use proptest::prelude::*;

    pub fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::Created),
            Just(TaskStatus::Ready),
            Just(TaskStatus::Blocked),
            Just(TaskStatus::InProgress),
            Just(TaskStatus::AwaitingDecision),
            Just(TaskStatus::Succeeded),
        ]
    }

    pub fn arb_workflow_status() -> impl Strategy<Value = WorkflowStatus> {
        prop_oneof![
            Just(WorkflowStatus::Pending),
            Just(WorkflowStatus::Running),
            Just(WorkflowStatus::Blocked),
            Just(WorkflowStatus::Succeeded),
            Just(WorkflowStatus::Failed),
            Just(WorkflowStatus::Cancelled),
        ]
    }
}

// ── Event factory functions ─────────────────────────────────────────────────

pub fn session_created_event(session_id: &str) -> Event {
    Event::SessionCreated { session_id: SessionId::new(session_id), created_at_ms: 1_000_000 }
}

pub fn session_updated_event(session_id: &str, status: crate::session::SessionStatus) -> Event {
    Event::SessionUpdated { session_id: SessionId::new(session_id), status }
}

pub fn workflow_completed_event(
    workflow_id: &str,
    session_id: &str,
    status: WorkflowStatus,
) -> Event {
    Event::WorkflowCompleted {
        workflow_id: WorkflowId::from_string(workflow_id),
        session_id: SessionId::new(session_id),
        status,
    }
}

pub fn workflow_event_event(workflow_id: &str, event_type: &str) -> Event {
    Event::WorkflowEvent {
        workflow_id: WorkflowId::from_string(workflow_id),
        event_type: event_type.to_string(),
        payload: serde_json::json!({}),
    }
}

pub fn deps_list_event(task_id: &str, dependencies: &[&str]) -> Event {
    Event::DepsList {
        task_id: TaskId::parse(task_id).unwrap(),
        dependencies: dependencies.iter().map(|d| TaskId::parse(d).unwrap()).collect(),
    }
}

pub fn user_question_asked_event(task_id: &str, question_text: &str) -> Event {
    Event::UserQuestionAsked {
        task_id: TaskId::parse(task_id).unwrap(),
        question: QuestionData {
            questions: vec![crate::event::QuestionEntry {
                question: question_text.to_string(),
                header: None,
                options: vec![],
                multi_select: false,
            }],
        },
    }
}

pub fn pool_changed_event(available: usize, resting: usize, allocated: usize, busy: usize) -> Event {
    Event::PoolChanged { available, resting, allocated, busy }
}

pub fn agent_spawned_event(agent_id: &str, task_id: &str) -> Event {
    Event::AgentWorking {
        agent_id: AgentId::new(agent_id),
        owner: OwnerId::Task(TaskId::parse(task_id).unwrap()),
    }
}
