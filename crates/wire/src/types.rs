// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire DTOs layered on top of `oj-core` entities.
//!
//! Most entities (`Task`, `Workflow`, `PlanSession`, `Decision`,
//! `AgentPoolEntry`, `CoordinatorHistoryEntry`, ...) are already
//! serde-ready and travel over the wire unchanged — there is no separate
//! "wire DTO" for them. This module only adds the aggregate and
//! broadcast-event shapes that have no single entity counterpart.

use oj_core::{
    ArchivedWorkflow, CompletedWorkflowSummary, CoordinatorHistoryEntry, DecisionId, SessionId,
    SessionStatus, TaskId, WorkflowId, WorkflowStatus,
};
use serde::{Deserialize, Serialize};

/// A task's dependency edges, as surfaced by `deps.list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDependencyView {
    pub task_id: TaskId,
    pub dependencies: Vec<TaskId>,
    pub dependents: Vec<TaskId>,
}

/// Reply payload for `workflow.history`: the two sliding windows a session
/// accumulates (see [`oj_core::COORDINATOR_HISTORY_WINDOW`] /
/// [`oj_core::WORKFLOW_HISTORY_WINDOW`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowHistoryView {
    pub completed: Vec<CompletedWorkflowSummary>,
    pub archived: Vec<ArchivedWorkflow>,
}

/// Reply payload for `coordinator.history`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoordinatorHistoryView {
    pub entries: Vec<CoordinatorHistoryEntry>,
}

/// `{delivered: bool}` — the `agent.complete` handler's reply, routed through
/// `CompletionRendezvous`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionAck {
    pub delivered: bool,
}

/// Broadcasts pushed to subscribers outside any request/response pair.
/// Variant names serialize to the literal event names from the external
/// interface (`session.created`, `pool.changed`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "name", content = "payload")]
pub enum BroadcastEvent {
    #[serde(rename = "session.created")]
    SessionCreated { session_id: SessionId, created_at_ms: u64 },

    #[serde(rename = "session.updated")]
    SessionUpdated { session_id: SessionId, status: SessionStatus, updated_at_ms: u64 },

    #[serde(rename = "workflow.completed")]
    WorkflowCompleted {
        workflow_id: WorkflowId,
        session_id: SessionId,
        task_id: Option<TaskId>,
        terminal_status: WorkflowStatus,
        completed_at_ms: u64,
    },

    #[serde(rename = "workflow.event")]
    WorkflowEvent { workflow_id: WorkflowId, session_id: SessionId, phase: String, percentage: f32 },

    #[serde(rename = "workflows.cleaned")]
    WorkflowsCleaned { session_id: SessionId, removed_count: usize },

    #[serde(rename = "deps.list")]
    DepsList { session_id: SessionId, tasks: Vec<TaskDependencyView> },

    #[serde(rename = "user.questionAsked")]
    UserQuestionAsked { task_id: TaskId, decision_id: DecisionId, question: String },

    #[serde(rename = "pool.changed")]
    PoolChanged { before_available: usize, after_available: usize },
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
