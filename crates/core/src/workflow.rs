// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow entity: a typed state machine instance dispatched by the engine.
//!
//! A `Workflow` represents one run of a registered workflow type (task
//! implementation, error resolution, context gathering, plan revision, …)
//! against a session. Unlike a `Task`, a workflow is transient: it owns its
//! phase state and event subscriptions for its lifetime and is archived
//! shortly after completion.

use crate::session::SessionId;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a workflow instance.
    pub struct WorkflowId("wfl-");
}

/// A registered workflow type tag, with metadata governing dispatch rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    TaskImplementation,
    ErrorResolution,
    ContextGathering,
    PlanningRevision,
}

crate::simple_display! {
    WorkflowType {
        TaskImplementation => "task_implementation",
        ErrorResolution => "error_resolution",
        ContextGathering => "context_gathering",
        PlanningRevision => "planning_revision",
    }
}

impl WorkflowType {
    /// Whether dispatch must block until every dependency of the target task
    /// is `succeeded` before this type may start. Registry default is `true`;
    /// only revision/gathering workflows that intentionally run ahead of
    /// dependency completion should override it.
    pub fn requires_complete_dependencies(&self) -> bool {
        !matches!(self, WorkflowType::ContextGathering | WorkflowType::PlanningRevision)
    }
}

/// Terminal and non-terminal workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Blocked,
    Succeeded,
    Failed,
    Cancelled,
}

crate::simple_display! {
    WorkflowStatus {
        Pending => "pending",
        Running => "running",
        Blocked => "blocked",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl WorkflowStatus {
    /// W2: exactly one terminal transition per workflow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Succeeded | WorkflowStatus::Failed | WorkflowStatus::Cancelled)
    }
}

/// Progress snapshot reported by a running workflow instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowProgress {
    pub phase: String,
    pub phase_index: u32,
    pub percentage: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<std::path::PathBuf>,
}

/// Exclusivity of a declared task occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyKind {
    Exclusive,
    Shared,
}

/// `(workflowId, taskIds[], kind, reason)` — a workflow's claim on a set of tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOccupancy {
    pub workflow_id: WorkflowId,
    pub task_ids: Vec<TaskId>,
    pub kind: OccupancyKind,
    pub reason: String,
}

impl TaskOccupancy {
    /// Two occupancies conflict iff they share any task id and at least one is exclusive.
    pub fn conflicts_with(&self, other: &TaskOccupancy) -> bool {
        let shares_task = self.task_ids.iter().any(|t| other.task_ids.contains(t));
        shares_task && (self.kind == OccupancyKind::Exclusive || other.kind == OccupancyKind::Exclusive)
    }
}

/// How the engine should resolve a declared conflict against existing occupancies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    CancelOthers,
    WaitForOthers,
    AbortIfOccupied,
}

/// `(taskIds[], resolution, reason)` — raised by a workflow when it discovers
/// its wanted tasks are already occupied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConflict {
    pub task_ids: Vec<TaskId>,
    pub resolution: ConflictResolution,
    pub reason: String,
}

/// A workflow instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub workflow_type: WorkflowType,
    pub session: SessionId,
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub progress: WorkflowProgress,
    pub status: WorkflowStatus,
    /// Task occupancies declared by this workflow, by task id. Released on any
    /// terminal transition (W1).
    #[serde(default)]
    pub occupied_tasks: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Workflow {
    pub fn new(
        workflow_type: WorkflowType,
        session: SessionId,
        task_id: Option<TaskId>,
        epoch_ms: u64,
    ) -> Self {
        Self {
            id: WorkflowId::new(),
            workflow_type,
            session,
            config: HashMap::new(),
            progress: WorkflowProgress::default(),
            status: WorkflowStatus::Pending,
            occupied_tasks: Vec::new(),
            task_id,
            error: None,
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
