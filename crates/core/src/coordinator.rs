// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator and workflow history entities: the bounded, persisted ledgers
//! a [`crate::session::PlanSession`] accumulates as the coordinator evaluates
//! and workflows complete.
//!
//! Both windows are sliding: oldest entries are dropped once the cap is hit
//! (P6). The caps are deliberately small constants rather than config, since
//! they bound worst-case memory and file size regardless of session age.

use crate::task::TaskId;
use crate::workflow::{WorkflowId, WorkflowStatus, WorkflowType};
use serde::{Deserialize, Serialize};

/// Cap on [`CoordinatorHistoryEntry`] entries retained per session (P6).
pub const COORDINATOR_HISTORY_WINDOW: usize = 50;

/// Cap on [`CompletedWorkflowSummary`] entries retained per session (P6).
pub const WORKFLOW_HISTORY_WINDOW: usize = 100;

/// Grace period a completed workflow's live object stays resolvable before
/// being replaced with an [`ArchivedWorkflow`] stub.
pub const WORKFLOW_ARCHIVE_GRACE: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// Max length of the `reasoning` field, truncated at evaluation time.
pub const REASONING_MAX_CHARS: usize = 500;

/// Outcome recorded against a dispatched task, once its workflow completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub completed_at_ms: u64,
}

/// One coordinator evaluation's record: what triggered it, what it decided,
/// and (once known) what happened as a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorHistoryEntry {
    pub timestamp_ms: u64,
    /// Short human-readable summary of the triggering event (or batch).
    pub triggering_event: String,
    /// `REASONING:` block from the model output, truncated to
    /// [`REASONING_MAX_CHARS`].
    pub reasoning: String,
    /// `CONFIDENCE:` float parsed from the model output, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Task ids the model's tool calls dispatched during this evaluation.
    ///
    /// Always empty under the side-effecting CLI-command path (the model
    /// issues `apc task start` itself rather than returning a dispatch list);
    /// retained so coordinator history remains legible even though outcome
    /// annotation against it is effectively dead under that path.
    #[serde(default)]
    pub dispatched_tasks: Vec<TaskId>,
    #[serde(default)]
    pub dispatched_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DispatchOutcome>,
}

impl CoordinatorHistoryEntry {
    pub fn new(timestamp_ms: u64, triggering_event: impl Into<String>, reasoning: impl Into<String>) -> Self {
        let reasoning: String = reasoning.into();
        let reasoning = reasoning.chars().take(REASONING_MAX_CHARS).collect();
        Self {
            timestamp_ms,
            triggering_event: triggering_event.into(),
            reasoning,
            confidence: None,
            dispatched_tasks: Vec::new(),
            dispatched_count: 0,
            outcome: None,
        }
    }
}

/// Push `entry` onto a sliding-window history vector, evicting the oldest
/// entry once `cap` is exceeded (P6: eviction removes oldest).
pub fn push_bounded<T>(history: &mut Vec<T>, entry: T, cap: usize) {
    history.push(entry);
    if history.len() > cap {
        let overflow = history.len() - cap;
        history.drain(0..overflow);
    }
}

/// A terminal workflow's summary, appended to the session's workflow history
/// the moment the workflow reaches a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWorkflowSummary {
    pub workflow_id: WorkflowId,
    pub workflow_type: WorkflowType,
    pub terminal_status: WorkflowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub started_at_ms: u64,
    pub completed_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<std::path::PathBuf>,
}

/// Lightweight replacement for a completed workflow's runtime object, installed
/// [`WORKFLOW_ARCHIVE_GRACE`] after its terminal transition. Lookups against an
/// archived workflow return a `not_found` progress snapshot rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedWorkflow {
    pub id: WorkflowId,
    pub workflow_type: WorkflowType,
    pub terminal_status: WorkflowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub created_at_ms: u64,
    pub completed_at_ms: u64,
    pub archived_at_ms: u64,
}

impl From<&CompletedWorkflowSummary> for ArchivedWorkflow {
    fn from(s: &CompletedWorkflowSummary) -> Self {
        Self {
            id: s.workflow_id,
            workflow_type: s.workflow_type,
            terminal_status: s.terminal_status,
            task_id: s.task_id.clone(),
            created_at_ms: s.started_at_ms,
            completed_at_ms: s.completed_at_ms,
            archived_at_ms: s.completed_at_ms,
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
