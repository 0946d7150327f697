// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatches and tracks workflow instances (§4.3). Enforces the
//! at-most-one-workflow-per-task rule (case-insensitive compare on the
//! normalized global task id, guarded by a process-wide set of
//! workflow-start locks so two concurrent dispatches never both pass the
//! check) and the 5-minute archive grace after a terminal transition.

use crate::events::EventBroadcaster;
use crate::workflow::{WorkflowContext, WorkflowInstance, WorkflowRegistry};
use oj_core::{
    ArchivedWorkflow, CompletedWorkflowSummary, SessionId, TaskId, WorkflowStatus, WorkflowType,
    WORKFLOW_ARCHIVE_GRACE, WORKFLOW_HISTORY_WINDOW,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("task {0} already has a non-terminal workflow running")]
    TaskAlreadyHasWorkflow(TaskId),
    #[error("unregistered workflow type: {0}")]
    UnknownWorkflowType(WorkflowType),
}

struct StartLockGuard<'a> {
    engine: &'a WorkflowEngine,
    task_id: TaskId,
}

impl Drop for StartLockGuard<'_> {
    fn drop(&mut self) {
        self.engine.start_locks.lock().remove(&self.task_id);
    }
}

struct LiveWorkflow {
    instance: Box<dyn WorkflowInstance>,
    workflow_type: WorkflowType,
    session: SessionId,
    task_id: Option<TaskId>,
    started_at_ms: u64,
    terminal_at_ms: Option<u64>,
}

/// A handle returned from [`WorkflowEngine::start`] identifying the
/// dispatched instance.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowHandle {
    pub workflow_id: oj_core::WorkflowId,
}

pub struct WorkflowEngine {
    registry: WorkflowRegistry,
    events: std::sync::Arc<EventBroadcaster>,
    live: Mutex<HashMap<oj_core::WorkflowId, LiveWorkflow>>,
    archived: Mutex<HashMap<oj_core::WorkflowId, ArchivedWorkflow>>,
    history: Mutex<HashMap<SessionId, Vec<CompletedWorkflowSummary>>>,
    start_locks: Mutex<HashSet<TaskId>>,
}

impl WorkflowEngine {
    pub fn new(registry: WorkflowRegistry, events: std::sync::Arc<EventBroadcaster>) -> Self {
        Self {
            registry,
            events,
            live: Mutex::new(HashMap::new()),
            archived: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            start_locks: Mutex::new(HashSet::new()),
        }
    }

    pub fn registry(&self) -> &WorkflowRegistry {
        &self.registry
    }

    /// Dispatches a new workflow of `workflow_type` for `task_id` (if any),
    /// enforcing the at-most-one-workflow-per-task rule. The returned
    /// effects must be applied by the caller (typically the daemon's
    /// coordinator glue, which owns the agent pool and task store).
    pub fn start(
        &self,
        workflow_type: WorkflowType,
        session: SessionId,
        task_id: Option<TaskId>,
        now_ms: u64,
    ) -> Result<(WorkflowHandle, Vec<oj_core::Effect>), DispatchError> {
        let _guard = match &task_id {
            Some(id) => Some(self.start_lock(id)?),
            None => None,
        };

        let workflow_id = oj_core::WorkflowId::new();
        let mut instance = self
            .registry
            .create(workflow_type, workflow_id, task_id.clone())
            .ok_or(DispatchError::UnknownWorkflowType(workflow_type))?;

        let ctx = WorkflowContext { session: session.clone(), task_id: task_id.clone(), now_ms };
        let effects = instance.start(&ctx).unwrap_or_default();

        self.live.lock().insert(
            workflow_id,
            LiveWorkflow { instance, workflow_type, session, task_id, started_at_ms: now_ms, terminal_at_ms: None },
        );

        Ok((WorkflowHandle { workflow_id }, effects))
    }

    /// Acquires the process-wide start lock for `task_id`, checking the
    /// at-most-one-workflow rule while held so two concurrent dispatches
    /// for the same task can never both pass the check (§4.3). A racing
    /// second caller that finds the lock already held fails fast with the
    /// same error as finding a live workflow — from its perspective the
    /// outcome is identical, another dispatch got there first.
    fn start_lock(&self, task_id: &TaskId) -> Result<StartLockGuard<'_>, DispatchError> {
        if !self.start_locks.lock().insert(task_id.clone()) {
            return Err(DispatchError::TaskAlreadyHasWorkflow(task_id.clone()));
        }
        if self.has_non_terminal_workflow_for_task(task_id) {
            self.start_locks.lock().remove(task_id);
            return Err(DispatchError::TaskAlreadyHasWorkflow(task_id.clone()));
        }
        Ok(StartLockGuard { engine: self, task_id: task_id.clone() })
    }

    /// Case-insensitive compare on the normalized global id — `TaskId`
    /// already normalizes to uppercase on parse, so equality here is plain
    /// `Eq` (P9).
    fn has_non_terminal_workflow_for_task(&self, task_id: &TaskId) -> bool {
        self.live.lock().values().any(|w| {
            w.task_id.as_ref() == Some(task_id) && w.terminal_at_ms.is_none() && !w.instance.status().is_terminal()
        })
    }

    pub fn agent_role_needed(&self, workflow_id: oj_core::WorkflowId) -> Option<oj_core::RoleId> {
        self.live.lock().get(&workflow_id).and_then(|w| w.instance.agent_role_needed().cloned())
    }

    pub fn agent_allocated(&self, workflow_id: oj_core::WorkflowId, agent: oj_core::AgentName, now_ms: u64) -> Vec<oj_core::Effect> {
        let mut live = self.live.lock();
        let Some(workflow) = live.get_mut(&workflow_id) else { return Vec::new() };
        let ctx = WorkflowContext { session: workflow.session.clone(), task_id: workflow.task_id.clone(), now_ms };
        workflow.instance.agent_allocated(&ctx, agent)
    }

    /// Delivers an external completion callback to the owning workflow,
    /// applying any resulting terminal-transition bookkeeping.
    pub fn handle_event_response(
        &self,
        workflow_id: oj_core::WorkflowId,
        event_type: &str,
        payload: serde_json::Value,
        now_ms: u64,
    ) -> Vec<oj_core::Effect> {
        let mut live = self.live.lock();
        let Some(workflow) = live.get_mut(&workflow_id) else { return Vec::new() };
        let ctx = WorkflowContext { session: workflow.session.clone(), task_id: workflow.task_id.clone(), now_ms };
        let effects = workflow.instance.handle_workflow_event_response(&ctx, event_type, payload).unwrap_or_default();
        let status = workflow.instance.status();
        drop(live);
        if status.is_terminal() {
            self.finish(workflow_id, status, now_ms);
        }
        effects
    }

    pub fn cancel(&self, workflow_id: oj_core::WorkflowId, now_ms: u64) -> Vec<oj_core::Effect> {
        let mut live = self.live.lock();
        let Some(workflow) = live.get_mut(&workflow_id) else { return Vec::new() };
        let ctx = WorkflowContext { session: workflow.session.clone(), task_id: workflow.task_id.clone(), now_ms };
        let effects = workflow.instance.cancel(&ctx);
        drop(live);
        self.finish(workflow_id, WorkflowStatus::Cancelled, now_ms);
        effects
    }

    /// Terminal-transition bookkeeping (§4.3): dispose, record the summary
    /// on the session's sliding window, and mark it for archive eviction.
    fn finish(&self, workflow_id: oj_core::WorkflowId, status: WorkflowStatus, now_ms: u64) {
        let mut live = self.live.lock();
        let Some(workflow) = live.get_mut(&workflow_id) else { return };
        workflow.instance.dispose();
        workflow.terminal_at_ms = Some(now_ms);

        let summary = CompletedWorkflowSummary {
            workflow_id,
            workflow_type: workflow.workflow_type,
            terminal_status: status,
            task_id: workflow.task_id.clone(),
            started_at_ms: workflow.started_at_ms,
            completed_at_ms: now_ms,
            error: None,
            output: None,
            log_path: None,
        };
        let session = workflow.session.clone();
        drop(live);

        self.events.emit(oj_core::Event::WorkflowCompleted { workflow_id, session_id: session.clone(), status });

        let mut history = self.history.lock();
        let entries = history.entry(session).or_default();
        oj_core::push_bounded(entries, summary, WORKFLOW_HISTORY_WINDOW);
    }

    /// Evicts every live workflow whose archive grace has elapsed,
    /// replacing its record with an [`ArchivedWorkflow`]. Must be driven
    /// periodically by the caller (e.g. the idle monitor's tick).
    pub fn sweep_archive(&self, now_ms: u64) {
        let grace_ms = WORKFLOW_ARCHIVE_GRACE.as_millis() as u64;
        let mut live = self.live.lock();
        let expired: Vec<oj_core::WorkflowId> = live
            .iter()
            .filter(|(_, w)| w.terminal_at_ms.map(|t| now_ms.saturating_sub(t) >= grace_ms).unwrap_or(false))
            .map(|(id, _)| *id)
            .collect();
        let mut archived = self.archived.lock();
        for id in expired {
            if let Some(workflow) = live.remove(&id) {
                let terminal_at_ms = workflow.terminal_at_ms.unwrap_or(now_ms);
                archived.insert(
                    id,
                    ArchivedWorkflow {
                        id,
                        workflow_type: workflow.workflow_type,
                        terminal_status: workflow.instance.status(),
                        task_id: workflow.task_id.clone(),
                        created_at_ms: workflow.started_at_ms,
                        completed_at_ms: terminal_at_ms,
                        archived_at_ms: now_ms,
                    },
                );
            }
        }
    }

    /// `getStatus`/`getProgress` lookup: live object during grace, archived
    /// stub afterward, `None` if never dispatched.
    pub fn status(&self, workflow_id: oj_core::WorkflowId) -> Option<WorkflowStatus> {
        if let Some(w) = self.live.lock().get(&workflow_id) {
            return Some(w.instance.status());
        }
        self.archived.lock().get(&workflow_id).map(|a| a.terminal_status)
    }

    pub fn history(&self, session: &SessionId) -> Vec<CompletedWorkflowSummary> {
        self.history.lock().get(session).cloned().unwrap_or_default()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    /// Phase/progress detail for a still-live workflow. `None` once the
    /// workflow has been archived — at that point its phase history is no
    /// longer interesting, only its terminal outcome (see [`Self::status`]).
    pub fn progress(&self, workflow_id: oj_core::WorkflowId) -> Option<oj_core::WorkflowProgress> {
        self.live.lock().get(&workflow_id).map(|w| w.instance.progress())
    }

    /// Snapshot of every still-live workflow belonging to `session`, for the
    /// "active workflows" section of a coordinator evaluation's input.
    pub fn live_for_session(&self, session: &SessionId) -> Vec<LiveWorkflowSummary> {
        self.live
            .lock()
            .iter()
            .filter(|(_, w)| &w.session == session)
            .map(|(id, w)| LiveWorkflowSummary {
                workflow_id: *id,
                workflow_type: w.workflow_type,
                task_id: w.task_id.clone(),
                status: w.instance.status(),
                progress: w.instance.progress(),
            })
            .collect()
    }
}

/// Read-only view of a live workflow, used to describe "active workflows"
/// without handing out the boxed [`WorkflowInstance`] itself.
#[derive(Debug, Clone)]
pub struct LiveWorkflowSummary {
    pub workflow_id: oj_core::WorkflowId,
    pub workflow_type: WorkflowType,
    pub task_id: Option<TaskId>,
    pub status: WorkflowStatus,
    pub progress: oj_core::WorkflowProgress,
}

#[cfg(test)]
#[path = "workflow_engine_tests.rs"]
mod tests;
