// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authoritative task repository: dependency graph, occupancy/conflict
//! bookkeeping, and lifecycle hooks, all serialized through one
//! [`parking_lot::Mutex`] per session (§4.2 — "per-session serialization is
//! sufficient; no task belongs to more than one session, so two sessions'
//! dependency recomputation never contends").

use oj_core::{OccupancyKind, SessionId, Task, TaskId, TaskOccupancy, TaskStatus, WorkflowId};
use oj_storage::TaskStoreFile;
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskStoreError {
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
    #[error("dependency would create a cycle: {0} -> {1}")]
    DependencyCycle(TaskId, TaskId),
}

/// A conflicting occupancy found by [`TaskStore::check_conflicts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    pub task_id: TaskId,
    pub occupying_workflow: WorkflowId,
}

/// A workflow parked waiting for other workflows to release tasks it wants.
#[derive(Debug, Clone)]
pub struct WaitingConflict {
    pub workflow_id: WorkflowId,
    pub wanted_tasks: Vec<TaskId>,
    pub blocking_workflows: Vec<WorkflowId>,
}

#[derive(Default)]
struct SessionTables {
    file: TaskStoreFile,
    occupancies: Vec<TaskOccupancy>,
    waiters: Vec<WaitingConflict>,
}

pub struct TaskStore {
    sessions: Mutex<HashMap<SessionId, SessionTables>>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()) }
    }

    /// Load (or replace) a session's task set, e.g. from `tasks.json` at startup.
    pub fn load_session(&self, session: SessionId, file: TaskStoreFile) {
        let mut sessions = self.sessions.lock();
        sessions.entry(session).or_default().file = file;
    }

    /// Export the current snapshot for a session, for writing back to disk.
    pub fn snapshot_session(&self, session: &SessionId) -> Option<TaskStoreFile> {
        self.sessions.lock().get(session).map(|t| t.file.clone())
    }

    pub fn upsert_task(&self, task: Task) {
        let mut sessions = self.sessions.lock();
        let table = sessions.entry(task.session.clone()).or_default();
        table.file.upsert(task);
        Self::recompute_dependents(table);
    }

    pub fn get_task(&self, session: &SessionId, id: &TaskId) -> Option<Task> {
        self.sessions.lock().get(session).and_then(|t| t.file.get(id)).cloned()
    }

    fn recompute_dependents(table: &mut SessionTables) {
        let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for task in &table.file.tasks {
            for dep in &task.dependencies {
                dependents.entry(dep.clone()).or_default().push(task.id.clone());
            }
        }
        for task in &mut table.file.tasks {
            task.dependents = dependents.remove(&task.id).unwrap_or_default();
        }
    }

    /// Adds `dep` as a dependency of `id`, rejecting the edge if it would
    /// create a cycle (DFS from `dep` back to `id`).
    pub fn add_dependency(&self, session: &SessionId, id: &TaskId, dep: TaskId) -> Result<(), TaskStoreError> {
        let mut sessions = self.sessions.lock();
        let table = sessions.get_mut(session).ok_or_else(|| TaskStoreError::UnknownSession(session.clone()))?;
        if !table.file.tasks.iter().any(|t| &t.id == id) {
            return Err(TaskStoreError::UnknownTask(id.clone()));
        }
        if Self::reaches(&table.file, &dep, id) {
            return Err(TaskStoreError::DependencyCycle(id.clone(), dep));
        }
        if let Some(task) = table.file.get_mut(id) {
            if !task.dependencies.contains(&dep) {
                task.dependencies.push(dep);
            }
        }
        Self::recompute_dependents(table);
        Ok(())
    }

    pub fn remove_dependency(&self, session: &SessionId, id: &TaskId, dep: &TaskId) -> Result<(), TaskStoreError> {
        let mut sessions = self.sessions.lock();
        let table = sessions.get_mut(session).ok_or_else(|| TaskStoreError::UnknownSession(session.clone()))?;
        if let Some(task) = table.file.get_mut(id) {
            task.dependencies.retain(|d| d != dep);
        }
        Self::recompute_dependents(table);
        Ok(())
    }

    /// Does a path exist from `from` to `to` following `dependencies` edges?
    fn reaches(file: &TaskStoreFile, from: &TaskId, to: &TaskId) -> bool {
        if from == to {
            return true;
        }
        let mut stack = vec![from.clone()];
        let mut seen = std::collections::HashSet::new();
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur.clone()) {
                continue;
            }
            let Some(task) = file.get(&cur) else { continue };
            for dep in &task.dependencies {
                if dep == to {
                    return true;
                }
                stack.push(dep.clone());
            }
        }
        false
    }

    pub fn dependencies(&self, session: &SessionId, id: &TaskId) -> Vec<TaskId> {
        self.sessions
            .lock()
            .get(session)
            .and_then(|t| t.file.get(id))
            .map(|t| t.dependencies.clone())
            .unwrap_or_default()
    }

    pub fn dependents(&self, session: &SessionId, id: &TaskId) -> Vec<TaskId> {
        self.sessions
            .lock()
            .get(session)
            .and_then(|t| t.file.get(id))
            .map(|t| t.dependents.clone())
            .unwrap_or_default()
    }

    /// All tasks in `session` whose every dependency has succeeded (I1).
    pub fn get_ready(&self, session: &SessionId) -> Vec<TaskId> {
        let sessions = self.sessions.lock();
        let Some(table) = sessions.get(session) else { return Vec::new() };
        table
            .file
            .tasks
            .iter()
            .filter(|t| {
                !t.is_terminal()
                    && t.dependencies.iter().all(|dep| {
                        table.file.get(dep).map(|d| d.status == TaskStatus::Succeeded).unwrap_or(false)
                    })
            })
            .map(|t| t.id.clone())
            .collect()
    }

    /// Idempotent recompute of the `ready`/`blocked` status flag. Must run
    /// before any coordinator evaluation (§4.2).
    pub fn update_ready_tasks(&self, session: &SessionId) {
        let mut sessions = self.sessions.lock();
        let Some(table) = sessions.get_mut(session) else { return };
        let ready_ids: std::collections::HashSet<TaskId> = table
            .file
            .tasks
            .iter()
            .filter(|t| {
                !t.is_terminal()
                    && t.dependencies.iter().all(|dep| {
                        table.file.get(dep).map(|d| d.status == TaskStatus::Succeeded).unwrap_or(false)
                    })
            })
            .map(|t| t.id.clone())
            .collect();
        for task in &mut table.file.tasks {
            if task.is_terminal() || task.status == TaskStatus::InProgress || task.status == TaskStatus::AwaitingDecision {
                continue;
            }
            task.status = if ready_ids.contains(&task.id) { TaskStatus::Ready } else { TaskStatus::Blocked };
        }
    }

    pub fn declare_occupancy(
        &self,
        session: &SessionId,
        workflow_id: WorkflowId,
        task_ids: Vec<TaskId>,
        kind: OccupancyKind,
        reason: impl Into<String>,
    ) {
        let mut sessions = self.sessions.lock();
        let table = sessions.entry(session.clone()).or_default();
        table.occupancies.push(TaskOccupancy { workflow_id, task_ids, kind, reason: reason.into() });
    }

    /// Releases occupancies for `workflow_id`; if `task_ids` is `Some`, only
    /// the named tasks are dropped from that workflow's occupancy records
    /// (partial release), otherwise all of that workflow's occupancies go.
    pub fn release_occupancy(&self, session: &SessionId, workflow_id: WorkflowId, task_ids: Option<&[TaskId]>) {
        let mut sessions = self.sessions.lock();
        let Some(table) = sessions.get_mut(session) else { return };
        match task_ids {
            None => table.occupancies.retain(|o| o.workflow_id != workflow_id),
            Some(ids) => {
                for occ in table.occupancies.iter_mut() {
                    if occ.workflow_id == workflow_id {
                        occ.task_ids.retain(|t| !ids.contains(t));
                    }
                }
                table.occupancies.retain(|o| o.workflow_id != workflow_id || !o.task_ids.is_empty());
            }
        }
    }

    /// Finds conflicting occupancies against tasks `workflow_id` wants,
    /// treating the want as `exclusive` (the caller declares its own kind
    /// separately once the conflict is resolved).
    pub fn check_conflicts(&self, session: &SessionId, workflow_id: WorkflowId, task_ids: &[TaskId]) -> Vec<ConflictEntry> {
        let sessions = self.sessions.lock();
        let Some(table) = sessions.get(session) else { return Vec::new() };
        let wanted = TaskOccupancy {
            workflow_id,
            task_ids: task_ids.to_vec(),
            kind: OccupancyKind::Exclusive,
            reason: String::new(),
        };
        let mut conflicts = Vec::new();
        for occ in &table.occupancies {
            if occ.workflow_id == workflow_id {
                continue;
            }
            if wanted.conflicts_with(occ) {
                for task_id in &occ.task_ids {
                    if task_ids.contains(task_id) {
                        conflicts.push(ConflictEntry { task_id: task_id.clone(), occupying_workflow: occ.workflow_id });
                    }
                }
            }
        }
        conflicts
    }

    pub fn register_waiting_for_conflicts(
        &self,
        session: &SessionId,
        workflow_id: WorkflowId,
        wanted_tasks: Vec<TaskId>,
        blocking_workflows: Vec<WorkflowId>,
    ) {
        let mut sessions = self.sessions.lock();
        let table = sessions.entry(session.clone()).or_default();
        table.waiters.retain(|w| w.workflow_id != workflow_id);
        table.waiters.push(WaitingConflict { workflow_id, wanted_tasks, blocking_workflows });
    }

    /// Drops any waiter no longer blocked by a live workflow, returning the
    /// now-unblocked entries so the caller can re-dispatch them.
    pub fn drain_unblocked_waiters(&self, session: &SessionId, finished_workflow: WorkflowId) -> Vec<WaitingConflict> {
        let mut sessions = self.sessions.lock();
        let Some(table) = sessions.get_mut(session) else { return Vec::new() };
        for waiter in table.waiters.iter_mut() {
            waiter.blocking_workflows.retain(|w| *w != finished_workflow);
        }
        let (unblocked, still_waiting): (Vec<_>, Vec<_>) =
            table.waiters.drain(..).partition(|w| w.blocking_workflows.is_empty());
        table.waiters = still_waiting;
        unblocked
    }

    pub fn mark_in_progress(&self, session: &SessionId, id: &TaskId, workflow_id: WorkflowId, epoch_ms: u64) {
        self.with_task_mut(session, id, |t| {
            t.status = TaskStatus::InProgress;
            t.active_workflow = Some(workflow_id);
            t.updated_at_ms = epoch_ms;
        });
    }

    pub fn mark_awaiting_decision(&self, session: &SessionId, id: &TaskId, question: impl Into<String>, epoch_ms: u64) {
        self.with_task_mut(session, id, |t| {
            t.status = TaskStatus::AwaitingDecision;
            t.pending_question = Some(question.into());
            t.updated_at_ms = epoch_ms;
        });
    }

    pub fn mark_succeeded(&self, session: &SessionId, id: &TaskId, epoch_ms: u64) {
        self.with_task_mut(session, id, |t| {
            t.status = TaskStatus::Succeeded;
            t.active_workflow = None;
            t.pending_question = None;
            t.updated_at_ms = epoch_ms;
        });
    }

    /// Failure is never terminal (§4.2): records the attempt and returns the
    /// task to `blocked`, to be promoted back to `ready` by the next
    /// [`TaskStore::update_ready_tasks`] call.
    pub fn record_failure(&self, session: &SessionId, id: &TaskId, workflow_id: WorkflowId, error_text: impl Into<String>, epoch_ms: u64) {
        self.with_task_mut(session, id, |t| {
            t.record_failure(workflow_id, error_text, epoch_ms);
            t.active_workflow = None;
            t.status = TaskStatus::Blocked;
        });
    }

    pub fn mark_orphaned(&self, session: &SessionId, id: &TaskId) {
        self.with_task_mut(session, id, |t| t.orphaned = true);
    }

    pub fn is_orphaned(&self, session: &SessionId, id: &TaskId) -> bool {
        self.sessions.lock().get(session).and_then(|t| t.file.get(id)).map(|t| t.orphaned).unwrap_or(false)
    }

    /// Deletes a task outright. Per I3, callers must not invoke this while
    /// the task still has an `active_workflow` — it is the caller's job to
    /// wait for that workflow to finish (or mark-orphan-then-delete once it
    /// does).
    pub fn delete_task(&self, session: &SessionId, id: &TaskId, _reason: impl Into<String>) -> Option<Task> {
        let mut sessions = self.sessions.lock();
        let table = sessions.get_mut(session)?;
        let removed = table.file.remove(id);
        Self::recompute_dependents(table);
        removed
    }

    fn with_task_mut(&self, session: &SessionId, id: &TaskId, f: impl FnOnce(&mut Task)) {
        let mut sessions = self.sessions.lock();
        if let Some(table) = sessions.get_mut(session) {
            if let Some(task) = table.file.get_mut(id) {
                f(task);
            }
        }
    }
}

#[cfg(test)]
#[path = "task_store_tests.rs"]
mod tests;
