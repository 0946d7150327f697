// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The glue (§4.6): session lifecycle, workflow dispatch, the agent-request
//! queue pump, the task-conflict arbiter, and the background cleanup loop.
//! Every rule enforced here is a composition of calls into `oj-engine` and
//! `oj-storage` — this module owns no business logic of its own, only the
//! order those calls happen in.

use crate::coordinator::{CoordinatorAgent, LlmClient, TriggerKind};
use crate::effects::EffectExecutor;
use oj_adapters::{AgentAdapter, NotifyAdapter};
use oj_core::{
    AgentName, Clock, ConflictResolution, Event, PlanSession, RoleId, SessionId, SessionStatus,
    TaskConflict, TaskId, WorkflowId, WorkflowStatus, WorkflowType,
};
use oj_engine::{
    AgentPoolRuntime, CompletionRendezvous, DispatchError, RendezvousError, RendezvousKey, TaskStore,
    WorkflowEngine, WorkflowHandle, DEFAULT_TIMEOUT,
};
use oj_storage::StateStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Priority every agent-stage request is queued at. Nothing in this engine
/// yet differentiates workflow priority, so every request races on
/// queued-at order alone (§5 ordering guarantee 4).
const DEFAULT_AGENT_PRIORITY: u8 = 0;

/// Every session created for error-resolution work shares this id rather
/// than getting a fresh one per error — `completeSession` must never
/// unregister its tasks, since the next Unity error reuses the same session.
pub const ERROR_RESOLUTION_SESSION_ID: &str = "PS_ERROR_RESOLUTION";

const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const SESSION_RETENTION: Duration = Duration::from_secs(4 * 60 * 60);
const RENDEZVOUS_WARN_THRESHOLD: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartTaskWorkflowError {
    #[error("session {0} is not approved")]
    SessionNotApproved(SessionId),
    #[error("task {0} already has a non-terminal workflow")]
    TaskAlreadyHasWorkflow(TaskId),
    #[error("task {0} has incomplete dependencies: {1:?}")]
    DependenciesIncomplete(TaskId, Vec<TaskId>),
    #[error("unregistered workflow type: {0}")]
    UnknownWorkflowType(WorkflowType),
}

impl From<DispatchError> for StartTaskWorkflowError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::TaskAlreadyHasWorkflow(id) => Self::TaskAlreadyHasWorkflow(id),
            DispatchError::UnknownWorkflowType(t) => Self::UnknownWorkflowType(t),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompleteSessionError {
    #[error("session {0} is not approved, cannot be completed")]
    NotApproved(SessionId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApproveSessionError {
    #[error("session {0} has no plan to approve")]
    NoPlan(SessionId),
}

/// Bookkeeping kept for every live workflow, since `oj-engine` itself only
/// exposes per-session enumeration, not a direct id lookup.
#[derive(Debug, Clone)]
struct WorkflowMapping {
    session: SessionId,
    task_id: Option<TaskId>,
}

/// One pending ask for an agent, fulfilled by [`UnifiedCoordinator::process_agent_queue`].
struct AgentRequest {
    session: SessionId,
    workflow_id: WorkflowId,
    role: RoleId,
    priority: u8,
    queued_at_ms: u64,
    respond_to: oneshot::Sender<AgentName>,
}

/// The glue component described in §4.6. Holds `Arc` handles to every
/// singleton it coordinates, in the same dependency order the daemon's own
/// startup sequence constructs them in (storage, then engine runtimes, then
/// the coordinator loop, then this).
pub struct UnifiedCoordinator<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter> {
    clock: C,
    storage: Arc<StateStore>,
    tasks: Arc<TaskStore>,
    pool: Arc<AgentPoolRuntime<C>>,
    engine: Arc<WorkflowEngine>,
    coordinator: Arc<CoordinatorAgent<C, L>>,
    rendezvous: Arc<CompletionRendezvous>,
    effects: Arc<EffectExecutor<A, N>>,
    events: Arc<oj_engine::EventBroadcaster>,
    sessions: Mutex<HashMap<SessionId, PlanSession>>,
    workflows: Mutex<HashMap<WorkflowId, WorkflowMapping>>,
    agent_queue: Mutex<Vec<AgentRequest>>,
    draining_queue: AtomicBool,
    start_task_lock: Mutex<()>,
    cleanup_handle: Mutex<Option<JoinHandle<()>>>,
    workflow_listener_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter> UnifiedCoordinator<C, L, A, N> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clock: C,
        storage: Arc<StateStore>,
        tasks: Arc<TaskStore>,
        pool: Arc<AgentPoolRuntime<C>>,
        engine: Arc<WorkflowEngine>,
        coordinator: Arc<CoordinatorAgent<C, L>>,
        rendezvous: Arc<CompletionRendezvous>,
        effects: Arc<EffectExecutor<A, N>>,
        events: Arc<oj_engine::EventBroadcaster>,
    ) -> Self {
        Self {
            clock,
            storage,
            tasks,
            pool,
            engine,
            coordinator,
            rendezvous,
            effects,
            events,
            sessions: Mutex::new(HashMap::new()),
            workflows: Mutex::new(HashMap::new()),
            agent_queue: Mutex::new(Vec::new()),
            draining_queue: AtomicBool::new(false),
            start_task_lock: Mutex::new(()),
            cleanup_handle: Mutex::new(None),
            workflow_listener_handle: Mutex::new(None),
        }
    }

    /// Session init (§4.6 "Session init"): create the in-memory entry on
    /// first reference, backed by whatever the registry already has on disk
    /// (or a fresh `no_plan` session if this id has never been seen).
    fn load_session(&self, session: &SessionId) -> PlanSession {
        let mut sessions = self.sessions.lock();
        if let Some(existing) = sessions.get(session) {
            return existing.clone();
        }
        let loaded = self
            .storage
            .load_sessions()
            .ok()
            .and_then(|registry| registry.get(session).cloned())
            .unwrap_or_else(|| PlanSession::new(session.clone(), self.clock.epoch_ms()));
        sessions.insert(session.clone(), loaded.clone());
        loaded
    }

    fn save_session(&self, updated: PlanSession) {
        let mut sessions = self.sessions.lock();
        sessions.insert(updated.id.clone(), updated.clone());
        drop(sessions);

        let mut registry = self.storage.load_sessions().unwrap_or_default();
        registry.upsert(updated.clone());
        if let Err(err) = self.storage.save_sessions(&registry) {
            warn!(session = %updated.id, %err, "failed to persist session registry");
        }
        self.events.emit(Event::SessionUpdated { session_id: updated.id, status: updated.status });
    }

    pub fn session_status(&self, session: &SessionId) -> SessionStatus {
        self.load_session(session).status
    }

    /// `session.get`: current snapshot of a session, creating a fresh
    /// `no_plan` entry on first reference (same rule `load_session` already
    /// applies internally).
    pub fn get_session(&self, session: &SessionId) -> PlanSession {
        self.load_session(session)
    }

    /// `session.create`: allocates a fresh `PS_NNNNNN` id and persists its
    /// initial `no_plan` record.
    pub fn create_session(&self) -> PlanSession {
        let id = SessionId::next();
        let now_ms = self.clock.epoch_ms();
        let session = PlanSession::new(id.clone(), now_ms);

        self.sessions.lock().insert(id.clone(), session.clone());
        let mut registry = self.storage.load_sessions().unwrap_or_default();
        registry.upsert(session.clone());
        if let Err(err) = self.storage.save_sessions(&registry) {
            warn!(%id, %err, "failed to persist session registry");
        }
        self.events.emit(Event::SessionCreated { session_id: id, created_at_ms: now_ms });
        session
    }

    /// `plan.setPath`: registers the plan file a session was written to.
    /// `no_plan` sessions advance to `reviewing`; a session already under
    /// review or revision keeps its status (a path update is not itself a
    /// review-state transition once reviewing has begun).
    pub fn set_plan_path(&self, session: &SessionId, path: PathBuf) -> PlanSession {
        let mut plan_session = self.load_session(session);
        plan_session.plan_file_path = Some(path);
        if plan_session.status == SessionStatus::NoPlan {
            plan_session.status = SessionStatus::Reviewing;
        }
        plan_session.updated_at_ms = self.clock.epoch_ms();
        self.save_session(plan_session.clone());
        plan_session
    }

    /// `session.approve`: only a session with a plan on file (`reviewing` or
    /// `revising`) can be approved — `no_plan` has nothing to execute yet.
    pub fn approve_session(&self, session: &SessionId) -> Result<PlanSession, ApproveSessionError> {
        let mut plan_session = self.load_session(session);
        if plan_session.status == SessionStatus::NoPlan {
            return Err(ApproveSessionError::NoPlan(session.clone()));
        }
        plan_session.status = SessionStatus::Approved;
        plan_session.updated_at_ms = self.clock.epoch_ms();
        self.save_session(plan_session.clone());
        Ok(plan_session)
    }

    /// Looks up the session/task a workflow was dispatched under, for
    /// callers (the event-translation layer) that only have the id an
    /// `oj_core::Event` carries.
    pub fn workflow_mapping(&self, workflow_id: WorkflowId) -> Option<(SessionId, Option<TaskId>)> {
        self.workflows.lock().get(&workflow_id).map(|m| (m.session.clone(), m.task_id.clone()))
    }

    /// §4.6 "Dispatch": instantiate via the registry, apply its start
    /// effects, record the workflow→task mapping, and — for
    /// `task_implementation` — mark the task in progress. Then hands the new
    /// workflow to [`Self::spawn_workflow_driver`], which requests agents for
    /// it phase by phase until it goes terminal (§4.4, §5 suspension point).
    pub fn dispatch_workflow(
        self: &Arc<Self>,
        session: SessionId,
        workflow_type: WorkflowType,
        task_id: Option<TaskId>,
    ) -> Result<WorkflowHandle, DispatchError> {
        let now_ms = self.clock.epoch_ms();
        let (handle, effects) = self.engine.start(workflow_type, session.clone(), task_id.clone(), now_ms)?;

        self.workflows.lock().insert(handle.workflow_id, WorkflowMapping { session: session.clone(), task_id: task_id.clone() });

        if workflow_type == WorkflowType::TaskImplementation {
            if let Some(id) = &task_id {
                self.tasks.mark_in_progress(&session, id, handle.workflow_id, now_ms);
                self.persist_tasks(&session);
            }
        }

        let effects_handle = Arc::clone(&self.effects);
        tokio::spawn(async move { effects_handle.apply_all(effects).await });

        self.spawn_workflow_driver(handle.workflow_id, session.clone());

        info!(%session, workflow_id = %handle.workflow_id, %workflow_type, "workflow dispatched");
        Ok(handle)
    }

    /// §4.6 "Start-task-workflow": the gated entry point used for every
    /// task-driven dispatch. Held across the whole check-and-dispatch
    /// sequence by `start_task_lock` so two concurrent callers can never
    /// both pass the dependency/approval checks for the same task.
    pub fn start_task_workflow(
        self: &Arc<Self>,
        session: SessionId,
        task_id: TaskId,
        workflow_type: WorkflowType,
    ) -> Result<WorkflowHandle, StartTaskWorkflowError> {
        let _guard = self.start_task_lock.lock();

        if self.load_session(&session).status != SessionStatus::Approved {
            return Err(StartTaskWorkflowError::SessionNotApproved(session));
        }

        let requires_deps = self
            .engine
            .registry()
            .metadata(workflow_type)
            .map(|m| m.requires_complete_dependencies)
            .unwrap_or(true);
        if requires_deps {
            let incomplete: Vec<TaskId> = self
                .tasks
                .dependencies(&session, &task_id)
                .into_iter()
                .filter(|dep| {
                    !self
                        .tasks
                        .get_task(&session, dep)
                        .map(|t| t.status.is_terminal())
                        .unwrap_or(false)
                })
                .collect();
            if !incomplete.is_empty() {
                return Err(StartTaskWorkflowError::DependenciesIncomplete(task_id, incomplete));
            }
        }

        self.dispatch_workflow(session, workflow_type, Some(task_id)).map_err(Into::into)
    }

    /// Queue an agent request and wake the pump. Returns a receiver that
    /// resolves once an agent has been allocated for this workflow/role.
    pub fn request_agent(&self, session: SessionId, workflow_id: WorkflowId, role: RoleId, priority: u8) -> oneshot::Receiver<AgentName> {
        let (tx, rx) = oneshot::channel();
        let queued_at_ms = self.clock.epoch_ms();
        self.agent_queue.lock().push(AgentRequest { session, workflow_id, role, priority, queued_at_ms, respond_to: tx });
        rx
    }

    /// §4.6 "Agent queue pump". Single re-entry flag: a pump already running
    /// drops a racing second call rather than interleaving two drains (§5
    /// ordering guarantee 4).
    pub async fn process_agent_queue(&self) {
        if self.draining_queue.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return;
        }
        let _unlock = scopeguard(&self.draining_queue);

        let now_ms = self.clock.epoch_ms();
        let mut pending = std::mem::take(&mut *self.agent_queue.lock());
        pending.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.queued_at_ms.cmp(&b.queued_at_ms)));

        let mut still_waiting = Vec::new();
        for request in pending {
            let found = self
                .pool
                .find_benched(request.workflow_id, &request.role)
                .or_else(|| self.pool.allocate(&request.session, request.workflow_id, &request.role, 1).ok().and_then(|v| v.into_iter().next()));

            match found {
                Some(agent) => {
                    let effects = self.engine.agent_allocated(request.workflow_id, agent.clone(), now_ms);
                    self.effects.apply_all(effects).await;
                    self.broadcast_pool_changed();
                    let _ = request.respond_to.send(agent);
                }
                None => still_waiting.push(request),
            }
        }

        *self.agent_queue.lock() = still_waiting;
    }

    /// §4.2/§6/§9: writes a session's in-memory task set back to
    /// `tasks.json` after every mutation, the persistence half of every
    /// `TaskStore` lifecycle hook.
    fn persist_tasks(&self, session: &SessionId) {
        let Some(file) = self.tasks.snapshot_session(session) else { return };
        if let Err(err) = self.storage.save_tasks(session, &file) {
            warn!(%session, %err, "failed to persist tasks");
        }
    }

    /// Drives a freshly dispatched workflow through its agent stages (the
    /// glue half of §4.4's rendezvous): request whatever role the workflow
    /// currently needs, wait for the matching `agent.complete` callback (or
    /// time out per §7's ExternalTimeout policy), feed the result back into
    /// the engine, and repeat until the workflow reaches a terminal status.
    fn spawn_workflow_driver(self: &Arc<Self>, workflow_id: WorkflowId, session: SessionId) {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.drive_workflow(workflow_id, session).await });
    }

    async fn drive_workflow(self: Arc<Self>, workflow_id: WorkflowId, session: SessionId) {
        loop {
            let Some(role) = self.engine.agent_role_needed(workflow_id) else { return };
            let task_id = self.workflow_mapping(workflow_id).and_then(|(_, task_id)| task_id);
            let Some(stage) = self.engine.progress(workflow_id).map(|p| p.phase) else { return };

            // The wait must be armed before the agent is actually spawned —
            // otherwise a callback that races ahead of this task finds no
            // registered waiter and is dropped (the dead-drop branch in
            // `CompletionRendezvous::signal_completion`). Spawning it as its
            // own task lets it register its waiter while this task is still
            // driving the agent request through the pool.
            let key = RendezvousKey::new(workflow_id, stage, task_id);
            let rendezvous = Arc::clone(&self.rendezvous);
            let wait_handle = tokio::spawn(async move { rendezvous.wait_for_completion(key, DEFAULT_TIMEOUT).await });

            let rx = self.request_agent(session.clone(), workflow_id, role, DEFAULT_AGENT_PRIORITY);
            self.process_agent_queue().await;
            let Ok(_agent) = rx.await else {
                wait_handle.abort();
                return;
            };

            let payload = match wait_handle.await {
                Ok(Ok(signal)) => {
                    serde_json::json!({
                        "success": signal.result == "success",
                        "result": signal.result,
                        "data": signal.payload,
                    })
                }
                Ok(Err(RendezvousError::TimedOut)) => serde_json::json!({"success": false, "reason": "timeout"}),
                // Cancellation means `engine.cancel` already drove this workflow
                // terminal elsewhere — nothing left for this loop to do.
                Ok(Err(RendezvousError::Cancelled)) | Err(_) => return,
            };

            let now_ms = self.clock.epoch_ms();
            let effects = self.engine.handle_event_response(workflow_id, "stageComplete", payload, now_ms);
            self.effects.apply_all(effects).await;

            // A terminal transition emits `Event::WorkflowCompleted`, which
            // `spawn_workflow_completion_listener` picks up to finish the
            // task and release the agent — nothing left for this loop.
            if self.engine.status(workflow_id).map(|s| s.is_terminal()).unwrap_or(true) {
                return;
            }
        }
    }

    fn broadcast_pool_changed(&self) {
        let counts = self.pool.counts();
        self.events.emit(Event::PoolChanged {
            available: counts.available,
            resting: counts.resting,
            allocated: counts.allocated,
            busy: counts.busy,
        });
    }

    /// §4.6 "Agent released": sync the pool, broadcast, and — only for
    /// sessions that still have outstanding work — nudge the coordinator.
    pub fn on_agent_released(&self, session: &SessionId, agent: &AgentName) {
        self.pool.release(std::slice::from_ref(agent));
        self.broadcast_pool_changed();

        let has_outstanding_work = self
            .tasks
            .snapshot_session(session)
            .map(|file| file.tasks.iter().any(|t| !t.status.is_terminal() && t.status != oj_core::TaskStatus::InProgress))
            .unwrap_or(false);
        if has_outstanding_work {
            self.coordinator.queue_event(session.clone(), TriggerKind::AgentAvailable, serde_json::json!({"agent": agent.as_str()}));
        }
    }

    /// §4.6 "Conflict arbiter".
    pub fn on_task_conflict_declared(&self, session: &SessionId, workflow_id: WorkflowId, conflict: TaskConflict) {
        let now_ms = self.clock.epoch_ms();
        match conflict.resolution {
            ConflictResolution::CancelOthers => {
                let conflicts = self.tasks.check_conflicts(session, workflow_id, &conflict.task_ids);
                let occupying: std::collections::HashSet<WorkflowId> = conflicts.iter().map(|c| c.occupying_workflow).collect();
                for other in occupying {
                    let effects = self.engine.cancel(other, now_ms);
                    self.spawn_apply(effects);
                    self.rendezvous.cancel_pending_signal(other, None);
                    self.tasks.release_occupancy(session, other, None);
                }
                self.tasks.declare_occupancy(session, workflow_id, conflict.task_ids.clone(), oj_core::OccupancyKind::Exclusive, conflict.reason.clone());
                self.tasks.update_ready_tasks(session);
            }
            ConflictResolution::WaitForOthers => {
                let conflicts = self.tasks.check_conflicts(session, workflow_id, &conflict.task_ids);
                let blocking: Vec<WorkflowId> = conflicts.iter().map(|c| c.occupying_workflow).collect();
                self.tasks.register_waiting_for_conflicts(session, workflow_id, conflict.task_ids.clone(), blocking);
                let effects = self.engine.cancel(workflow_id, now_ms);
                self.spawn_apply(effects);
                self.rendezvous.cancel_pending_signal(workflow_id, None);
            }
            ConflictResolution::AbortIfOccupied => {
                let effects = self.engine.cancel(workflow_id, now_ms);
                self.spawn_apply(effects);
                self.rendezvous.cancel_pending_signal(workflow_id, None);
            }
        }
    }

    /// Called once a workflow terminates (driven by
    /// [`Self::spawn_workflow_completion_listener`]): updates the task it was
    /// tied to (§4.3 terminal step 4), re-dispatches anything that was
    /// waiting on it (the other half of `wait_for_others`, above), and
    /// retriggers the coordinator.
    pub fn on_workflow_finished(
        &self,
        session: &SessionId,
        workflow_id: WorkflowId,
        status: WorkflowStatus,
    ) -> Vec<oj_engine::WaitingConflict> {
        self.finish_task_for_workflow(session, workflow_id, status);

        let released = self.pool.release_workflow_agents(workflow_id);
        if !released.is_empty() {
            self.broadcast_pool_changed();
        }

        let trigger = match status {
            WorkflowStatus::Succeeded => TriggerKind::WorkflowCompleted,
            WorkflowStatus::Cancelled => TriggerKind::WorkflowCompleted,
            _ => TriggerKind::WorkflowFailed,
        };
        self.coordinator.queue_event(session.clone(), trigger, serde_json::json!({"workflowId": workflow_id.to_string(), "status": status.to_string()}));

        self.tasks.update_ready_tasks(session);
        self.persist_tasks(session);
        self.workflows.lock().remove(&workflow_id);

        self.tasks.drain_unblocked_waiters(session, workflow_id)
    }

    /// §4.3 terminal step 4: if the workflow was tied to a task, marks it
    /// `succeeded` (workflow succeeded), `awaiting_decision` with the
    /// attempt recorded in its history (workflow failed/cancelled), or
    /// deletes it outright if it had been orphaned in the meantime.
    fn finish_task_for_workflow(&self, session: &SessionId, workflow_id: WorkflowId, status: WorkflowStatus) {
        let Some(task_id) = self.workflows.lock().get(&workflow_id).and_then(|m| m.task_id.clone()) else { return };
        let now_ms = self.clock.epoch_ms();

        if self.tasks.is_orphaned(session, &task_id) {
            self.tasks.delete_task(session, &task_id, "workflow finished while orphaned");
            return;
        }

        match status {
            WorkflowStatus::Succeeded => self.tasks.mark_succeeded(session, &task_id, now_ms),
            _ => {
                self.tasks.record_failure(session, &task_id, workflow_id, format!("workflow {status} before a completion signal arrived"), now_ms);
                self.tasks.mark_awaiting_decision(session, &task_id, format!("workflow {status}: review and decide how to proceed"), now_ms);
            }
        }
    }

    /// Background subscriber that drives [`Self::on_workflow_finished`] from
    /// every `workflow:completed` broadcast, regardless of whether the
    /// workflow reached terminal via [`Self::drive_workflow`]'s own loop or
    /// via an out-of-band cancel (`cancel_session`, `cancel_workflow`, the
    /// conflict arbiter). Mirrors the subscriber loop in the RPC listener.
    pub fn spawn_workflow_completion_listener(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut rx = this.events.subscribe();
            loop {
                match rx.recv().await {
                    Ok(Event::WorkflowCompleted { workflow_id, session_id, status }) => {
                        this.on_workflow_finished(&session_id, workflow_id, status);
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "workflow completion listener lagged, dropping missed broadcasts");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                }
            }
        });
        *self.workflow_listener_handle.lock() = Some(handle);
    }

    fn spawn_apply(&self, effects: Vec<oj_core::Effect>) {
        let effects_handle = Arc::clone(&self.effects);
        tokio::spawn(async move { effects_handle.apply_all(effects).await });
    }

    /// §4.6 "Cancel session".
    pub fn cancel_session(&self, session: &SessionId) {
        let now_ms = self.clock.epoch_ms();
        let live_ids: Vec<WorkflowId> = self
            .workflows
            .lock()
            .iter()
            .filter(|(_, m)| &m.session == session)
            .map(|(id, _)| *id)
            .collect();

        let mut any_live = false;
        for id in live_ids {
            if self.engine.status(id).map(|s| !s.is_terminal()).unwrap_or(false) {
                any_live = true;
                let effects = self.engine.cancel(id, now_ms);
                self.spawn_apply(effects);
                self.rendezvous.cancel_pending_signal(id, None);
            }
        }

        let plan_session = self.load_session(session);
        if !any_live && matches!(plan_session.status, SessionStatus::Planning | SessionStatus::Revising) {
            self.pool.release_session_agents(session);
            let mut updated = plan_session;
            updated.status = if updated.plan_file_path.as_ref().map(|p| p.exists()).unwrap_or(false) {
                SessionStatus::Reviewing
            } else {
                SessionStatus::NoPlan
            };
            updated.updated_at_ms = now_ms;
            self.save_session(updated);
        }
    }

    /// `workflow.cancel`: cancels a single live workflow, independent of the
    /// rest of its session. Returns `false` if the workflow was already
    /// terminal or was never dispatched.
    pub fn cancel_workflow(&self, workflow_id: WorkflowId) -> bool {
        if self.engine.status(workflow_id).map(|s| s.is_terminal()).unwrap_or(true) {
            return false;
        }
        let now_ms = self.clock.epoch_ms();
        let effects = self.engine.cancel(workflow_id, now_ms);
        self.spawn_apply(effects);
        self.rendezvous.cancel_pending_signal(workflow_id, None);
        true
    }

    pub fn pause_evaluations(&self, session: &SessionId, reason: impl Into<String>) {
        self.coordinator.pause_evaluations(session, reason);
    }

    pub fn resume_evaluations(&self, session: &SessionId) {
        self.coordinator.resume_evaluations(session);
    }

    /// §4.6 "Manual complete".
    pub fn complete_session(&self, session: &SessionId) -> Result<(), CompleteSessionError> {
        let mut plan_session = self.load_session(session);
        if plan_session.status != SessionStatus::Approved {
            return Err(CompleteSessionError::NotApproved(session.clone()));
        }
        plan_session.status = SessionStatus::Completed;
        plan_session.updated_at_ms = self.clock.epoch_ms();
        self.save_session(plan_session);

        if session.as_str() != ERROR_RESOLUTION_SESSION_ID {
            self.sessions.lock().remove(session);
        }
        Ok(())
    }

    /// §4.6 "Periodic cleanup", driven by the caller's own interval timer.
    pub fn run_cleanup_tick(&self) {
        let now_ms = self.clock.epoch_ms();
        self.engine.sweep_archive(now_ms);

        let stale: Vec<SessionId> = self
            .sessions
            .lock()
            .values()
            .filter(|s| {
                matches!(s.status, SessionStatus::Completed | SessionStatus::Cancelled)
                    && now_ms.saturating_sub(s.updated_at_ms) >= SESSION_RETENTION.as_millis() as u64
            })
            .map(|s| s.id.clone())
            .collect();
        for id in &stale {
            self.sessions.lock().remove(id);
        }
        if !stale.is_empty() {
            info!(count = stale.len(), "evicted stale completed/cancelled sessions from memory");
        }

        let live_signals = self.rendezvous.live_signal_count();
        if live_signals > RENDEZVOUS_WARN_THRESHOLD {
            warn!(live_signals, "completion rendezvous backlog exceeds warn threshold");
        }
    }

    /// Spawns the 5-minute periodic-cleanup loop, storing its handle so
    /// `shutdown` can abort it.
    pub fn spawn_cleanup_loop(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                this.run_cleanup_tick();
            }
        });
        *self.cleanup_handle.lock() = Some(handle);
    }

    /// §4.6 "Graceful shutdown": cancel every non-terminal workflow, release
    /// every allocated/busy agent, flush the pool broadcast, then stop the
    /// background loop.
    pub async fn shutdown(&self) {
        let now_ms = self.clock.epoch_ms();
        let workflow_ids: Vec<WorkflowId> = self.workflows.lock().keys().copied().collect();
        for id in workflow_ids {
            if self.engine.status(id).map(|s| !s.is_terminal()).unwrap_or(false) {
                let effects = self.engine.cancel(id, now_ms);
                self.effects.apply_all(effects).await;
                self.rendezvous.cancel_pending_signal(id, None);
            }
        }

        let snapshot = self.pool.snapshot();
        let busy_or_allocated: Vec<AgentName> = snapshot
            .entries
            .iter()
            .filter(|e| matches!(e.state, oj_core::AgentPoolState::Allocated(_) | oj_core::AgentPoolState::Busy(_)))
            .map(|e| e.name.clone())
            .collect();
        self.pool.release(&busy_or_allocated);
        self.broadcast_pool_changed();

        if let Some(handle) = self.cleanup_handle.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.workflow_listener_handle.lock().take() {
            handle.abort();
        }
    }
}

/// RAII flip-back for the single-re-entry queue-drain flag.
struct QueueDrainGuard<'a>(&'a AtomicBool);

impl Drop for QueueDrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn scopeguard(flag: &AtomicBool) -> QueueDrainGuard<'_> {
    QueueDrainGuard(flag)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
