// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle-session nudge (§4.7): a 10-second tick that notices when an approved
//! session has gone quiet — no active workflow, or agents sitting idle next
//! to ready work — and asks the coordinator to take another look, rather
//! than waiting for the next externally-triggered event.

use crate::coordinator::{CoordinatorAgent, LlmClient, TriggerKind};
use oj_core::{Clock, SessionId, SessionStatus};
use oj_engine::{AgentPoolRuntime, TaskStore, WorkflowEngine};
use oj_storage::StateStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

const TICK_INTERVAL: Duration = Duration::from_secs(10);
const IDLE_THRESHOLD_MS: u64 = 60_000;
const TRIGGER_COOLDOWN_MS: u64 = 5 * 60_000;

#[derive(Debug, Clone, Copy, Default)]
struct SessionIdleState {
    idle_since_ms: Option<u64>,
    last_trigger_ms: Option<u64>,
}

/// Signals whether the daemon's dependency checks (storage load, role/workflow
/// registries) have finished. Explicit and permanent — once flipped `true` it
/// never goes back, so the monitor never needs a second "are we still okay"
/// probe once it starts ticking.
pub type SystemReady = watch::Receiver<bool>;

pub struct IdleMonitor<C: Clock, L: LlmClient> {
    clock: C,
    storage: Arc<StateStore>,
    tasks: Arc<TaskStore>,
    pool: Arc<AgentPoolRuntime<C>>,
    engine: Arc<WorkflowEngine>,
    coordinator: Arc<CoordinatorAgent<C, L>>,
    system_ready: SystemReady,
    state: Mutex<HashMap<SessionId, SessionIdleState>>,
}

impl<C: Clock, L: LlmClient> IdleMonitor<C, L> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clock: C,
        storage: Arc<StateStore>,
        tasks: Arc<TaskStore>,
        pool: Arc<AgentPoolRuntime<C>>,
        engine: Arc<WorkflowEngine>,
        coordinator: Arc<CoordinatorAgent<C, L>>,
        system_ready: SystemReady,
    ) -> Self {
        Self {
            clock,
            storage,
            tasks,
            pool,
            engine,
            coordinator,
            system_ready,
            state: Mutex::new(HashMap::new()),
        }
    }

    fn approved_sessions(&self) -> Vec<SessionId> {
        self.storage
            .load_sessions()
            .map(|registry| {
                registry
                    .sessions
                    .into_iter()
                    .filter(|s| s.status == SessionStatus::Approved)
                    .map(|s| s.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Spawns the periodic tick, gated behind `system_ready`. Returns the
    /// task handle so the caller can abort it on shutdown.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ready_rx = this.system_ready.clone();
            while !*ready_rx.borrow() {
                if ready_rx.changed().await.is_err() {
                    return;
                }
            }
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                this.tick();
            }
        })
    }

    /// §4.7 "On startup": for every approved session with no active
    /// workflow, if any agent is available, fire immediately rather than
    /// waiting out the 60s idle threshold. Skipped entirely with no
    /// available agents — there would be nothing to engage.
    pub fn startup_trigger(&self) {
        if self.pool.counts().available == 0 {
            return;
        }
        let now_ms = self.clock.epoch_ms();
        for session in self.approved_sessions() {
            if !self.engine.live_for_session(&session).is_empty() {
                continue;
            }
            self.state.lock().entry(session.clone()).or_default().last_trigger_ms = Some(now_ms);
            self.coordinator.queue_event(
                session.clone(),
                TriggerKind::ManualEvaluation,
                serde_json::json!({"reason": "startup: approved session idle with an available agent"}),
            );
            info!(%session, "idle monitor startup trigger fired");
        }
    }

    /// One 10-second tick across every approved session (§4.7 steps 1-4).
    fn tick(&self) {
        if !*self.system_ready.borrow() {
            return;
        }
        let now_ms = self.clock.epoch_ms();
        let sessions = self.approved_sessions();

        let mut state = self.state.lock();
        state.retain(|id, _| sessions.contains(id));

        for session in sessions {
            let active_workflows = self.engine.live_for_session(&session).len();
            let ready_tasks = self.tasks.get_ready(&session).len();

            let entry = state.entry(session.clone()).or_default();

            // Only two shapes count as an idle candidate: fully idle (no
            // active workflow at all), or busy-but-starved (active work
            // exists yet agents could pick up more ready tasks right now).
            let (is_candidate, threshold_ms) = if active_workflows == 0 {
                (true, IDLE_THRESHOLD_MS)
            } else if ready_tasks > 0 {
                (true, 0)
            } else {
                (false, 0)
            };

            if !is_candidate {
                entry.idle_since_ms = None;
                continue;
            }

            let idle_since_ms = match entry.idle_since_ms {
                Some(ms) => ms,
                None => {
                    entry.idle_since_ms = Some(now_ms);
                    continue;
                }
            };

            let idle_duration_ms = now_ms.saturating_sub(idle_since_ms);
            let cooldown_elapsed =
                entry.last_trigger_ms.map(|t| now_ms.saturating_sub(t) >= TRIGGER_COOLDOWN_MS).unwrap_or(true);

            if idle_duration_ms >= threshold_ms && cooldown_elapsed {
                entry.last_trigger_ms = Some(now_ms);
                self.coordinator.queue_event(
                    session.clone(),
                    TriggerKind::ManualEvaluation,
                    serde_json::json!({
                        "reason": format!(
                            "idle {idle_duration_ms}ms: {active_workflows} active workflow(s), {ready_tasks} ready task(s)"
                        ),
                    }),
                );
                info!(%session, idle_duration_ms, active_workflows, ready_tasks, "idle monitor trigger fired");
            }
        }
    }
}

#[cfg(test)]
#[path = "idle_monitor_tests.rs"]
mod tests;
