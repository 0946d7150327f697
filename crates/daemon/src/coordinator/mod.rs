// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-driven LLM loop with three-layer rate limiting (§4.5): debounce a
//! burst of events, never wait past a ceiling, and never re-evaluate right
//! after a prior evaluation finished. The loop itself never performs a
//! dispatch — the model drives the daemon's own CLI surface during
//! `evaluate`; all this module extracts back out is enough to log and to
//! annotate history.

pub mod input;
pub mod llm;

pub use input::RoleIntroTemplate;
pub use llm::{CoordinatorOutput, CoordinatorPrompt, FakeLlmClient, LlmClient, LlmError, ProcessLlmClient};

use oj_core::{push_bounded, Clock, CoordinatorHistoryEntry, SessionId, TaskId, COORDINATOR_HISTORY_WINDOW};
use oj_engine::{AgentPoolRuntime, TaskStore, WorkflowEngine};
use oj_storage::StateStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

const RETRY_BACKOFFS: [Duration; 3] = [Duration::from_secs(2), Duration::from_secs(4), Duration::from_secs(8)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    UnityError,
    WorkflowFailed,
    WorkflowCompleted,
    UserResponded,
    AgentAvailable,
    TaskPaused,
    TaskResumed,
    ManualEvaluation,
    ExecutionStarted,
    WorkflowBlocked,
}

impl TriggerKind {
    /// Lower is higher priority; matches §4.5's `combineEvents` order.
    fn rank(self) -> u8 {
        match self {
            TriggerKind::UnityError => 0,
            TriggerKind::WorkflowFailed => 1,
            TriggerKind::WorkflowCompleted => 2,
            TriggerKind::UserResponded => 3,
            TriggerKind::AgentAvailable => 4,
            TriggerKind::TaskPaused => 5,
            TriggerKind::TaskResumed => 6,
            TriggerKind::ManualEvaluation => 7,
            TriggerKind::ExecutionStarted => 8,
            TriggerKind::WorkflowBlocked => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::UnityError => "unity_error",
            TriggerKind::WorkflowFailed => "workflow_failed",
            TriggerKind::WorkflowCompleted => "workflow_completed",
            TriggerKind::UserResponded => "user_responded",
            TriggerKind::AgentAvailable => "agent_available",
            TriggerKind::TaskPaused => "task_paused",
            TriggerKind::TaskResumed => "task_resumed",
            TriggerKind::ManualEvaluation => "manual_evaluation",
            TriggerKind::ExecutionStarted => "execution_started",
            TriggerKind::WorkflowBlocked => "workflow_blocked",
        }
    }
}

struct PendingEvent {
    kind: TriggerKind,
    payload: serde_json::Value,
}

#[derive(Default)]
struct SessionQueue {
    pending: Vec<PendingEvent>,
    first_event_at: Option<Instant>,
    last_eval_completed_at: Option<Instant>,
    generation: u64,
    paused: bool,
    pause_reason: Option<String>,
}

pub struct CoordinatorConfig {
    pub debounce: Duration,
    pub max_wait: Duration,
    pub cooldown: Duration,
    pub eval_timeout: Duration,
    pub decision_history_limit: usize,
    pub unity_enabled: bool,
    pub role_intro: RoleIntroTemplate,
    pub decision_instructions: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2000),
            max_wait: Duration::from_millis(10_000),
            cooldown: Duration::from_millis(10_000),
            eval_timeout: Duration::from_secs(120),
            decision_history_limit: 10,
            unity_enabled: false,
            role_intro: RoleIntroTemplate {
                text: "You are the coordinator for session {{sessionId}} at {{timestamp}}.\n\
                       Available workflow types:\n{{WORKFLOW_SELECTION}}"
                    .to_string(),
            },
            decision_instructions: "Decide what to dispatch next, if anything, by running the \
                                     appropriate `apc` commands yourself."
                .to_string(),
        }
    }
}

/// The event-driven evaluation loop. One instance serves every session;
/// per-session queue state lives in `sessions`.
pub struct CoordinatorAgent<C: Clock, L: LlmClient> {
    config: CoordinatorConfig,
    clock: C,
    llm: Arc<L>,
    storage: Arc<StateStore>,
    tasks: Arc<TaskStore>,
    pool: Arc<AgentPoolRuntime<C>>,
    engine: Arc<WorkflowEngine>,
    sessions: Mutex<HashMap<SessionId, SessionQueue>>,
    history: Mutex<HashMap<SessionId, Vec<CoordinatorHistoryEntry>>>,
    eval_counter: AtomicU64,
}

impl<C: Clock, L: LlmClient> CoordinatorAgent<C, L> {
    pub fn new(
        config: CoordinatorConfig,
        clock: C,
        llm: Arc<L>,
        storage: Arc<StateStore>,
        tasks: Arc<TaskStore>,
        pool: Arc<AgentPoolRuntime<C>>,
        engine: Arc<WorkflowEngine>,
    ) -> Self {
        Self {
            config,
            clock,
            llm,
            storage,
            tasks,
            pool,
            engine,
            sessions: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            eval_counter: AtomicU64::new(0),
        }
    }

    pub fn pause_evaluations(&self, session: &SessionId, reason: impl Into<String>) {
        let mut sessions = self.sessions.lock();
        let queue = sessions.entry(session.clone()).or_default();
        queue.paused = true;
        queue.pause_reason = Some(reason.into());
    }

    pub fn resume_evaluations(&self, session: &SessionId) {
        if let Some(queue) = self.sessions.lock().get_mut(session) {
            queue.paused = false;
            queue.pause_reason = None;
        }
    }

    pub fn is_paused(&self, session: &SessionId) -> bool {
        self.sessions.lock().get(session).map(|q| q.paused).unwrap_or(false)
    }

    /// Test-only seam for crate-internal callers (e.g. the idle monitor's
    /// own tests) that need to observe whether a queued event eventually
    /// reached the model, without exposing the LLM client on the public API.
    #[cfg(test)]
    pub(crate) fn llm(&self) -> &Arc<L> {
        &self.llm
    }

    /// §4.5 `queueEvent`. Silently drops the event if the session is paused
    /// — plan-mutating operations pause evaluations while they run, and the
    /// coordinator should not re-fire on events that happened mid-mutation.
    pub fn queue_event(self: &Arc<Self>, session: SessionId, kind: TriggerKind, payload: serde_json::Value) {
        let now = Instant::now();
        let (delay, generation) = {
            let mut sessions = self.sessions.lock();
            let queue = sessions.entry(session.clone()).or_default();
            if queue.paused {
                debug!(%session, reason = ?queue.pause_reason, "coordinator event dropped, session paused");
                return;
            }

            queue.pending.push(PendingEvent { kind, payload });
            if queue.pending.len() == 1 {
                queue.first_event_at = Some(now);
            }
            let first_event_at = queue.first_event_at.unwrap_or(now);

            let delay = if let Some(last) = queue.last_eval_completed_at {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < self.config.cooldown {
                    (self.config.cooldown - elapsed) + self.config.debounce
                } else if now.saturating_duration_since(first_event_at) >= self.config.max_wait {
                    Duration::ZERO
                } else {
                    self.config.debounce
                }
            } else if now.saturating_duration_since(first_event_at) >= self.config.max_wait {
                Duration::ZERO
            } else {
                self.config.debounce
            };

            queue.generation += 1;
            (delay, queue.generation)
        };

        let this = Arc::clone(self);
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            this.fire_if_current(session, generation).await;
        });
    }

    async fn fire_if_current(&self, session: SessionId, generation: u64) {
        let pending = {
            let mut sessions = self.sessions.lock();
            let Some(queue) = sessions.get_mut(&session) else { return };
            if queue.generation != generation || queue.pending.is_empty() {
                return;
            }
            queue.last_eval_completed_at = None;
            std::mem::take(&mut queue.pending)
        };

        let (kind, payload) = combine_events(&pending);
        self.evaluate_with_retry(&session, kind, payload).await;

        let mut sessions = self.sessions.lock();
        if let Some(queue) = sessions.get_mut(&session) {
            queue.last_eval_completed_at = Some(Instant::now());
        }
    }

    async fn evaluate_with_retry(&self, session: &SessionId, kind: TriggerKind, payload: serde_json::Value) {
        let eval_id = format!("ev{}", self.eval_counter.fetch_add(1, Ordering::Relaxed));
        let now_ms = self.clock.epoch_ms();
        let prompt_text = self.build_prompt_text(session, kind, &payload, now_ms);
        let prompt = CoordinatorPrompt {
            session: session.clone(),
            eval_id: eval_id.clone(),
            triggering_event: kind.as_str().to_string(),
            text: prompt_text,
        };

        if let Err(err) = self.storage.write_coordinator_audit(session, now_ms, &eval_id, "prompt", &prompt.text) {
            warn!(%session, %err, "failed to write coordinator prompt audit log");
        }

        let mut last_err = None;
        let mut output = None;
        for (attempt, backoff) in std::iter::once(Duration::ZERO).chain(RETRY_BACKOFFS).enumerate() {
            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }
            match self.llm.evaluate(prompt.clone(), self.config.eval_timeout).await {
                Ok(result) => {
                    output = Some(result);
                    break;
                }
                Err(err) => {
                    debug!(%session, attempt, %err, "coordinator evaluation attempt failed");
                    last_err = Some(err);
                }
            }
        }

        let Some(output) = output else {
            error!(%session, error = ?last_err, "coordinator evaluation failed after all retries");
            return;
        };

        if let Err(err) = self.storage.write_coordinator_audit(session, now_ms, &eval_id, "output", &output.raw) {
            warn!(%session, %err, "failed to write coordinator output audit log");
        }

        let mut entry = CoordinatorHistoryEntry::new(
            now_ms,
            kind.as_str(),
            output.reasoning().unwrap_or_default(),
        );
        entry.confidence = output.confidence();
        self.record_history(session, entry);
    }

    fn build_prompt_text(
        &self,
        session: &SessionId,
        kind: TriggerKind,
        payload: &serde_json::Value,
        now_ms: u64,
    ) -> String {
        let selection = input::workflow_selection(self.engine.registry(), self.config.unity_enabled);
        let mut text = self.config.role_intro.render(session, now_ms, &selection);
        text.push('\n');
        text.push_str(&input::triggering_event_section(kind.as_str(), payload));
        text.push('\n');
        text.push_str(&input::plan_section(&self.storage.layout().plan_file(session)));
        text.push('\n');
        let history = self.history_for(session);
        text.push_str(&input::decision_history_section(&history, Some(self.config.decision_history_limit)));
        text.push('\n');
        text.push_str(&input::current_state_section(session, &self.tasks, &self.pool, &self.engine));
        text.push('\n');
        text.push_str(&input::decision_instructions_section(&self.config.decision_instructions));
        text
    }

    fn history_for(&self, session: &SessionId) -> Vec<CoordinatorHistoryEntry> {
        let mut history = self.history.lock();
        if let Some(existing) = history.get(session) {
            return existing.clone();
        }
        let loaded = self.storage.load_coordinator_history(session).map(|f| f.entries).unwrap_or_default();
        history.insert(session.clone(), loaded.clone());
        loaded
    }

    fn record_history(&self, session: &SessionId, entry: CoordinatorHistoryEntry) {
        let mut history = self.history.lock();
        let entries = history.entry(session.clone()).or_default();
        push_bounded(entries, entry, COORDINATOR_HISTORY_WINDOW);
        let snapshot = entries.clone();
        drop(history);
        if let Err(err) = self.storage.save_coordinator_history(session, &oj_storage::CoordinatorHistoryFile { entries: snapshot }) {
            warn!(%session, %err, "failed to persist coordinator history");
        }
    }

    /// Walks history newest-to-oldest annotating the first entry that
    /// dispatched `task_id` with its outcome (§4.5 "History ledger"). A
    /// no-op today: under the side-effecting CLI-command path no history
    /// entry ever populates `dispatched_tasks` (see `oj_core::coordinator`),
    /// so there is nothing to find — kept so the contract is honored the
    /// day a structured-dispatch path is added.
    pub fn annotate_workflow_outcome(&self, session: &SessionId, task_id: &TaskId, success: bool, completed_at_ms: u64) {
        let mut history = self.history.lock();
        let Some(entries) = history.get_mut(session) else { return };
        if let Some(entry) = entries.iter_mut().rev().find(|e| e.dispatched_tasks.contains(task_id)) {
            entry.outcome = Some(oj_core::DispatchOutcome { success, notes: None, completed_at_ms });
        }
    }
}

/// §4.5 `combineEvents`: collapse a batch into one synthetic event, the
/// highest-priority type present, carrying a summarized dump of the batch.
fn combine_events(pending: &[PendingEvent]) -> (TriggerKind, serde_json::Value) {
    let kind = pending.iter().map(|e| e.kind).min_by_key(|k| k.rank()).unwrap_or(TriggerKind::ManualEvaluation);
    if pending.len() == 1 {
        return (kind, pending[0].payload.clone());
    }
    let events: Vec<serde_json::Value> = pending
        .iter()
        .map(|e| serde_json::json!({"type": e.kind.as_str(), "payload": e.payload}))
        .collect();
    (kind, serde_json::json!({"kind": "batch_events", "events": events}))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
