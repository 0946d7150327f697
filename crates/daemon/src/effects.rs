// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies [`oj_core::Effect`]s returned by `oj-engine`'s workflow instances.
//! Workflow logic is a pure reducer (§4.3): it never spawns a process or
//! writes an event itself, it only returns the `Effect`s describing what
//! should happen. This module is the one place those effects actually touch
//! the outside world — an external agent CLI, the shared event bus, a
//! desktop notification, or a scheduled timer.

use oj_adapters::{AgentAdapter, AgentConfig, NotifyAdapter};
use oj_core::{AgentId, Effect, Event, TimerId, TimerKind};
use oj_engine::EventBroadcaster;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Notified when a [`Effect::SetTimer`] previously applied by this executor
/// elapses. Implemented by whichever component armed the timer — `oj-engine`
/// itself never calls back in, so this seam only matters once a workflow
/// (or the coordinator, via its own timers — see `crate::coordinator`) starts
/// using the generic timer effects rather than managing its schedule
/// directly.
pub trait TimerSink: Send + Sync + 'static {
    fn on_timer_fired(&self, kind: TimerKind);
}

/// A [`TimerSink`] that does nothing; the default until a caller wires a
/// real one in.
#[derive(Default)]
pub struct NullTimerSink;

impl TimerSink for NullTimerSink {
    fn on_timer_fired(&self, _kind: TimerKind) {}
}

struct TimerRegistry {
    live: Mutex<HashMap<TimerId, JoinHandle<()>>>,
}

impl TimerRegistry {
    fn new() -> Self {
        Self { live: Mutex::new(HashMap::new()) }
    }

    fn set(&self, id: TimerId, duration: std::time::Duration, sink: Arc<dyn TimerSink>) {
        self.cancel(&id);
        let fired_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(kind) = fired_id.kind() {
                sink.on_timer_fired(kind);
            }
        });
        self.live.lock().insert(id, handle);
    }

    fn cancel(&self, id: &TimerId) {
        if let Some(handle) = self.live.lock().remove(id) {
            handle.abort();
        }
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        for (_, handle) in self.live.lock().drain() {
            handle.abort();
        }
    }
}

/// Applies effects against real adapters. One instance per daemon process;
/// cheap to clone (everything inside is `Arc`/adapter handles that are
/// themselves `Clone`).
pub struct EffectExecutor<A: AgentAdapter, N: NotifyAdapter> {
    agent_adapter: A,
    notify_adapter: N,
    events: Arc<EventBroadcaster>,
    agent_event_tx: mpsc::Sender<Event>,
    timers: TimerRegistry,
    timer_sink: Arc<dyn TimerSink>,
}

impl<A: AgentAdapter, N: NotifyAdapter> EffectExecutor<A, N> {
    /// `agent_event_tx` is the funnel every spawned agent's lifecycle events
    /// are pushed onto; pair this with a forwarding task that drains the
    /// matching receiver into `events` (see `spawn_agent_event_forwarder`).
    pub fn new(
        agent_adapter: A,
        notify_adapter: N,
        events: Arc<EventBroadcaster>,
        agent_event_tx: mpsc::Sender<Event>,
        timer_sink: Arc<dyn TimerSink>,
    ) -> Self {
        Self { agent_adapter, notify_adapter, events, agent_event_tx, timers: TimerRegistry::new(), timer_sink }
    }

    pub async fn apply_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.apply(effect).await;
        }
    }

    pub async fn apply(&self, effect: Effect) {
        let name = effect.name();
        match effect {
            Effect::Emit { event } => {
                self.events.emit(event);
            }
            Effect::SpawnAgent {
                agent_id,
                agent_name,
                owner,
                workspace_path,
                input: _,
                command,
                env: _,
                cwd,
                unset_env: _,
                resume: _,
                container: _,
            } => {
                let config = AgentConfig {
                    agent_id: agent_id.clone(),
                    owner,
                    workspace_path: cwd.unwrap_or(workspace_path),
                    prompt: String::new(),
                    command,
                    args: Vec::new(),
                };
                match self.agent_adapter.spawn(config, self.agent_event_tx.clone()).await {
                    Ok(_handle) => info!(%agent_id, agent_name, "agent spawned"),
                    Err(err) => warn!(%agent_id, %err, "failed to spawn agent"),
                }
            }
            Effect::SendToAgent { agent_id, input } => {
                if let Err(err) = self.agent_adapter.send(&agent_id, &input).await {
                    warn!(%agent_id, %err, "failed to send input to agent");
                }
            }
            Effect::RespondToAgent { agent_id, response } => {
                let response = oj_core::PromptResponse { accept: true, option: None, text: Some(response) };
                if let Err(err) = self.agent_adapter.respond(&agent_id, &response).await {
                    warn!(%agent_id, %err, "failed to deliver prompt response to agent");
                }
            }
            Effect::KillAgent { agent_id } => {
                if let Err(err) = self.agent_adapter.kill(&agent_id).await {
                    warn!(%agent_id, %err, "failed to kill agent");
                }
            }
            Effect::SetTimer { id, duration } => {
                self.timers.set(id, duration, self.timer_sink.clone());
            }
            Effect::CancelTimer { id } => {
                self.timers.cancel(&id);
            }
            Effect::Shell { owner, step, command, cwd, env: _, container: _ } => {
                // Shell effects run through the same agent adapter as a
                // one-shot command rather than a second process-runner
                // abstraction; the adapter doesn't distinguish the two.
                let agent_id = AgentId::new(format!("shell-{step}"));
                let config = AgentConfig {
                    agent_id: agent_id.clone(),
                    owner: owner.unwrap_or_else(|| oj_core::OwnerId::workflow(oj_core::WorkflowId::new())),
                    workspace_path: cwd,
                    prompt: String::new(),
                    command,
                    args: Vec::new(),
                };
                if let Err(err) = self.agent_adapter.spawn(config, self.agent_event_tx.clone()).await {
                    warn!(%agent_id, %err, step, "shell effect failed to spawn");
                }
            }
            Effect::Notify { title, message } => {
                if let Err(err) = self.notify_adapter.notify(&title, &message).await {
                    warn!(%err, "notification failed");
                }
            }
        }
        tracing::trace!(effect = name, "applied effect");
    }
}

/// Drains `agent_event_rx` for the lifetime of the daemon, forwarding every
/// agent lifecycle event onto the shared broadcaster so RPC subscribers see
/// it the same way they see every other domain event.
pub fn spawn_agent_event_forwarder(
    mut agent_event_rx: mpsc::Receiver<Event>,
    events: Arc<EventBroadcaster>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = agent_event_rx.recv().await {
            events.emit(event);
        }
    })
}

#[cfg(test)]
#[path = "effects_tests.rs"]
mod tests;
