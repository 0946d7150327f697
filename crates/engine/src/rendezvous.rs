// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named one-shot rendezvous between external agent-CLI callbacks and
//! workflows waiting on them (§4.4). A workflow calls
//! [`CompletionRendezvous::wait_for_completion`], which registers a
//! [`tokio::sync::oneshot`] channel under `(workflow_id, stage, task_id?)`
//! and races it against a timeout; a callback handler calls
//! [`CompletionRendezvous::signal_completion`], which finds the channel and
//! resolves it. Whichever side finds the map entry first wins and removes
//! it — there is no queueing.

use oj_core::{TaskId, WorkflowId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::warn;

/// A signal more than this many live waiters implies a lost consumer
/// somewhere; logged loudly rather than enforced.
const LIVE_SIGNAL_WARN_THRESHOLD: usize = 100;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RendezvousKey {
    pub workflow_id: WorkflowId,
    pub stage: String,
    pub task_id: Option<TaskId>,
}

impl RendezvousKey {
    pub fn new(workflow_id: WorkflowId, stage: impl Into<String>, task_id: Option<TaskId>) -> Self {
        Self { workflow_id, stage: stage.into(), task_id }
    }
}

/// What a producer hands back through the rendezvous.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompletionSignal {
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub signaled_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendezvousError {
    /// The timeout elapsed before a signal arrived.
    TimedOut,
    /// The wait was torn down by `cancel_pending_signal` or `cancel()`.
    Cancelled,
}

impl std::fmt::Display for RendezvousError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendezvousError::TimedOut => write!(f, "rendezvous timed out"),
            RendezvousError::Cancelled => write!(f, "rendezvous was cancelled"),
        }
    }
}

impl std::error::Error for RendezvousError {}

#[derive(Default)]
pub struct CompletionRendezvous {
    waiters: Mutex<HashMap<RendezvousKey, oneshot::Sender<CompletionSignal>>>,
}

impl CompletionRendezvous {
    pub fn new() -> Self {
        Self { waiters: Mutex::new(HashMap::new()) }
    }

    fn live_count(&self) -> usize {
        self.waiters.lock().len()
    }

    /// Registers a wait under `key` and suspends until either a matching
    /// [`Self::signal_completion`] call arrives or `timeout` elapses.
    pub async fn wait_for_completion(
        &self,
        key: RendezvousKey,
        timeout: Duration,
    ) -> Result<CompletionSignal, RendezvousError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut waiters = self.waiters.lock();
            waiters.insert(key.clone(), tx);
            if waiters.len() > LIVE_SIGNAL_WARN_THRESHOLD {
                warn!(live = waiters.len(), "completion rendezvous has more than 100 live waiters; a consumer may be lost");
            }
        }

        tokio::select! {
            signal = rx => {
                signal.map_err(|_| RendezvousError::Cancelled)
            }
            _ = tokio::time::sleep(timeout) => {
                self.waiters.lock().remove(&key);
                Err(RendezvousError::TimedOut)
            }
        }
    }

    /// Finds the channel for `key`, cancels its timer (by virtue of the
    /// `select!` in the waiting task observing the `oneshot` resolve first),
    /// and resolves it. Logs and drops if no waiter is registered. Returns
    /// whether a waiter was actually found and resolved, for callers (the
    /// `agent.complete` handler) that need to report delivery back to the
    /// caller.
    pub fn signal_completion(&self, key: RendezvousKey, signal: CompletionSignal) -> bool {
        let sender = self.waiters.lock().remove(&key);
        match sender {
            Some(tx) => {
                let _ = tx.send(signal);
                true
            }
            None => {
                warn!(?key, "signalCompletion with no registered waiter; dropped");
                false
            }
        }
    }

    /// Tears down one or all pending waits for `workflow_id`. With `stage`
    /// given, only that stage's entries (any task id) are removed.
    pub fn cancel_pending_signal(&self, workflow_id: WorkflowId, stage: Option<&str>) {
        let mut waiters = self.waiters.lock();
        waiters.retain(|key, _| {
            let matches = key.workflow_id == workflow_id && stage.map(|s| s == key.stage).unwrap_or(true);
            !matches
        });
    }

    pub fn live_signal_count(&self) -> usize {
        self.live_count()
    }
}

#[cfg(test)]
#[path = "rendezvous_tests.rs"]
mod tests;
