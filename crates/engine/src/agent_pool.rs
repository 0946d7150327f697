// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime wrapper around [`oj_core::AgentPoolState`]'s four-state FSM
//! (§4.1). A single [`parking_lot::Mutex`] covers the whole entry vector —
//! every allocation and every state mutation serializes through it, per the
//! concurrency model's "one exclusive mutex covers every allocation" policy.
//!
//! `allocate` needs no `.await` here even though a process-wide mutex in a
//! single-threaded event loop would normally suggest one: there is no I/O
//! inside the critical section, so a synchronous lock gives the same
//! serialization.

use oj_core::{
    AgentClaim, AgentName, AgentPoolEntry, AgentPoolState, Clock, RoleId, SessionId, TaskId,
    UnknownRole, WorkflowId, REST_COOLDOWN,
};
use oj_storage::AgentPoolFile;
use parking_lot::Mutex;
use std::collections::HashSet;

/// The set of role ids the pool will accept in `allocate` (opaque to the
/// pool itself; validated against a caller-supplied registry per §4.1).
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry(HashSet<RoleId>);

impl RoleRegistry {
    pub fn new(roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn contains(&self, role: &RoleId) -> bool {
        self.0.contains(role)
    }
}

/// Snapshot of pool occupancy by state, used for `pool.changed` broadcasts
/// and the coordinator's "available/busy agents" input section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolCounts {
    pub available: usize,
    pub resting: usize,
    pub allocated: usize,
    pub busy: usize,
}

pub struct AgentPoolRuntime<C: Clock> {
    clock: C,
    entries: Mutex<Vec<AgentPoolEntry>>,
    roles: RoleRegistry,
}

impl<C: Clock> AgentPoolRuntime<C> {
    pub fn new(clock: C, roster: Vec<AgentName>, roles: RoleRegistry) -> Self {
        let entries = roster.into_iter().map(AgentPoolEntry::available).collect();
        Self { clock, entries: Mutex::new(entries), roles }
    }

    /// Restore from a persisted snapshot (startup path).
    pub fn from_file(clock: C, file: AgentPoolFile, roles: RoleRegistry) -> Self {
        Self { clock, entries: Mutex::new(file.entries), roles }
    }

    pub fn snapshot(&self) -> AgentPoolFile {
        AgentPoolFile { entries: self.entries.lock().clone() }
    }

    /// Sweeps `resting` entries whose cooldown has elapsed back to
    /// `available`, sorted by name so the subsequent pick is deterministic
    /// (§4.1: "sorted to make allocation deterministic").
    fn sweep_resting_locked(&self, entries: &mut [AgentPoolEntry]) {
        let now = self.clock.epoch_ms();
        let mut woken: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(&e.state, AgentPoolState::Resting { until_ms } if *until_ms <= now))
            .map(|(i, _)| i)
            .collect();
        woken.sort_by(|&a, &b| entries[a].name.cmp(&entries[b].name));
        for i in woken {
            entries[i].state = AgentPoolState::Available;
        }
    }

    /// Runs the sweep without allocating anything — used by the per-agent
    /// "resting timer fires" path and by the idle monitor's periodic tick.
    pub fn sweep(&self) {
        let mut entries = self.entries.lock();
        self.sweep_resting_locked(&mut entries);
    }

    /// `allocate(session, workflowId, count, roleId) -> agentNames[]`.
    /// Returns the subset actually allocated (may be shorter than `count`,
    /// ResourceError policy: no agents available is transient, never an
    /// error by itself).
    pub fn allocate(
        &self,
        session: &SessionId,
        workflow_id: WorkflowId,
        role: &RoleId,
        count: usize,
    ) -> Result<Vec<AgentName>, UnknownRole> {
        if !self.roles.contains(role) {
            return Err(UnknownRole(role.clone()));
        }
        let mut entries = self.entries.lock();
        self.sweep_resting_locked(&mut entries);
        let now = self.clock.epoch_ms();
        let mut picked = Vec::new();
        for e in entries.iter_mut() {
            if picked.len() >= count {
                break;
            }
            if e.state.is_available() {
                e.state = AgentPoolState::Allocated(AgentClaim {
                    session: session.clone(),
                    workflow_id,
                    role: role.clone(),
                    task: None,
                    since_ms: now,
                });
                picked.push(e.name.clone());
            }
        }
        Ok(picked)
    }

    /// Find an already-benched agent for `workflow_id`/`role` without
    /// allocating a fresh one. Bench is workflow-scoped: callers must not
    /// pass another workflow's id (no cross-workflow reuse).
    pub fn find_benched(&self, workflow_id: WorkflowId, role: &RoleId) -> Option<AgentName> {
        let entries = self.entries.lock();
        entries
            .iter()
            .find(|e| {
                matches!(&e.state, AgentPoolState::Allocated(c) if c.workflow_id == workflow_id && &c.role == role)
            })
            .map(|e| e.name.clone())
    }

    /// `promoteToBusy` — legal only when `agent` is `allocated` under
    /// `workflow_id`; fail-soft (`false`) otherwise.
    pub fn promote_to_busy(&self, agent: &AgentName, workflow_id: WorkflowId, task: Option<TaskId>) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.iter_mut().find(|e| &e.name == agent) else { return false };
        match &entry.state {
            AgentPoolState::Allocated(claim) if claim.workflow_id == workflow_id => {
                let mut claim = claim.clone();
                claim.task = task;
                entry.state = AgentPoolState::Busy(claim);
                true
            }
            _ => false,
        }
    }

    /// `demoteToBench` — busy -> allocated, preserving the workflow
    /// association so the agent stays reserved across phase transitions
    /// (e.g. review/revise loops).
    pub fn demote_to_bench(&self, agent: &AgentName) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.iter_mut().find(|e| &e.name == agent) else { return false };
        match &entry.state {
            AgentPoolState::Busy(claim) => {
                entry.state = AgentPoolState::Allocated(claim.clone());
                true
            }
            _ => false,
        }
    }

    /// `release(agents[])` — any state -> resting(until = now + REST_COOLDOWN).
    ///
    /// Open question (see DESIGN.md): an agent already resting keeps its
    /// existing `until_ms` rather than having its cooldown reset, so P2's
    /// bound holds against the original release.
    pub fn release(&self, agents: &[AgentName]) {
        let until_ms = self.clock.epoch_ms() + REST_COOLDOWN.as_millis() as u64;
        let mut entries = self.entries.lock();
        for name in agents {
            if let Some(entry) = entries.iter_mut().find(|e| &e.name == name) {
                if !entry.state.is_resting() {
                    entry.state = AgentPoolState::Resting { until_ms };
                }
            }
        }
    }

    /// `releaseSessionAgents(session)` — releases every agent currently
    /// allocated/busy under `session`. Returns the released names.
    pub fn release_session_agents(&self, session: &SessionId) -> Vec<AgentName> {
        let until_ms = self.clock.epoch_ms() + REST_COOLDOWN.as_millis() as u64;
        let mut entries = self.entries.lock();
        let mut released = Vec::new();
        for entry in entries.iter_mut() {
            let matches = matches!(
                &entry.state,
                AgentPoolState::Allocated(c) | AgentPoolState::Busy(c) if &c.session == session
            );
            if matches {
                entry.state = AgentPoolState::Resting { until_ms };
                released.push(entry.name.clone());
            }
        }
        released
    }

    /// Releases every agent currently allocated/busy under `workflow_id`.
    /// Used once a workflow goes terminal so its bench doesn't outlive it.
    pub fn release_workflow_agents(&self, workflow_id: WorkflowId) -> Vec<AgentName> {
        let until_ms = self.clock.epoch_ms() + REST_COOLDOWN.as_millis() as u64;
        let mut entries = self.entries.lock();
        let mut released = Vec::new();
        for entry in entries.iter_mut() {
            let matches = matches!(
                &entry.state,
                AgentPoolState::Allocated(c) | AgentPoolState::Busy(c) if c.workflow_id == workflow_id
            );
            if matches {
                entry.state = AgentPoolState::Resting { until_ms };
                released.push(entry.name.clone());
            }
        }
        released
    }

    /// `releaseOrphanAllocatedAgents(validWorkflowIds)` — startup reclaim.
    /// Idempotent (P8): once every orphan has moved to `resting`, a second
    /// call against the same `valid_workflows` set returns an empty list.
    pub fn release_orphan_allocated_agents(&self, valid_workflows: &HashSet<WorkflowId>) -> Vec<AgentName> {
        let until_ms = self.clock.epoch_ms() + REST_COOLDOWN.as_millis() as u64;
        let mut entries = self.entries.lock();
        let mut released = Vec::new();
        for entry in entries.iter_mut() {
            let orphan = match &entry.state {
                AgentPoolState::Allocated(c) | AgentPoolState::Busy(c) => {
                    !valid_workflows.contains(&c.workflow_id)
                }
                _ => false,
            };
            if orphan {
                entry.state = AgentPoolState::Resting { until_ms };
                released.push(entry.name.clone());
            }
        }
        released
    }

    /// `resize(newSize)` (A4): grows by appending from the tail of
    /// `roster`; shrinks by removing only `available` entries, leftmost
    /// first, leaving assigned agents untouched even if that means the pool
    /// ends up larger than `new_size`.
    pub fn resize(&self, roster: &[AgentName], new_size: usize) {
        let mut entries = self.entries.lock();
        if new_size > entries.len() {
            for name in roster.iter().skip(entries.len()).take(new_size - entries.len()) {
                entries.push(AgentPoolEntry::available(name.clone()));
            }
        } else if new_size < entries.len() {
            let mut to_remove = entries.len() - new_size;
            let mut i = 0;
            while i < entries.len() && to_remove > 0 {
                if entries[i].state.is_available() {
                    entries.remove(i);
                    to_remove -= 1;
                } else {
                    i += 1;
                }
            }
        }
    }

    pub fn counts(&self) -> PoolCounts {
        let entries = self.entries.lock();
        let mut c = PoolCounts::default();
        for e in entries.iter() {
            match &e.state {
                AgentPoolState::Available => c.available += 1,
                AgentPoolState::Resting { .. } => c.resting += 1,
                AgentPoolState::Allocated(_) => c.allocated += 1,
                AgentPoolState::Busy(_) => c.busy += 1,
            }
        }
        c
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "agent_pool_tests.rs"]
mod tests;
