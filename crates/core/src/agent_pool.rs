// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent pool entity: the four-state FSM tracked per registered agent name.
//!
//! An agent *identity* (see [`crate::AgentId`]) is the thing an external CLI
//! process answers to. An [`AgentPoolEntry`] is the pool's bookkeeping record
//! for that identity: which of the four states it is in, and — while
//! `allocated` or `busy` — which workflow currently owns it.

use crate::session::SessionId;
use crate::workflow::WorkflowId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cooldown an agent rests for after release, before becoming available again (A2).
pub const REST_COOLDOWN: Duration = Duration::from_secs(5);

/// A role an agent can be allocated under (e.g. "implementer", "reviewer").
/// Opaque to the pool; validated against the caller-supplied role registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub String);

impl RoleId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A name drawn from the canonical agent roster (A4: resize only ever
/// appends from the tail of this roster, or removes from `available`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentName(pub String);

impl AgentName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A claim a workflow holds on an agent: which workflow, session, and role,
/// plus the optional task the agent is currently (or about to be) working on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentClaim {
    pub session: SessionId,
    pub workflow_id: WorkflowId,
    pub role: RoleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<crate::task::TaskId>,
    pub since_ms: u64,
}

/// Per-agent FSM state (A1: an agent is in exactly one of these at any moment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AgentPoolState {
    /// Free to be allocated.
    Available,
    /// Cooling down after release; not eligible for allocation until `until_ms`.
    Resting { until_ms: u64 },
    /// Reserved by a workflow (its "bench") but not yet promoted to active work.
    Allocated(AgentClaim),
    /// Actively doing work for a workflow.
    Busy(AgentClaim),
}

impl AgentPoolState {
    pub fn is_available(&self) -> bool {
        matches!(self, AgentPoolState::Available)
    }

    pub fn is_resting(&self) -> bool {
        matches!(self, AgentPoolState::Resting { .. })
    }

    pub fn claim(&self) -> Option<&AgentClaim> {
        match self {
            AgentPoolState::Allocated(c) | AgentPoolState::Busy(c) => Some(c),
            _ => None,
        }
    }

    /// Kind tag, independent of payload — used for protocol DTOs and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentPoolState::Available => "available",
            AgentPoolState::Resting { .. } => "resting",
            AgentPoolState::Allocated(_) => "allocated",
            AgentPoolState::Busy(_) => "busy",
        }
    }
}

/// A single agent's pool bookkeeping record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPoolEntry {
    pub name: AgentName,
    pub state: AgentPoolState,
}

impl AgentPoolEntry {
    pub fn available(name: AgentName) -> Self {
        Self { name, state: AgentPoolState::Available }
    }
}

/// An unrecognized role was requested from [`crate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub RoleId);

impl std::fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

#[cfg(test)]
#[path = "agent_pool_tests.rs"]
mod tests;
