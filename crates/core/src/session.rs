// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Planning session identifier and lifecycle.
//!
//! A `Session` is the planning-subsystem entity (`PS_NNNNNN`) that owns
//! tasks and workflows, distinct from an agent's own execution environment
//! (the external CLI process an [`crate::agent::AgentId`] refers to).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a planning session: `PS_NNNNNN`, zero-padded to 6 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

impl SessionId {
    /// Wrap an already-formatted session id string (e.g. read from disk).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocate the next `PS_NNNNNN` id from the process-wide counter.
    pub fn next() -> Self {
        let n = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("PS_{:06}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl std::borrow::Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status of a planning session. Only `Approved` sessions trigger
/// the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NoPlan,
    Planning,
    Reviewing,
    Revising,
    Approved,
    Completed,
    Cancelled,
}

crate::simple_display! {
    SessionStatus {
        NoPlan => "no_plan",
        Planning => "planning",
        Reviewing => "reviewing",
        Revising => "revising",
        Approved => "approved",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// A planning session: the root entity that owns tasks (by id prefix) and
/// workflows (by membership).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSession {
    pub id: SessionId,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_file_path: Option<PathBuf>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl PlanSession {
    pub fn new(id: SessionId, epoch_ms: u64) -> Self {
        Self {
            id,
            status: SessionStatus::NoPlan,
            plan_file_path: None,
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    /// Only approved sessions trigger the coordinator.
    pub fn is_approved(&self) -> bool {
        matches!(self.status, SessionStatus::Approved)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
