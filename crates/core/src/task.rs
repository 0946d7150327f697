// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier and state machine.
//!
//! Unlike most IDs in this crate, [`TaskId`] is not a random or sequential
//! token: it encodes a strict external grammar (`PS_NNNNNN_T<digits>[suffix]`)
//! shared with the planning subsystem, so it is parsed and normalized by hand
//! instead of going through [`crate::define_id!`].

use crate::session::SessionId;
use crate::workflow::WorkflowId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strict global task identifier: `PS_NNNNNN_T<digits>[<letter>|_<suffix>]`.
///
/// Examples: `PS_000001_T7A`, `PS_000001_T24_EVENTS`. Simple IDs (e.g. `T7`)
/// are rejected — every task must carry its owning session prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

/// A [`TaskId`] failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTaskId(pub String);

impl fmt::Display for InvalidTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid task id (expected PS_NNNNNN_T<digits>[suffix]): {:?}", self.0)
    }
}

impl std::error::Error for InvalidTaskId {}

impl TaskId {
    /// Parse and normalize (uppercases) a global task id string.
    pub fn parse(s: &str) -> Result<Self, InvalidTaskId> {
        let upper = s.to_ascii_uppercase();
        if Self::validate(&upper) {
            Ok(Self(upper))
        } else {
            Err(InvalidTaskId(s.to_string()))
        }
    }

    fn validate(s: &str) -> bool {
        let Some(rest) = s.strip_prefix("PS_") else { return false };
        let Some((session_digits, rest)) = rest.split_once("_T") else { return false };
        if session_digits.len() != 6 || !session_digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let digit_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digit_end == 0 {
            return false;
        }
        let suffix = &rest[digit_end..];
        suffix.is_empty()
            || (suffix.len() == 1 && suffix.bytes().all(|b| b.is_ascii_uppercase()))
            || (suffix.starts_with('_')
                && suffix.len() > 1
                && suffix[1..].bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'))
    }

    /// The owning session's id, derived from the leading `PS_NNNNNN` segment.
    pub fn session_id(&self) -> SessionId {
        let end = self.0.find("_T").unwrap_or(self.0.len());
        SessionId::new(&self.0[..end])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TaskId {
    type Err = InvalidTaskId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaskId {
    type Error = InvalidTaskId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl std::borrow::Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// What kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Implementation,
    ErrorFix,
}

crate::simple_display! {
    TaskType {
        Implementation => "implementation",
        ErrorFix => "error_fix",
    }
}

/// Lifecycle status of a task. There is no terminal failure: failed attempts
/// accumulate in `previous_attempts` and the task returns to `ready`/`blocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Ready,
    Blocked,
    InProgress,
    AwaitingDecision,
    Succeeded,
}

crate::simple_display! {
    TaskStatus {
        Created => "created",
        Ready => "ready",
        Blocked => "blocked",
        InProgress => "in_progress",
        AwaitingDecision => "awaiting_decision",
        Succeeded => "succeeded",
    }
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded)
    }
}

/// A record of a single failed attempt at a task, used to brief the next workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAttempt {
    pub workflow_id: WorkflowId,
    pub summary: String,
    pub failed_at_ms: u64,
}

/// A task instance: the unit of work tracked by `TaskStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub session: SessionId,
    pub description: String,
    pub task_type: TaskType,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    /// Computed from the reverse of `dependencies` across the session's task set.
    /// Recomputed by `TaskStore`; never hand-edited.
    #[serde(default)]
    pub dependents: Vec<TaskId>,
    pub status: TaskStatus,
    #[serde(default)]
    pub previous_attempts: Vec<TaskAttempt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_fix_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_files: Option<Vec<String>>,
    /// At most one workflow may hold this pointer at a time (I2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_workflow: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unity_pipeline_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_question: Option<String>,
    /// Deleted only once its active workflow finishes (I3).
    #[serde(default)]
    pub orphaned: bool,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Task {
    pub fn new(
        id: TaskId,
        session: SessionId,
        description: impl Into<String>,
        task_type: TaskType,
        epoch_ms: u64,
    ) -> Self {
        Self {
            id,
            session,
            description: description.into(),
            task_type,
            priority: 0,
            dependencies: Vec::new(),
            dependents: Vec::new(),
            status: TaskStatus::Created,
            previous_attempts: Vec::new(),
            previous_fix_summary: None,
            target_files: None,
            active_workflow: None,
            unity_pipeline_tag: None,
            pending_question: None,
            orphaned: false,
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    /// I1: a task is ready iff every dependency's status is resolved as `succeeded`
    /// by the caller (the dependency statuses are not stored on the task itself).
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn record_failure(&mut self, workflow_id: WorkflowId, summary: impl Into<String>, epoch_ms: u64) {
        self.previous_attempts.push(TaskAttempt {
            workflow_id,
            summary: summary.into(),
            failed_at_ms: epoch_ms,
        });
        self.previous_fix_summary = self.previous_attempts.last().map(|a| a.summary.clone());
        self.updated_at_ms = epoch_ms;
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
