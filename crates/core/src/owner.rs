// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner identification for agent and timer events.
//!
//! An agent or timer can be owned by either a Task (implementation/fix work)
//! or a Workflow (the state machine instance currently driving that work).
//! This module provides a tagged union type to represent that ownership.

use crate::task::TaskId;
use crate::workflow::WorkflowId;
use std::fmt;

/// Owner of an agent or timer.
///
/// Serializes as a string using Display format:
/// - `"task-PS_000001_T7A"`
/// - `"wfl-xxxxxxxxxxxxxxxxxxx"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerId {
    /// Owned by a task.
    Task(TaskId),
    /// Owned by a workflow.
    Workflow(WorkflowId),
}

impl serde::Serialize for OwnerId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for OwnerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OwnerId::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl OwnerId {
    pub fn task(id: TaskId) -> Self {
        OwnerId::Task(id)
    }

    pub fn workflow(id: WorkflowId) -> Self {
        OwnerId::Workflow(id)
    }

    pub fn as_task(&self) -> Option<&TaskId> {
        match self {
            OwnerId::Task(id) => Some(id),
            OwnerId::Workflow(_) => None,
        }
    }

    pub fn as_workflow(&self) -> Option<&WorkflowId> {
        match self {
            OwnerId::Workflow(id) => Some(id),
            OwnerId::Task(_) => None,
        }
    }

    pub fn try_task(&self) -> Result<&TaskId, OwnerMismatch> {
        match self {
            OwnerId::Task(id) => Ok(id),
            _ => Err(OwnerMismatch("task")),
        }
    }

    pub fn try_workflow(&self) -> Result<&WorkflowId, OwnerMismatch> {
        match self {
            OwnerId::Workflow(id) => Ok(id),
            _ => Err(OwnerMismatch("workflow")),
        }
    }

    /// Parse from Display format (`"task-xxx"` / `"wfl-xxx"`).
    pub fn parse(s: &str) -> Result<Self, InvalidOwnerId> {
        if let Some(rest) = s.strip_prefix("task-") {
            Ok(OwnerId::Task(TaskId::parse(rest).map_err(|_| InvalidOwnerId(s.to_string()))?))
        } else if s.starts_with("wfl-") {
            Ok(OwnerId::Workflow(WorkflowId::from_string(s)))
        } else {
            Err(InvalidOwnerId(s.to_string()))
        }
    }

    pub fn log(&self) -> String {
        match self {
            OwnerId::Task(id) => format!("task={}", id),
            OwnerId::Workflow(id) => format!("workflow={}", id),
        }
    }
}

/// Invalid owner ID format (expected `task-xxx` or `wfl-xxx`).
#[derive(Debug, Clone)]
pub struct InvalidOwnerId(pub String);

impl fmt::Display for InvalidOwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid owner id format: {}", self.0)
    }
}

impl std::error::Error for InvalidOwnerId {}

/// Expected a specific [`OwnerId`] variant.
#[derive(Debug, Clone)]
pub struct OwnerMismatch(&'static str);

impl fmt::Display for OwnerMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} owner", self.0)
    }
}

impl std::error::Error for OwnerMismatch {}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerId::Task(id) => write!(f, "task-{}", id),
            OwnerId::Workflow(id) => write!(f, "{}", id),
        }
    }
}

impl From<TaskId> for OwnerId {
    fn from(id: TaskId) -> Self {
        OwnerId::Task(id)
    }
}

impl From<&TaskId> for OwnerId {
    fn from(id: &TaskId) -> Self {
        OwnerId::Task(id.clone())
    }
}

impl From<WorkflowId> for OwnerId {
    fn from(id: WorkflowId) -> Self {
        OwnerId::Workflow(id)
    }
}

impl From<&WorkflowId> for OwnerId {
    fn from(id: &WorkflowId) -> Self {
        OwnerId::Workflow(*id)
    }
}

impl From<&OwnerId> for OwnerId {
    fn from(id: &OwnerId) -> Self {
        id.clone()
    }
}

impl PartialEq<WorkflowId> for OwnerId {
    fn eq(&self, other: &WorkflowId) -> bool {
        matches!(self, OwnerId::Workflow(id) if id == other)
    }
}

impl PartialEq<OwnerId> for WorkflowId {
    fn eq(&self, other: &OwnerId) -> bool {
        other == self
    }
}

impl PartialEq<TaskId> for OwnerId {
    fn eq(&self, other: &TaskId) -> bool {
        matches!(self, OwnerId::Task(id) if id == other)
    }
}

impl PartialEq<OwnerId> for TaskId {
    fn eq(&self, other: &OwnerId) -> bool {
        other == self
    }
}

#[cfg(test)]
#[path = "owner_test.rs"]
mod tests;
