// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow type machinery (§4.3): the closed tagged union of workflow
//! types, each a phased state machine driven by completion signals from
//! external agent work.

mod phase_workflow;
mod registry;

pub mod context_gathering;
pub mod error_resolution;
pub mod planning_revision;
pub mod task_implementation;

pub use registry::{WorkflowFactory, WorkflowMetadata, WorkflowRegistry};

use oj_core::{RoleId, SessionId, TaskId, WorkflowProgress, WorkflowStatus};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("workflow is already in a terminal state")]
    AlreadyTerminal,
    #[error("unrecognized workflow event type: {0}")]
    UnknownEventType(String),
}

/// What a workflow instance needs in order to compute its next set of
/// effects. Carries no direct handles to shared runtime state (the pool,
/// the task store) — those belong to `WorkflowEngine`, which applies the
/// effects a workflow instance returns; this keeps workflow logic a pure
/// reducer, the same shape as [`oj_core::Effect`] was designed for.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub session: SessionId,
    pub task_id: Option<TaskId>,
    pub now_ms: u64,
}

/// Common contract every registered workflow type implements (§4.3).
///
/// `start`/`cancel`/`handle_workflow_event_response` return the effects the
/// engine must apply (spawn an agent, emit a progress event, arm a timer);
/// none of them perform I/O themselves.
pub trait WorkflowInstance: Send {
    fn status(&self) -> WorkflowStatus;

    fn progress(&self) -> WorkflowProgress;

    /// The role a freshly dispatched workflow needs an agent for, if it is
    /// currently waiting on one. `None` once an agent has been bound or
    /// once the workflow has moved past needing one.
    fn agent_role_needed(&self) -> Option<&RoleId>;

    fn start(&mut self, ctx: &WorkflowContext) -> Result<Vec<oj_core::Effect>, WorkflowError>;

    /// Binds a newly allocated agent name to this workflow's current phase,
    /// producing the effects that actually put it to work (e.g. `SpawnAgent`).
    fn agent_allocated(&mut self, ctx: &WorkflowContext, agent: oj_core::AgentName) -> Vec<oj_core::Effect>;

    fn cancel(&mut self, ctx: &WorkflowContext) -> Vec<oj_core::Effect>;

    /// Called once per terminal transition; releases whatever the instance
    /// is holding that outlives the workflow object itself (e.g. a
    /// subscription). Idempotent.
    fn dispose(&mut self);

    fn handle_workflow_event_response(
        &mut self,
        ctx: &WorkflowContext,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<Vec<oj_core::Effect>, WorkflowError>;
}
