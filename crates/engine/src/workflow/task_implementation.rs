// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `task_implementation`: the main path, `setup -> implement -> review ->
//! done`. Requires its target task's dependencies to have all succeeded
//! before dispatch (§4.3.1) and holds exclusive occupancy while running.

use super::phase_workflow::PhaseWorkflow;
use super::WorkflowInstance;
use oj_core::{RoleId, TaskId, WorkflowId, WorkflowType};

pub const PHASES: &[&str] = &["setup", "implement", "review", "done"];

pub fn create(id: WorkflowId, _task_id: Option<TaskId>) -> Box<dyn WorkflowInstance> {
    Box::new(PhaseWorkflow::new(id, WorkflowType::TaskImplementation, PHASES, RoleId::new("implementer")))
}
