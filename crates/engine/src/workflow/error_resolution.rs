// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `error_resolution`: `diagnose -> fix -> verify -> done`. Does not require
//! complete dependencies (errors can be diagnosed against whatever state the
//! task is currently in) but still holds exclusive occupancy while running,
//! since it mutates the same files `task_implementation` would.

use super::phase_workflow::PhaseWorkflow;
use super::WorkflowInstance;
use oj_core::{RoleId, TaskId, WorkflowId, WorkflowType};

pub const PHASES: &[&str] = &["diagnose", "fix", "verify", "done"];

pub fn create(id: WorkflowId, _task_id: Option<TaskId>) -> Box<dyn WorkflowInstance> {
    Box::new(PhaseWorkflow::new(id, WorkflowType::ErrorResolution, PHASES, RoleId::new("implementer")))
}
