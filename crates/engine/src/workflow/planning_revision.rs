// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `planning_revision`: `analyze_impact -> apply -> done`. Runs ahead of
//! dependency completion — a revision may touch tasks whose upstream work
//! hasn't finished yet, that being the point of revising the plan.

use super::phase_workflow::PhaseWorkflow;
use super::WorkflowInstance;
use oj_core::{RoleId, TaskId, WorkflowId, WorkflowType};

pub const PHASES: &[&str] = &["analyze_impact", "apply", "done"];

pub fn create(id: WorkflowId, _task_id: Option<TaskId>) -> Box<dyn WorkflowInstance> {
    Box::new(PhaseWorkflow::new(id, WorkflowType::PlanningRevision, PHASES, RoleId::new("planner")))
}
