// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `context_gathering`: `scan -> summarize -> done`. Runs ahead of
//! dependency completion by design — it is read-only exploration feeding
//! `_AiDevLog/Context/*.md`, so it never declares exclusive occupancy.

use super::phase_workflow::PhaseWorkflow;
use super::WorkflowInstance;
use oj_core::{RoleId, TaskId, WorkflowId, WorkflowType};

pub const PHASES: &[&str] = &["scan", "summarize", "done"];

pub fn create(id: WorkflowId, _task_id: Option<TaskId>) -> Box<dyn WorkflowInstance> {
    Box::new(PhaseWorkflow::new(id, WorkflowType::ContextGathering, PHASES, RoleId::new("researcher")))
}
