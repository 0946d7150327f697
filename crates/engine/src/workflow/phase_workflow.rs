// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared phase-sequencing machinery behind every registered workflow type.
//! The four type files in this module each wire their own phase list, role,
//! and `WorkflowType` tag into this one state machine rather than repeating
//! it — the *registry* is still a closed, enum-dispatched tagged union
//! (§4.3's design note rules out an open/inheritance hierarchy); this is
//! just the shared implementation behind each of its fixed arms.

use super::{WorkflowContext, WorkflowError, WorkflowInstance};
use oj_core::{AgentName, Effect, Event, OwnerId, RoleId, WorkflowId, WorkflowProgress, WorkflowStatus, WorkflowType};
use std::collections::HashMap;
use std::path::PathBuf;

pub(super) struct PhaseWorkflow {
    id: WorkflowId,
    workflow_type: WorkflowType,
    phases: &'static [&'static str],
    phase_index: usize,
    role: RoleId,
    status: WorkflowStatus,
    agent: Option<AgentName>,
    started_at_ms: u64,
}

impl PhaseWorkflow {
    pub(super) fn new(
        id: WorkflowId,
        workflow_type: WorkflowType,
        phases: &'static [&'static str],
        role: RoleId,
    ) -> Self {
        Self { id, workflow_type, phases, phase_index: 0, role, status: WorkflowStatus::Pending, agent: None, started_at_ms: 0 }
    }

    fn current_phase(&self) -> &'static str {
        self.phases.get(self.phase_index).copied().unwrap_or("done")
    }

    fn is_last_phase(&self) -> bool {
        self.phase_index + 1 >= self.phases.len()
    }

    fn progress_event(&self, now_ms: u64) -> Effect {
        Effect::Emit {
            event: Event::WorkflowEvent {
                workflow_id: self.id,
                event_type: "onProgress".to_string(),
                payload: serde_json::json!({ "phase": self.current_phase(), "phase_index": self.phase_index, "at_ms": now_ms }),
            },
        }
    }

    fn completed_event(&self) -> Effect {
        Effect::Emit {
            event: Event::WorkflowEvent {
                workflow_id: self.id,
                event_type: "onComplete".to_string(),
                payload: serde_json::json!({ "status": self.status }),
            },
        }
    }
}

impl WorkflowInstance for PhaseWorkflow {
    fn status(&self) -> WorkflowStatus {
        self.status
    }

    fn progress(&self) -> WorkflowProgress {
        WorkflowProgress {
            phase: self.current_phase().to_string(),
            phase_index: self.phase_index as u32,
            percentage: (self.phase_index as f32 / self.phases.len().max(1) as f32) * 100.0,
            started_at_ms: Some(self.started_at_ms),
            updated_at_ms: None,
            log_path: None,
        }
    }

    fn agent_role_needed(&self) -> Option<&RoleId> {
        if self.status == WorkflowStatus::Running && self.agent.is_none() {
            Some(&self.role)
        } else {
            None
        }
    }

    fn start(&mut self, ctx: &WorkflowContext) -> Result<Vec<Effect>, WorkflowError> {
        if self.status.is_terminal() {
            return Err(WorkflowError::AlreadyTerminal);
        }
        self.status = WorkflowStatus::Running;
        self.started_at_ms = ctx.now_ms;
        Ok(vec![self.progress_event(ctx.now_ms)])
    }

    fn agent_allocated(&mut self, ctx: &WorkflowContext, agent: AgentName) -> Vec<Effect> {
        self.agent = Some(agent.clone());
        let agent_id = oj_core::AgentId::new(format!("{}-{}", self.id, self.current_phase()));
        vec![
            Effect::SpawnAgent {
                agent_id,
                agent_name: agent.0,
                owner: OwnerId::workflow(self.id),
                workspace_path: PathBuf::from(format!(".apc/work/{}", ctx.session)),
                input: HashMap::new(),
                command: format!("{} --phase {}", self.role, self.current_phase()),
                env: Vec::new(),
                cwd: None,
                unset_env: Vec::new(),
                resume: false,
                container: None,
            },
            Effect::Emit {
                event: Event::WorkflowEvent {
                    workflow_id: self.id,
                    event_type: "onAgentWorkStarted".to_string(),
                    payload: serde_json::json!({ "phase": self.current_phase() }),
                },
            },
        ]
    }

    fn cancel(&mut self, ctx: &WorkflowContext) -> Vec<Effect> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        self.status = WorkflowStatus::Cancelled;
        let mut effects = Vec::new();
        if let Some(agent) = self.agent.take() {
            effects.push(Effect::KillAgent { agent_id: oj_core::AgentId::new(format!("{}-{}", self.id, self.current_phase())) });
            let _ = agent;
        }
        effects.push(self.progress_event(ctx.now_ms));
        effects.push(self.completed_event());
        effects
    }

    fn dispose(&mut self) {
        self.agent = None;
    }

    fn handle_workflow_event_response(
        &mut self,
        ctx: &WorkflowContext,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<Vec<Effect>, WorkflowError> {
        if event_type != "stageComplete" {
            return Err(WorkflowError::UnknownEventType(event_type.to_string()));
        }
        if self.status.is_terminal() {
            return Err(WorkflowError::AlreadyTerminal);
        }
        let succeeded = payload.get("success").and_then(|v| v.as_bool()).unwrap_or(true);
        self.agent = None;
        if !succeeded {
            self.status = WorkflowStatus::Failed;
            return Ok(vec![self.progress_event(ctx.now_ms), self.completed_event()]);
        }
        if self.is_last_phase() {
            self.status = WorkflowStatus::Succeeded;
            Ok(vec![self.progress_event(ctx.now_ms), self.completed_event()])
        } else {
            self.phase_index += 1;
            Ok(vec![self.progress_event(ctx.now_ms)])
        }
    }
}

impl PhaseWorkflow {
    pub(super) fn workflow_type(&self) -> WorkflowType {
        self.workflow_type
    }
}

#[cfg(test)]
#[path = "phase_workflow_tests.rs"]
mod tests;
