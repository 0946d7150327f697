// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event dispatch methods — name, log summary, task_id extraction

use super::{agent, decision, Event};
use crate::agent::{AgentId, AgentState};
use crate::owner::OwnerId;
use crate::task::TaskId;

impl Event {
    /// Create an agent event from an AgentState with owner.
    pub fn from_agent_state(agent_id: AgentId, state: AgentState, owner: OwnerId) -> Self {
        agent::from_agent_state(agent_id, state, owner)
    }

    /// Extract agent_id, state, and owner if this is an agent event.
    pub fn as_agent_state(&self) -> Option<(&AgentId, AgentState, &OwnerId)> {
        agent::as_agent_state(self)
    }

    /// Extract the task id this event concerns, if any.
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Event::DepsList { task_id, .. } | Event::UserQuestionAsked { task_id, .. } => {
                Some(task_id)
            }
            Event::DecisionCreated { .. } => decision::task_id(self),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Event::AgentWorking { .. } => "agent:working",
            Event::AgentWaiting { .. } => "agent:waiting",
            Event::AgentFailed { .. } => "agent:failed",
            Event::AgentExited { .. } => "agent:exited",
            Event::AgentGone { .. } => "agent:gone",
            Event::AgentInput { .. } => "agent:input",
            Event::AgentSignal { .. } => "agent:signal",
            Event::AgentIdle { .. } => "agent:idle",
            Event::AgentStop { .. } => "agent:stop",
            Event::AgentPrompt { .. } => "agent:prompt",
            Event::SessionCreated { .. } => "session:created",
            Event::SessionUpdated { .. } => "session:updated",
            Event::WorkflowCompleted { .. } => "workflow:completed",
            Event::WorkflowEvent { .. } => "workflow:event",
            Event::WorkflowsCleaned { .. } => "workflows:cleaned",
            Event::DepsList { .. } => "deps:list",
            Event::UserQuestionAsked { .. } => "user:questionAsked",
            Event::PoolChanged { .. } => "pool:changed",
            Event::DecisionCreated { .. } => "decision:created",
            Event::DecisionResolved { .. } => "decision:resolved",
            Event::Shutdown => "system:shutdown",
            Event::Custom => "custom",
        }
    }

    /// Single-line summary for structured logging.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::AgentWorking { .. }
            | Event::AgentWaiting { .. }
            | Event::AgentFailed { .. }
            | Event::AgentExited { .. }
            | Event::AgentGone { .. }
            | Event::AgentInput { .. }
            | Event::AgentSignal { .. }
            | Event::AgentIdle { .. }
            | Event::AgentStop { .. }
            | Event::AgentPrompt { .. } => agent::log_summary(self, t),
            Event::DecisionCreated { .. } | Event::DecisionResolved { .. } => {
                decision::log_summary(self, t)
            }
            Event::SessionCreated { session_id, .. } => format!("{t} id={session_id}"),
            Event::SessionUpdated { session_id, status } => {
                format!("{t} id={session_id} status={status}")
            }
            Event::WorkflowCompleted { workflow_id, session_id, status } => {
                format!("{t} id={workflow_id} session={session_id} status={status}")
            }
            Event::WorkflowEvent { workflow_id, event_type, .. } => {
                format!("{t} id={workflow_id} event_type={event_type}")
            }
            Event::WorkflowsCleaned { session_id, count } => {
                format!("{t} session={session_id} count={count}")
            }
            Event::DepsList { task_id, dependencies } => {
                format!("{t} task={task_id} count={}", dependencies.len())
            }
            Event::UserQuestionAsked { task_id, .. } => format!("{t} task={task_id}"),
            Event::PoolChanged { available, resting, allocated, busy } => {
                format!("{t} available={available} resting={resting} allocated={allocated} busy={busy}")
            }
            Event::Shutdown | Event::Custom => t.to_string(),
        }
    }
}
