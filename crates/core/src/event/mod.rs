// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types broadcast by every component of the control plane.

mod agent;
mod decision;
mod dispatch;

pub use agent::{AgentSignalKind, PromptType, QuestionData, QuestionEntry, QuestionOption};

use crate::agent::{AgentError, AgentId};
use crate::decision::{DecisionId, DecisionOption, DecisionSource};
use crate::owner::OwnerId;
use crate::session::{SessionId, SessionStatus};
use crate::task::TaskId;
use crate::workflow::{WorkflowId, WorkflowStatus};
use serde::{Deserialize, Serialize};

/// Events broadcast on the shared `tokio::sync::broadcast` bus.
///
/// Serializes with `{"type": "event:name", ...fields}` format. Unknown type
/// tags deserialize to `Custom` so older subscribers don't choke on new
/// variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- agent --
    #[serde(rename = "agent:working")]
    AgentWorking { agent_id: AgentId, owner: OwnerId },

    #[serde(rename = "agent:waiting")]
    AgentWaiting { agent_id: AgentId, owner: OwnerId },

    #[serde(rename = "agent:failed")]
    AgentFailed { agent_id: AgentId, error: AgentError, owner: OwnerId },

    #[serde(rename = "agent:exited")]
    AgentExited { agent_id: AgentId, exit_code: Option<i32>, owner: OwnerId },

    #[serde(rename = "agent:gone")]
    AgentGone { agent_id: AgentId, owner: OwnerId },

    #[serde(rename = "agent:input")]
    AgentInput { agent_id: AgentId, input: String },

    #[serde(rename = "agent:signal")]
    AgentSignal { agent_id: AgentId, kind: AgentSignalKind },

    #[serde(rename = "agent:idle")]
    AgentIdle { agent_id: AgentId },

    #[serde(rename = "agent:stop")]
    AgentStop { agent_id: AgentId },

    #[serde(rename = "agent:prompt")]
    AgentPrompt {
        agent_id: AgentId,
        #[serde(default = "agent::default_prompt_type")]
        prompt_type: PromptType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question: Option<QuestionData>,
    },

    // -- session --
    #[serde(rename = "session:created")]
    SessionCreated { session_id: SessionId, created_at_ms: u64 },

    #[serde(rename = "session:updated")]
    SessionUpdated { session_id: SessionId, status: SessionStatus },

    // -- workflow --
    #[serde(rename = "workflow:completed")]
    WorkflowCompleted { workflow_id: WorkflowId, session_id: SessionId, status: WorkflowStatus },

    #[serde(rename = "workflow:event")]
    WorkflowEvent { workflow_id: WorkflowId, event_type: String, payload: serde_json::Value },

    #[serde(rename = "workflows:cleaned")]
    WorkflowsCleaned { session_id: SessionId, count: usize },

    // -- task dependencies --
    #[serde(rename = "deps:list")]
    DepsList { task_id: TaskId, dependencies: Vec<TaskId> },

    // -- user clarification --
    #[serde(rename = "user:questionAsked")]
    UserQuestionAsked { task_id: TaskId, question: QuestionData },

    // -- agent pool --
    #[serde(rename = "pool:changed")]
    PoolChanged { available: usize, resting: usize, allocated: usize, busy: usize },

    // -- decision --
    #[serde(rename = "decision:created")]
    DecisionCreated {
        id: DecisionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<AgentId>,
        owner: OwnerId,
        source: DecisionSource,
        context: String,
        #[serde(default)]
        options: Vec<DecisionOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question_data: Option<QuestionData>,
        created_at_ms: u64,
    },

    #[serde(rename = "decision:resolved")]
    DecisionResolved {
        id: DecisionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chosen: Option<usize>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        resolved_at_ms: u64,
    },

    // -- system --
    #[serde(rename = "system:shutdown")]
    Shutdown,

    /// Catch-all for unknown event types (forward compatibility).
    #[serde(other, skip_serializing)]
    Custom,
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
