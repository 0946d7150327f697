// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the runtime needs to perform.

use crate::agent::AgentId;
use crate::container::ContainerConfig;
use crate::event::Event;
use crate::owner::OwnerId;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Effects that need to be executed by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Event emission ===
    /// Emit an event into the system event bus
    Emit { event: Event },

    // === Agent-level effects ===
    /// Spawn a new agent process against the external agent CLI.
    SpawnAgent {
        agent_id: AgentId,
        agent_name: String,
        /// Owner of this agent (task or workflow)
        owner: OwnerId,
        workspace_path: PathBuf,
        input: HashMap<String, String>,
        /// Command to execute (already interpolated)
        command: String,
        env: Vec<(String, String)>,
        cwd: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        unset_env: Vec<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        resume: bool,
        /// Container config — when present, the agent runs in a container
        /// instead of as a local process.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container: Option<ContainerConfig>,
    },

    /// Send input to an agent
    SendToAgent { agent_id: AgentId, input: String },

    /// Send a response to a pending agent prompt (e.g. an answered question).
    RespondToAgent { agent_id: AgentId, response: String },

    /// Kill an agent
    KillAgent { agent_id: AgentId },

    // === Timer effects ===
    SetTimer {
        id: TimerId,
        #[serde(with = "duration_serde")]
        duration: Duration,
    },

    CancelTimer { id: TimerId },

    // === Shell effects ===
    /// Execute a shell command on behalf of a task or workflow.
    Shell {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owner: Option<OwnerId>,
        step: String,
        command: String,
        cwd: PathBuf,
        env: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container: Option<ContainerConfig>,
    },

    // === Notification effects ===
    /// Send a desktop notification
    Notify { title: String, message: String },
}

impl Effect {
    /// Effect name for log spans (e.g., "spawn_agent", "shell")
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit { .. } => "emit",
            Effect::SpawnAgent { .. } => "spawn_agent",
            Effect::SendToAgent { .. } => "send_to_agent",
            Effect::RespondToAgent { .. } => "respond_to_agent",
            Effect::KillAgent { .. } => "kill_agent",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::Shell { .. } => "shell",
            Effect::Notify { .. } => "notify",
        }
    }

    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit { event } => {
                vec![("event", event.log_summary())]
            }
            Effect::SpawnAgent { agent_id, agent_name, owner, workspace_path, command, cwd, .. } => {
                vec![
                    ("agent_id", agent_id.to_string()),
                    ("agent_name", agent_name.clone()),
                    ("owner", owner.to_string()),
                    ("workspace_path", workspace_path.display().to_string()),
                    ("command", command.clone()),
                    ("cwd", cwd.as_ref().map(|p| p.display().to_string()).unwrap_or_default()),
                ]
            }
            Effect::SendToAgent { agent_id, .. } => vec![("agent_id", agent_id.to_string())],
            Effect::RespondToAgent { agent_id, .. } => vec![("agent_id", agent_id.to_string())],
            Effect::KillAgent { agent_id } => vec![("agent_id", agent_id.to_string())],
            Effect::SetTimer { id, duration } => vec![
                ("timer_id", id.to_string()),
                ("duration_ms", duration.as_millis().to_string()),
            ],
            Effect::CancelTimer { id } => vec![("timer_id", id.to_string())],
            Effect::Shell { owner, step, cwd, .. } => {
                let mut fields = vec![("step", step.clone()), ("cwd", cwd.display().to_string())];
                if let Some(ref o) = owner {
                    fields.insert(0, ("owner", o.to_string()));
                }
                fields
            }
            Effect::Notify { title, .. } => vec![("title", title.clone())],
        }
    }

    /// Whether to show both 'started' and 'completed' or just 'executed',
    /// to control the verbosity for frequent events.
    pub fn verbose(&self) -> bool {
        match self {
            Effect::Emit { .. } => false,
            Effect::SetTimer { .. } => false,
            Effect::CancelTimer { .. } => false,
            _ => true,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        duration.as_millis().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
