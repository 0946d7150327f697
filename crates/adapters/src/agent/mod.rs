// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The contract between the control plane and whatever actually runs an
//! agent CLI process. Everything downstream of this trait — how the agent
//! is launched, how its terminal state is sampled, how prompts are
//! delivered — is this module's concern; `AgentPool`/`UnifiedCoordinator`
//! only ever see [`AgentAdapter`].

mod process;

pub use process::ProcessAdapter;

use async_trait::async_trait;
use oj_core::{AgentId, AgentState, Event, OwnerId, PromptResponse};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum AgentAdapterError {
    #[error("agent not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("session error: {0}")]
    SessionError(String),
}

/// Parameters needed to spawn a fresh agent process.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub agent_id: AgentId,
    pub owner: OwnerId,
    pub workspace_path: PathBuf,
    pub prompt: String,
    /// CLI binary invoked as the agent (e.g. the external coding-agent command).
    pub command: String,
    pub args: Vec<String>,
}

/// Parameters needed to reconnect to an agent process that already exists
/// (e.g. after a daemon restart).
#[derive(Debug, Clone)]
pub struct AgentReconnectConfig {
    pub agent_id: AgentId,
    pub owner: OwnerId,
    pub workspace_path: PathBuf,
}

/// A live handle to a spawned or reconnected agent.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    pub agent_id: AgentId,
    pub workspace_path: PathBuf,
}

impl AgentHandle {
    pub fn new(agent_id: AgentId, workspace_path: PathBuf) -> Self {
        Self { agent_id, workspace_path }
    }
}

/// The external agent CLI process runner contract.
///
/// Implementations own the lifecycle of one external process per
/// [`AgentId`] and translate its observable state into [`Event`]s pushed
/// onto `event_tx`. The control plane never spawns or signals a process
/// directly — it only calls through this trait.
#[async_trait]
pub trait AgentAdapter: Clone + Send + Sync + 'static {
    async fn spawn(
        &self,
        config: AgentConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError>;

    async fn reconnect(
        &self,
        config: AgentReconnectConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError>;

    /// Deliver free-form input (a nudge) to a working agent.
    async fn send(&self, agent_id: &AgentId, input: &str) -> Result<(), AgentAdapterError>;

    /// Deliver a structured response to a pending permission/plan/question prompt.
    async fn respond(
        &self,
        agent_id: &AgentId,
        response: &PromptResponse,
    ) -> Result<(), AgentAdapterError>;

    async fn kill(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError>;

    async fn get_state(&self, agent_id: &AgentId) -> Result<AgentState, AgentAdapterError>;

    async fn is_alive(&self, agent_id: &AgentId) -> bool;

    async fn capture_output(
        &self,
        agent_id: &AgentId,
        lines: u32,
    ) -> Result<String, AgentAdapterError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
