// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`AgentAdapter`] for tests that exercise `AgentPool`/
//! `UnifiedCoordinator` wiring without spawning real processes.

use super::{AgentAdapter, AgentAdapterError, AgentConfig, AgentHandle, AgentReconnectConfig};
use async_trait::async_trait;
use oj_core::{AgentId, AgentState, Event, PromptResponse};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone, Default)]
pub struct FakeAdapter {
    state: Arc<Mutex<HashMap<AgentId, AgentState>>>,
}

impl FakeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force an agent into a specific state, as if its adapter had observed it.
    pub fn set_state(&self, agent_id: &AgentId, state: AgentState) {
        self.state.lock().insert(agent_id.clone(), state);
    }
}

#[async_trait]
impl AgentAdapter for FakeAdapter {
    async fn spawn(
        &self,
        config: AgentConfig,
        _event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError> {
        self.state.lock().insert(config.agent_id.clone(), AgentState::Working);
        Ok(AgentHandle::new(config.agent_id, config.workspace_path))
    }

    async fn reconnect(
        &self,
        config: AgentReconnectConfig,
        _event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError> {
        self.state.lock().insert(config.agent_id.clone(), AgentState::Working);
        Ok(AgentHandle::new(config.agent_id, config.workspace_path))
    }

    async fn send(&self, agent_id: &AgentId, _input: &str) -> Result<(), AgentAdapterError> {
        self.state
            .lock()
            .get(agent_id)
            .map(|_| ())
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))
    }

    async fn respond(
        &self,
        agent_id: &AgentId,
        _response: &PromptResponse,
    ) -> Result<(), AgentAdapterError> {
        self.send(agent_id, "").await
    }

    async fn kill(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError> {
        self.state
            .lock()
            .remove(agent_id)
            .map(|_| ())
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))
    }

    async fn get_state(&self, agent_id: &AgentId) -> Result<AgentState, AgentAdapterError> {
        self.state
            .lock()
            .get(agent_id)
            .cloned()
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))
    }

    async fn is_alive(&self, agent_id: &AgentId) -> bool {
        self.state.lock().contains_key(agent_id)
    }

    async fn capture_output(
        &self,
        agent_id: &AgentId,
        _lines: u32,
    ) -> Result<String, AgentAdapterError> {
        self.state
            .lock()
            .get(agent_id)
            .map(|s| s.to_string())
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))
    }
}
