// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-backed [`AgentAdapter`]: spawns the configured agent CLI as a
//! child process, writes prompts/responses to its stdin, and watches its
//! exit status on a background task to emit [`Event`]s.
//!
//! This is deliberately the simplest adapter that satisfies the contract —
//! no PTY, no sidecar, no container runtime. Richer backends (containerized
//! or remote execution) can implement [`AgentAdapter`] the same way without
//! the rest of the control plane noticing.

use super::{AgentAdapter, AgentAdapterError, AgentConfig, AgentHandle, AgentReconnectConfig};
use async_trait::async_trait;
use oj_core::{AgentError, AgentId, AgentState, Event, OwnerId, PromptResponse};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Child;
use tokio::sync::mpsc;

struct RunningAgent {
    child: Child,
    owner: OwnerId,
    last_output: Arc<Mutex<String>>,
}

#[derive(Clone, Default)]
pub struct ProcessAdapter {
    agents: Arc<Mutex<HashMap<AgentId, RunningAgent>>>,
}

impl ProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgentAdapter for ProcessAdapter {
    async fn spawn(
        &self,
        config: AgentConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError> {
        let mut command = tokio::process::Command::new(&config.command);
        command
            .args(&config.args)
            .current_dir(&config.workspace_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| AgentAdapterError::SpawnFailed(format!("{}: {e}", config.command)))?;

        let mut stdin = child.stdin.take();
        if let Some(stdin) = stdin.as_mut() {
            let _ = stdin.write_all(config.prompt.as_bytes()).await;
        }

        let last_output = Arc::new(Mutex::new(String::new()));
        let stdout = child.stdout.take();
        spawn_watcher(
            config.agent_id.clone(),
            config.owner.clone(),
            stdout,
            last_output.clone(),
            event_tx.clone(),
        );

        let handle = AgentHandle::new(config.agent_id.clone(), config.workspace_path.clone());
        self.agents.lock().insert(
            config.agent_id,
            RunningAgent { child, owner: config.owner, last_output },
        );
        Ok(handle)
    }

    async fn reconnect(
        &self,
        config: AgentReconnectConfig,
        _event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError> {
        // A process-backed agent dies with its daemon; there is nothing to
        // reattach to after a restart.
        Err(AgentAdapterError::NotFound(format!(
            "no running process for agent {} to reconnect to",
            config.agent_id
        )))
    }

    async fn send(&self, agent_id: &AgentId, input: &str) -> Result<(), AgentAdapterError> {
        let mut agents = self.agents.lock();
        let agent = agents
            .get_mut(agent_id)
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))?;
        if let Some(stdin) = agent.child.stdin.as_mut() {
            stdin
                .try_write(format!("{input}\n").as_bytes())
                .map_err(|e| AgentAdapterError::SessionError(e.to_string()))?;
        }
        Ok(())
    }

    async fn respond(
        &self,
        agent_id: &AgentId,
        response: &PromptResponse,
    ) -> Result<(), AgentAdapterError> {
        let body = serde_json::to_string(response)
            .map_err(|e| AgentAdapterError::SessionError(e.to_string()))?;
        self.send(agent_id, &body).await
    }

    async fn kill(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError> {
        let mut agent = self
            .agents
            .lock()
            .remove(agent_id)
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))?;
        let _ = agent.child.start_kill();
        Ok(())
    }

    async fn get_state(&self, agent_id: &AgentId) -> Result<AgentState, AgentAdapterError> {
        let mut agents = self.agents.lock();
        let agent = agents
            .get_mut(agent_id)
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))?;
        match agent.child.try_wait() {
            Ok(Some(status)) => Ok(AgentState::Exited { exit_code: status.code() }),
            Ok(None) => Ok(AgentState::Working),
            Err(e) => Err(AgentAdapterError::SessionError(e.to_string())),
        }
    }

    async fn is_alive(&self, agent_id: &AgentId) -> bool {
        let mut agents = self.agents.lock();
        match agents.get_mut(agent_id) {
            Some(agent) => matches!(agent.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    async fn capture_output(
        &self,
        agent_id: &AgentId,
        lines: u32,
    ) -> Result<String, AgentAdapterError> {
        let agents = self.agents.lock();
        let agent = agents
            .get(agent_id)
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))?;
        let buf = agent.last_output.lock();
        Ok(tail_lines(&buf, lines as usize))
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(n);
    all[start..].join("\n")
}

fn spawn_watcher(
    agent_id: AgentId,
    owner: OwnerId,
    stdout: Option<tokio::process::ChildStdout>,
    last_output: Arc<Mutex<String>>,
    event_tx: mpsc::Sender<Event>,
) {
    let Some(stdout) = stdout else { return };
    tokio::spawn(async move {
        use tokio::io::{AsyncBufReadExt, BufReader};
        let mut lines = BufReader::new(stdout).lines();
        let _ = event_tx.send(Event::AgentWorking { agent_id: agent_id.clone(), owner: owner.clone() }).await;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let mut buf = last_output.lock();
                    buf.push_str(&line);
                    buf.push('\n');
                    if buf.len() > 64 * 1024 {
                        let trimmed = buf.split_off(buf.len() - 32 * 1024);
                        *buf = trimmed;
                    }
                }
                Ok(None) => {
                    let _ = event_tx
                        .send(Event::AgentExited { agent_id: agent_id.clone(), exit_code: None, owner: owner.clone() })
                        .await;
                    break;
                }
                Err(e) => {
                    let _ = event_tx
                        .send(Event::AgentFailed {
                            agent_id: agent_id.clone(),
                            error: AgentError::Other(e.to_string()),
                            owner: owner.clone(),
                        })
                        .await;
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
