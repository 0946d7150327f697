// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between [`CoordinatorAgent`](super::CoordinatorAgent) and the
//! actual language model. The model itself is out of scope here — it's an
//! external collaborator the LLM issues shell commands to the daemon's own
//! CLI through, not something whose output we parse into a structured plan.
//! All we extract on this side is enough to keep an audit trail: the raw
//! text (for the log files) and the `REASONING:`/`CONFIDENCE:` footer (for
//! the history ledger).

use async_trait::async_trait;
use oj_core::SessionId;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// The assembled input for one coordinator evaluation (§4.5.1).
#[derive(Debug, Clone)]
pub struct CoordinatorPrompt {
    pub session: SessionId,
    pub eval_id: String,
    pub triggering_event: String,
    pub text: String,
}

/// Raw model output plus whatever we could parse out of its footer.
#[derive(Debug, Clone)]
pub struct CoordinatorOutput {
    pub raw: String,
}

impl CoordinatorOutput {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Pull the `REASONING:` block and `CONFIDENCE:` float out of the
    /// footer the instruction template asks for (§4.5.1 item 6). Either can
    /// be absent — a malformed or truncated response still gets logged, it
    /// just contributes an empty history entry.
    pub fn reasoning(&self) -> Option<String> {
        extract_field(&self.raw, "REASONING:")
    }

    pub fn confidence(&self) -> Option<f32> {
        extract_field(&self.raw, "CONFIDENCE:").and_then(|s| s.trim().parse().ok())
    }
}

fn extract_field(raw: &str, label: &str) -> Option<String> {
    let start = raw.find(label)? + label.len();
    let rest = &raw[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    let value = rest[..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("coordinator evaluation timed out after {0:?}")]
    Timeout(Duration),
    #[error("coordinator evaluation failed: {0}")]
    Failed(String),
}

/// The model call this daemon needs a real seam for. Evaluations are
/// fire-and-forget from the caller's perspective (§4.5): failures are
/// retried by [`super::CoordinatorAgent`], not surfaced to whatever queued
/// the triggering event.
#[async_trait]
pub trait LlmClient: Send + Sync + 'static {
    async fn evaluate(&self, prompt: CoordinatorPrompt, timeout: Duration) -> Result<CoordinatorOutput, LlmError>;
}

/// Scripted [`LlmClient`] for the debounce/batch tests (§8) — the same role
/// `oj-adapters`'s `FakeAdapter` plays for agent processes.
pub struct FakeLlmClient {
    responses: parking_lot::Mutex<VecDeque<Result<CoordinatorOutput, LlmError>>>,
    seen: parking_lot::Mutex<Vec<CoordinatorPrompt>>,
}

impl FakeLlmClient {
    pub fn new() -> Self {
        Self { responses: parking_lot::Mutex::new(VecDeque::new()), seen: parking_lot::Mutex::new(Vec::new()) }
    }

    /// Queue the next `evaluate` call's result, FIFO. Calls beyond the last
    /// queued response get a generic failure, matching a real client that
    /// ran out of retries.
    pub fn push_response(&self, result: Result<CoordinatorOutput, LlmError>) {
        self.responses.lock().push_back(result);
    }

    pub fn prompts_seen(&self) -> Vec<CoordinatorPrompt> {
        self.seen.lock().clone()
    }
}

impl Default for FakeLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn evaluate(&self, prompt: CoordinatorPrompt, _timeout: Duration) -> Result<CoordinatorOutput, LlmError> {
        self.seen.lock().push(prompt);
        match self.responses.lock().pop_front() {
            Some(result) => result,
            None => Err(LlmError::Failed("no scripted response queued".to_string())),
        }
    }
}

/// Spawns the configured LLM command fresh for every evaluation, feeds it
/// the prompt text on stdin, and captures whatever it writes to stdout —
/// the same one-shot-process shape `oj-adapters`'s [`ProcessAdapter`] uses
/// for agent CLIs, just without a long-lived handle to hold onto between
/// calls (§4.5: an evaluation is a single request/response round trip, not
/// a session).
pub struct ProcessLlmClient {
    command: String,
    args: Vec<String>,
}

impl ProcessLlmClient {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self { command: command.into(), args }
    }
}

#[async_trait]
impl LlmClient for ProcessLlmClient {
    async fn evaluate(&self, prompt: CoordinatorPrompt, timeout: Duration) -> Result<CoordinatorOutput, LlmError> {
        let run = async {
            let mut command = tokio::process::Command::new(&self.command);
            command
                .args(&self.args)
                .stdin(std::process::Stdio::piped())
                .stdout(std::process::Stdio::piped())
                .stderr(std::process::Stdio::piped())
                .kill_on_drop(true);

            let mut child = command
                .spawn()
                .map_err(|e| LlmError::Failed(format!("{}: {e}", self.command)))?;

            if let Some(mut stdin) = child.stdin.take() {
                use tokio::io::AsyncWriteExt;
                stdin
                    .write_all(prompt.text.as_bytes())
                    .await
                    .map_err(|e| LlmError::Failed(format!("writing prompt: {e}")))?;
            }

            let output = child
                .wait_with_output()
                .await
                .map_err(|e| LlmError::Failed(format!("waiting on {}: {e}", self.command)))?;

            if !output.status.success() {
                return Err(LlmError::Failed(format!(
                    "{} exited with {}: {}",
                    self.command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }

            Ok(CoordinatorOutput::new(String::from_utf8_lossy(&output.stdout).into_owned()))
        };

        match tokio::time::timeout(timeout, run).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(timeout)),
        }
    }
}

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
