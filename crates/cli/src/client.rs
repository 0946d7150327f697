// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DaemonClient`: the CLI's side of the Command RPC channel `oj-wire`
//! defines. A connection is one Unix socket, framed length-prefixed JSON;
//! every call is a single request/response round trip.

use std::path::PathBuf;
use std::time::Duration;

use oj_wire::{decode, encode, read_message, write_message, CommandResult, ProtocolError, Response};
use thiserror::Error;
use tokio::net::UnixStream;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running")]
    NotRunning,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("failed to start daemon: {0}")]
    Spawn(String),
    #[error("daemon returned an error: {0}")]
    Remote(String),
    #[error("unexpected response from daemon")]
    UnexpectedResponse,
}

impl ClientError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::NotRunning)
    }
}

/// A connected handle to `ojd`'s command socket.
pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    /// Connect to an already-running daemon. Does not start one.
    pub async fn connect() -> Result<Self, ClientError> {
        let path = oj_daemon::env::socket_path().map_err(|_| ClientError::NotRunning)?;
        let stream = UnixStream::connect(&path).await.map_err(|_| ClientError::NotRunning)?;
        Ok(Self { stream })
    }

    /// Connect, spawning `ojd` in the background and waiting for it to come
    /// up if no daemon is currently listening.
    pub async fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect().await {
            return Ok(client);
        }

        let ojd_path = find_ojd_binary();
        let mut child = std::process::Command::new(&ojd_path)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| ClientError::Spawn(format!("{}: {e}", ojd_path.display())))?;

        // The daemon prints "READY" to stdout once its socket is bound; we
        // don't block on that line directly (it would tie us to the child's
        // stdout pipe for the rest of our process lifetime) — poll the
        // socket instead, which is the thing we actually need.
        let _ = child.stdout.take();

        for _ in 0..50 {
            if let Ok(client) = Self::connect().await {
                return Ok(client);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        Err(ClientError::Spawn(format!("{} did not become ready in time", ojd_path.display())))
    }

    /// Send one request and return its `CommandResult`. Out-of-band
    /// broadcast events arriving before the matching reply are discarded —
    /// callers that need to observe events use a separate subscribe path,
    /// not `send`.
    pub async fn send(&mut self, cmd: &str, params: serde_json::Value) -> Result<CommandResult, ClientError> {
        let id = Uuid::new_v4().to_string();
        let request = oj_wire::Request::new(id.clone(), cmd, params);
        let payload = encode(&request)?;
        write_message(&mut self.stream, &payload).await?;

        loop {
            let bytes = read_message(&mut self.stream).await?;
            let response: Response = decode(&bytes)?;
            match response {
                Response::Result(result) if result.id == id => {
                    return if result.success {
                        Ok(result)
                    } else {
                        Err(ClientError::Remote(result.error.clone().unwrap_or_default()))
                    };
                }
                Response::Result(_) | Response::Event(_) => continue,
                Response::Error { message } => return Err(ClientError::Remote(message)),
                Response::ShuttingDown => return Err(ClientError::Remote("daemon is shutting down".to_string())),
                Response::Ok | Response::Pong | Response::Hello { .. } => return Err(ClientError::UnexpectedResponse),
            }
        }
    }

    pub async fn ping(&mut self) -> Result<(), ClientError> {
        self.send("system.ping", serde_json::Value::Null).await?;
        Ok(())
    }

    /// Returns `(protocol_version, uptime_secs)`.
    pub async fn status(&mut self) -> Result<(String, u64), ClientError> {
        let result = self.send("system.status", serde_json::Value::Null).await?;
        let data = result.data.ok_or(ClientError::UnexpectedResponse)?;
        let version = data.get("protocolVersion").and_then(|v| v.as_str()).unwrap_or("unknown").to_string();
        let uptime = data.get("uptimeSecs").and_then(|v| v.as_u64()).unwrap_or(0);
        Ok((version, uptime))
    }

    pub async fn shutdown(&mut self) -> Result<(), ClientError> {
        self.send("system.shutdown", serde_json::Value::Null).await?;
        Ok(())
    }
}

/// Locate the `ojd` binary to spawn: a debug-build sibling in
/// `target/debug`, then a sibling of the running `oj` executable, then a
/// bare `PATH` lookup.
fn find_ojd_binary() -> PathBuf {
    let current_exe = std::env::current_exe().ok();

    let is_debug_build =
        current_exe.as_ref().and_then(|p| p.to_str()).map(|s| s.contains("target/debug")).unwrap_or(false);

    if is_debug_build {
        if let Some(manifest_dir) = std::env::var_os("CARGO_MANIFEST_DIR") {
            let dev_path = PathBuf::from(manifest_dir).parent().and_then(|p| p.parent()).map(|p| p.join("target/debug/ojd"));
            if let Some(path) = dev_path {
                if path.exists() {
                    return path;
                }
            }
        }
    }

    if let Some(ref exe) = current_exe {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("ojd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("ojd")
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
