// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Protocol version: crate version plus the git commit it was built from.
pub const PROTOCOL_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("cannot resolve state directory: HOME is not set and OJ_STATE_DIR/XDG_STATE_HOME are unset")]
    NoStateDir,
}

/// Resolve the state directory: `OJ_STATE_DIR` > `XDG_STATE_HOME/oj` > `~/.local/state/oj`.
pub fn state_dir() -> Result<PathBuf, EnvError> {
    if let Ok(dir) = std::env::var("OJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("oj"));
    }
    let home = std::env::var("HOME").map_err(|_| EnvError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/oj"))
}

/// Workspace root holding the plan/task state JSON files. Distinct from
/// `state_dir`, which holds the daemon's own socket/lock/log files:
/// `OJ_WORKSPACE_ROOT` > cwd.
pub fn workspace_root() -> PathBuf {
    std::env::var("OJ_WORKSPACE_ROOT").map(PathBuf::from).unwrap_or_else(|_| {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    })
}

/// Read/write timeout applied to a single IPC request/response frame.
pub fn ipc_timeout() -> Duration {
    std::env::var("OJ_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// How long graceful shutdown waits for in-flight work to wind down before
/// forcing the process to exit.
pub fn drain_timeout() -> Duration {
    std::env::var("OJ_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Timer check interval override, used in place of the coordinator's
/// built-in intervals when set (mainly for tests driving the clock by hand).
pub fn timer_check_ms() -> Option<Duration> {
    std::env::var("OJ_TIMER_CHECK_MS").ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Comma-separated agent names making up the shared pool roster.
/// Defaults to a small fixed roster when unset.
pub fn agent_roster() -> Vec<String> {
    std::env::var("OJ_AGENT_ROSTER")
        .ok()
        .map(|s| s.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_else(|| vec!["agent-1".to_string(), "agent-2".to_string(), "agent-3".to_string(), "agent-4".to_string()])
}

/// Comma-separated role ids the pool will accept in `allocate`.
pub fn agent_roles() -> Vec<String> {
    std::env::var("OJ_AGENT_ROLES")
        .ok()
        .map(|s| s.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_else(|| vec!["implementer".to_string(), "reviewer".to_string(), "planner".to_string()])
}

/// Path of the Unix domain socket the daemon listens on: `OJ_SOCKET_PATH` >
/// `<state_dir>/daemon.sock`. Non-Unix targets would substitute a named pipe
/// here; this workspace only builds for Unix hosts.
pub fn socket_path() -> Result<PathBuf, EnvError> {
    if let Ok(path) = std::env::var("OJ_SOCKET_PATH") {
        return Ok(PathBuf::from(path));
    }
    Ok(state_dir()?.join("daemon.sock"))
}

/// The daemon's own PID file, used by the CLI to detect a running instance
/// without going through the socket (e.g. to decide whether `daemon start`
/// has anything to do).
pub fn pid_file() -> Result<PathBuf, EnvError> {
    Ok(state_dir()?.join("daemon.pid"))
}

/// Where the daemon's own structured log file is written
/// (`tracing-appender`'s rotation target).
pub fn log_dir() -> Result<PathBuf, EnvError> {
    Ok(state_dir()?.join("logs"))
}

pub const LOG_FILE_NAME: &str = "daemon.log";

/// TOML config file path: `OJ_CONFIG_PATH` > `<state_dir>/config.toml`.
pub fn config_path() -> Result<PathBuf, EnvError> {
    if let Ok(path) = std::env::var("OJ_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }
    Ok(state_dir()?.join("config.toml"))
}
