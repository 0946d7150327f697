// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj daemon` - start/stop/status/logs for the `ojd` process itself.

use std::process::Command;

use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{display_log, format_or_json, format_uptime, read_last_lines, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (foreground or background)
    Start {
        /// Run in the foreground instead of detaching
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Check daemon status
    Status,
    /// Stop and restart the daemon
    Restart,
    /// View daemon logs
    Logs {
        /// Number of recent lines to show
        #[arg(short = 'n', long, default_value_t = 200)]
        limit: usize,
        /// Show the whole file, ignoring --limit
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
        /// Keep printing new lines as they're written
        #[arg(long, short)]
        follow: bool,
    },
}

pub async fn run(args: DaemonArgs, format: OutputFormat) -> Result<(), ExitError> {
    match args.command {
        DaemonCommand::Start { foreground } => start(foreground, format).await,
        DaemonCommand::Stop => stop(format).await,
        DaemonCommand::Restart => restart(format).await,
        DaemonCommand::Status => status(format).await,
        DaemonCommand::Logs { limit, no_limit, follow } => logs(limit, no_limit, follow, format).await,
    }
}

async fn start(foreground: bool, format: OutputFormat) -> Result<(), ExitError> {
    if foreground {
        let ojd_path = find_ojd_binary_for_foreground();
        let status = Command::new(&ojd_path)
            .status()
            .map_err(|e| ExitError::new(1, format!("failed to run {}: {e}", ojd_path.display())))?;
        if !status.success() {
            return Err(ExitError::new(status.code().unwrap_or(1), format!("daemon exited with {status}")));
        }
        return Ok(());
    }

    if let Ok(mut client) = DaemonClient::connect().await {
        if let Ok((_, uptime)) = client.status().await {
            format_or_json(format, &serde_json::json!({"status": "already_running", "uptimeSecs": uptime}), || {
                println!("Daemon already running (uptime: {})", format_uptime(uptime))
            })?;
            return Ok(());
        }
    }

    DaemonClient::connect_or_start().await?;
    format_or_json(format, &serde_json::json!({"status": "started"}), || println!("Daemon started"))?;
    Ok(())
}

async fn stop(format: OutputFormat) -> Result<(), ExitError> {
    match DaemonClient::connect().await {
        Ok(mut client) => {
            client.shutdown().await?;
            format_or_json(format, &serde_json::json!({"status": "stopped"}), || println!("Daemon stopped"))?;
        }
        Err(_) => {
            format_or_json(format, &serde_json::json!({"status": "not_running"}), || println!("Daemon not running"))?;
        }
    }
    Ok(())
}

async fn restart(format: OutputFormat) -> Result<(), ExitError> {
    let was_running = DaemonClient::connect().await.is_ok();
    if was_running {
        stop(OutputFormat::Json).await.ok();
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }
    DaemonClient::connect_or_start().await?;
    format_or_json(format, &serde_json::json!({"status": "restarted"}), || println!("Daemon restarted"))?;
    Ok(())
}

async fn status(format: OutputFormat) -> Result<(), ExitError> {
    let mut client = match DaemonClient::connect().await {
        Ok(c) => c,
        Err(_) => {
            return format_or_json(format, &serde_json::json!({"status": "not_running"}), || {
                println!("Daemon not running")
            })
            .map_err(Into::into);
        }
    };
    let (version, uptime) = client.status().await?;
    let obj = serde_json::json!({
        "status": "running",
        "version": version,
        "uptimeSecs": uptime,
        "uptime": format_uptime(uptime),
    });
    format_or_json(format, &obj, || {
        println!("Status: running");
        println!("Version: {version}");
        println!("Uptime: {}", format_uptime(uptime));
    })?;
    Ok(())
}

async fn logs(limit: usize, no_limit: bool, follow: bool, format: OutputFormat) -> Result<(), ExitError> {
    let log_path = oj_daemon::env::log_dir()
        .map_err(|e| ExitError::new(1, format!("could not determine log directory: {e}")))?
        .join(oj_daemon::env::LOG_FILE_NAME);

    if !log_path.exists() {
        format_or_json(format, &serde_json::json!({"log_path": log_path.to_string_lossy(), "lines": Vec::<String>::new()}), || {
            println!("No log file found at {}", log_path.display())
        })?;
        return Ok(());
    }

    let content = if no_limit {
        std::fs::read_to_string(&log_path).map_err(|e| ExitError::new(1, e.to_string()))?
    } else {
        read_last_lines(&log_path, limit).map_err(|e| ExitError::new(1, e.to_string()))?
    };
    display_log(&log_path, &content, follow, format).await.map_err(|e| ExitError::new(1, e.to_string()))?;
    Ok(())
}

/// Foreground start doesn't go through `DaemonClient::connect_or_start`
/// (which backgrounds the child) — it needs the same binary lookup on its
/// own, sharing `DaemonClient`'s private resolution would just mean
/// exposing it; reimplementing the short version here keeps the client's
/// lookup an implementation detail.
fn find_ojd_binary_for_foreground() -> std::path::PathBuf {
    if let Some(dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(|p| p.to_path_buf())) {
        let sibling = dir.join("ojd");
        if sibling.exists() {
            return sibling;
        }
    }
    std::path::PathBuf::from("ojd")
}
