// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Odd Jobs Daemon (ojd)
//!
//! The process that owns the control plane: loads persisted state, wires
//! `oj-engine`'s runtimes and `oj-daemon`'s own coordinator/listener glue
//! together, then serves RPC over a Unix socket until asked to stop.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use oj_adapters::{DesktopNotifyAdapter, ProcessAdapter};
use oj_core::{AgentName, RoleId, SystemClock};
use oj_daemon::coordinator::{CoordinatorAgent, ProcessLlmClient};
use oj_daemon::effects::{spawn_agent_event_forwarder, EffectExecutor, NullTimerSink};
use oj_daemon::idle_monitor::IdleMonitor;
use oj_daemon::listener::{ListenCtx, Listener};
use oj_daemon::unified::UnifiedCoordinator;
use oj_daemon::{env, DaemonConfig};
use oj_engine::{AgentPoolRuntime, CompletionRendezvous, EventBroadcaster, RoleRegistry, TaskStore, WorkflowEngine, WorkflowRegistry};
use oj_storage::{StateLayout, StateStore};
use parking_lot::Mutex;
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{watch, Notify};
use tracing::{error, info};

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
/// Number of rotated log files kept (daemon.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("ojd {}", env::PROTOCOL_VERSION);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("ojd {}", env::PROTOCOL_VERSION);
                println!("Odd Jobs Daemon - owns the control plane's event loop and agent pool");
                println!();
                println!("USAGE:\n    ojd");
                println!();
                println!("The daemon is typically started by the `oj` CLI and should not be");
                println!("invoked directly. It listens on a Unix socket for commands from `oj`.");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: ojd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let log_path = env::log_dir()?.join(env::LOG_FILE_NAME);
    rotate_log_if_needed(&log_path);
    let _log_guard = setup_logging(&log_path)?;

    info!("starting ojd");

    let config = DaemonConfig::load()?;
    let pid_path = env::pid_file()?;
    write_pid_file(&pid_path)?;

    let layout = StateLayout::new(env::workspace_root());
    let storage = Arc::new(StateStore::new(layout));

    let roles = RoleRegistry::new(config.agent_roles.iter().map(|r| RoleId::new(r.clone())));
    let roster: Vec<AgentName> = config.agent_roster.iter().map(|n| AgentName::new(n.clone())).collect();
    let pool = match storage.load_agent_pool() {
        Ok(file) if !file.entries.is_empty() => Arc::new(AgentPoolRuntime::from_file(SystemClock, file, roles)),
        _ => Arc::new(AgentPoolRuntime::new(SystemClock, roster, roles)),
    };

    let tasks = Arc::new(TaskStore::new());
    let events = Arc::new(EventBroadcaster::new());
    let registry = WorkflowRegistry::with_defaults();
    let engine = Arc::new(WorkflowEngine::new(registry, Arc::clone(&events)));
    let rendezvous = Arc::new(CompletionRendezvous::new());

    let (agent_event_tx, agent_event_rx) = tokio::sync::mpsc::channel(256);
    spawn_agent_event_forwarder(agent_event_rx, Arc::clone(&events));

    let effects = Arc::new(EffectExecutor::new(
        ProcessAdapter::new(),
        DesktopNotifyAdapter::new(),
        Arc::clone(&events),
        agent_event_tx,
        Arc::new(NullTimerSink),
    ));

    let llm_client = Arc::new(ProcessLlmClient::new(config.llm_command.clone(), config.llm_args.clone()));
    let coordinator = Arc::new(CoordinatorAgent::new(
        config.coordinator_config(),
        SystemClock,
        llm_client,
        Arc::clone(&storage),
        Arc::clone(&tasks),
        Arc::clone(&pool),
        Arc::clone(&engine),
    ));

    // On restart no workflow from a prior run is still live — every
    // allocated/busy agent in the persisted snapshot is an orphan.
    pool.release_orphan_allocated_agents(&HashSet::new());

    let unified = Arc::new(UnifiedCoordinator::new(
        SystemClock,
        Arc::clone(&storage),
        Arc::clone(&tasks),
        Arc::clone(&pool),
        Arc::clone(&engine),
        Arc::clone(&coordinator),
        Arc::clone(&rendezvous),
        Arc::clone(&effects),
        Arc::clone(&events),
    ));
    unified.spawn_cleanup_loop();
    unified.spawn_workflow_completion_listener();

    let (ready_tx, ready_rx) = watch::channel(false);
    let idle_monitor = Arc::new(IdleMonitor::new(
        SystemClock,
        Arc::clone(&storage),
        Arc::clone(&tasks),
        Arc::clone(&pool),
        Arc::clone(&engine),
        Arc::clone(&coordinator),
        ready_rx,
    ));
    idle_monitor.spawn();

    let socket_path = env::socket_path()?;
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let unix_listener = UnixListener::bind(&socket_path)?;

    let shutdown_notify = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        unified: Arc::clone(&unified),
        coordinator: Arc::clone(&coordinator),
        tasks: Arc::clone(&tasks),
        pool: Arc::clone(&pool),
        engine: Arc::clone(&engine),
        rendezvous: Arc::clone(&rendezvous),
        storage: Arc::clone(&storage),
        events: Arc::clone(&events),
        clock: SystemClock,
        start_time: Instant::now(),
        shutdown: Arc::clone(&shutdown_notify),
        decisions: Mutex::new(std::collections::HashMap::new()),
    });
    let listener = Listener::new(unix_listener, Arc::clone(&ctx));
    tokio::spawn(listener.run());

    let _ = ready_tx.send(true);
    idle_monitor.startup_trigger();

    info!(socket = %socket_path.display(), "ojd ready, listening for connections");
    println!("READY");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = shutdown_notify.notified() => info!("shutdown requested via rpc"),
        _ = sigterm.recv() => info!("received sigterm, shutting down"),
        _ = sigint.recv() => info!("received sigint, shutting down"),
    }

    unified.shutdown().await;
    if let Err(err) = storage.save_agent_pool(&pool.snapshot()) {
        error!(%err, "failed to persist agent pool snapshot on shutdown");
    }
    let _ = std::fs::remove_file(&socket_path);
    let _ = std::fs::remove_file(&pid_path);

    info!("ojd stopped");
    Ok(())
}

fn setup_logging(log_path: &std::path::Path) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = log_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new(env::LOG_FILE_NAME));
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();
    Ok(guard)
}

/// Rotates `daemon.log` -> `.1` -> `.2` -> `.3` if it has grown past
/// [`MAX_LOG_SIZE`]. Best-effort: a failure here must not stop startup.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }
    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn write_pid_file(path: &std::path::Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, std::process::id().to_string())
}
