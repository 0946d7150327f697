//! CLI help/version output specs. None of these touch the daemon.

use crate::prelude::*;

#[test]
fn oj_no_args_shows_usage() {
    let ws = Workspace::new();
    ws.oj_raw(&[]).fails().stderr_has("Usage:");
}

#[test]
fn oj_help_shows_usage() {
    let ws = Workspace::new();
    ws.oj_raw(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn oj_help_lists_subcommands() {
    let ws = Workspace::new();
    ws.oj_raw(&["--help"])
        .passes()
        .stdout_has("session")
        .stdout_has("task")
        .stdout_has("workflow")
        .stdout_has("pool")
        .stdout_has("coordinator")
        .stdout_has("daemon");
}

#[test]
fn oj_version_shows_version() {
    let ws = Workspace::new();
    ws.oj_raw(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn oj_task_help_shows_subcommands() {
    let ws = Workspace::new();
    ws.oj_raw(&["task", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("create")
        .stdout_has("list");
}

#[test]
fn oj_daemon_help_shows_subcommands() {
    let ws = Workspace::new();
    ws.oj_raw(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status");
}
