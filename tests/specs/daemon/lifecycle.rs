//! Daemon start/stop/status lifecycle specs.

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running_before_start() {
    let ws = Workspace::new();
    ws.oj_raw(&["daemon", "status"]).passes().stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let ws = Workspace::new();
    ws.oj_raw(&["daemon", "start"]).passes().stdout_has("Daemon started");
    ws.stop_daemon();
}

#[test]
fn daemon_status_shows_running_after_start() {
    let ws = Workspace::new();
    ws.start_daemon();
    ws.oj_raw(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Version:")
        .stdout_has("Uptime:");
    ws.stop_daemon();
}

#[test]
fn daemon_start_is_idempotent() {
    let ws = Workspace::new();
    ws.start_daemon();
    ws.oj_raw(&["daemon", "start"]).passes().stdout_has("already running");
    ws.stop_daemon();
}

#[test]
fn daemon_stop_reports_success_then_not_running() {
    let ws = Workspace::new();
    ws.start_daemon();
    ws.oj_raw(&["daemon", "stop"]).passes().stdout_has("Daemon stopped");
    let down = wait_for(WAIT_MAX_MS, || {
        ws.oj_raw(&["daemon", "status"]).passes().stdout().contains("not running")
    });
    assert!(down, "daemon should report not running after stop");
}

#[test]
fn daemon_stop_without_a_running_daemon_is_a_no_op() {
    let ws = Workspace::new();
    ws.oj_raw(&["daemon", "stop"]).passes().stdout_has("Daemon not running");
}
