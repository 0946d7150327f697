//! §4.5 manual evaluation trigger: `coordinator evaluate` queues an event,
//! the coordinator debounces then shells out to the configured LLM command,
//! and the parsed `REASONING:`/`CONFIDENCE:` footer lands in history.
//!
//! The LLM command here is a throwaway shell script standing in for the
//! real external model process — the same seam `ProcessLlmClient` uses in
//! production, just pointed at something deterministic.

use std::fs;
use std::os::unix::fs::PermissionsExt;

use crate::prelude::*;

fn write_fake_llm(ws: &Workspace) -> std::path::PathBuf {
    let script = ws.workspace_root().join("fake-llm.sh");
    fs::write(
        &script,
        "#!/bin/sh\ncat >/dev/null\necho 'evaluation complete'\necho 'REASONING: ready tasks outnumber busy agents'\necho 'CONFIDENCE: 0.82'\n",
    )
    .expect("write fake llm script");
    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();
    script
}

#[test]
fn manual_evaluation_populates_history_with_reasoning_and_confidence() {
    let ws = Workspace::new();
    let script = write_fake_llm(&ws);
    start_daemon_with_fake_llm(&ws, &script);

    let session = ws.approved_session();
    ws.oj(&["coordinator", "evaluate", &session, "--reason", "manual check"]).passes();

    let found = wait_for(WAIT_MAX_MS, || {
        let history = ws.oj(&["coordinator", "history", &session]).passes().json();
        history["entries"]
            .as_array()
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    });
    assert!(found, "coordinator history should gain an entry after a manual evaluation");

    let history = ws.oj(&["coordinator", "history", &session]).passes().json();
    let entry = &history["entries"][0];
    assert_eq!(entry["reasoning"], "ready tasks outnumber busy agents");
    assert!((entry["confidence"].as_f64().unwrap() - 0.82).abs() < 1e-6);

    ws.stop_daemon();
}

/// Starts the daemon with `OJ_LLM_COMMAND` and a short debounce so the
/// evaluation fires within the test's wait window, bypassing
/// `Workspace::start_daemon`'s fixed env set.
fn start_daemon_with_fake_llm(ws: &Workspace, script: &std::path::Path) {
    use assert_cmd::Command;

    let mut cmd = Command::cargo_bin("oj").unwrap();
    cmd.envs([
        ("OJ_STATE_DIR", ws.state_dir().to_string_lossy().into_owned()),
        ("OJ_WORKSPACE_ROOT", ws.workspace_root().to_string_lossy().into_owned()),
        ("OJ_SOCKET_PATH", ws.socket_path().to_string_lossy().into_owned()),
        ("OJ_CONFIG_PATH", ws.state_dir().join("config.toml").to_string_lossy().into_owned()),
        ("OJ_LLM_COMMAND", script.to_string_lossy().into_owned()),
        ("OJ_DEBOUNCE_MS", "50".to_string()),
        ("OJ_MAX_WAIT_MS", "200".to_string()),
        ("OJ_COOLDOWN_MS", "0".to_string()),
    ]);
    cmd.args(["daemon", "start"]);
    let output = cmd.output().expect("spawn oj daemon start");
    assert!(output.status.success(), "daemon start failed: {}", String::from_utf8_lossy(&output.stderr));

    let up = wait_for(WAIT_MAX_MS, || ws.oj_raw(&["daemon", "status"]).passes().stdout().contains("running"));
    assert!(up, "daemon did not report running status in time");
}
