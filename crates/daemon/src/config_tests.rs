// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::time::Duration;

fn clear_env() {
    for key in [
        "OJ_CONFIG_PATH",
        "OJ_POOL_SIZE",
        "OJ_UNITY_ENABLED",
        "OJ_DEBOUNCE_MS",
        "OJ_MAX_WAIT_MS",
        "OJ_COOLDOWN_MS",
        "OJ_EVAL_TIMEOUT_SECS",
        "OJ_DECISION_HISTORY_LIMIT",
        "OJ_LLM_COMMAND",
        "OJ_LLM_ARGS",
        "OJ_AGENT_ROSTER",
        "OJ_AGENT_ROLES",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn default_config_matches_coordinator_defaults() {
    clear_env();
    let cfg = DaemonConfig::default();
    assert_eq!(cfg.debounce, Duration::from_millis(2000));
    assert_eq!(cfg.cooldown, Duration::from_millis(10_000));
    assert!(!cfg.unity_enabled);
}

#[test]
#[serial]
fn missing_file_keeps_defaults() {
    clear_env();
    std::env::set_var("OJ_CONFIG_PATH", "/nonexistent/path/config.toml");
    let cfg = DaemonConfig::load().expect("load should tolerate a missing file");
    assert_eq!(cfg.pool_size, 4);
    clear_env();
}

#[test]
#[serial]
fn toml_file_overrides_defaults() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "pool_size = 9\nunity_enabled = true\ndebounce_ms = 500\n").expect("write");
    std::env::set_var("OJ_CONFIG_PATH", &path);

    let cfg = DaemonConfig::load().expect("load");
    assert_eq!(cfg.pool_size, 9);
    assert!(cfg.unity_enabled);
    assert_eq!(cfg.debounce, Duration::from_millis(500));
    clear_env();
}

#[test]
#[serial]
fn env_var_wins_over_toml_file() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "pool_size = 9\n").expect("write");
    std::env::set_var("OJ_CONFIG_PATH", &path);
    std::env::set_var("OJ_POOL_SIZE", "20");

    let cfg = DaemonConfig::load().expect("load");
    assert_eq!(cfg.pool_size, 20);
    clear_env();
}
