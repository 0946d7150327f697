// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DaemonConfig` (§1.1's ambient "Configuration" section): pool size, the
//! coordinator's timing constants (§4.5), the Unity-enabled flag, and the
//! LLM command this deployment invokes for evaluations — loaded from a TOML
//! file the way `oj-runbook` loads its own HCL/TOML definitions, then
//! overridden by environment variables the `cli` crate's `clap` flags set
//! before spawning the daemon process.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::coordinator::CoordinatorConfig;
use crate::env;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot resolve config path: {0}")]
    Env(#[from] env::EnvError),
    #[error("cannot read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("cannot parse config file {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
}

/// Raw TOML shape; every field optional so a partial file only overrides
/// what it names, leaving the rest at [`DaemonConfig::defaults`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct RawConfig {
    pool_size: Option<usize>,
    agent_roster: Option<Vec<String>>,
    agent_roles: Option<Vec<String>>,
    unity_enabled: Option<bool>,
    debounce_ms: Option<u64>,
    max_wait_ms: Option<u64>,
    cooldown_ms: Option<u64>,
    eval_timeout_secs: Option<u64>,
    decision_history_limit: Option<usize>,
    llm_command: Option<String>,
    llm_args: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub pool_size: usize,
    pub agent_roster: Vec<String>,
    pub agent_roles: Vec<String>,
    pub unity_enabled: bool,
    pub debounce: Duration,
    pub max_wait: Duration,
    pub cooldown: Duration,
    pub eval_timeout: Duration,
    pub decision_history_limit: usize,
    pub llm_command: String,
    pub llm_args: Vec<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let coordinator_defaults = CoordinatorConfig::default();
        Self {
            pool_size: 4,
            agent_roster: env::agent_roster(),
            agent_roles: env::agent_roles(),
            unity_enabled: false,
            debounce: coordinator_defaults.debounce,
            max_wait: coordinator_defaults.max_wait,
            cooldown: coordinator_defaults.cooldown,
            eval_timeout: coordinator_defaults.eval_timeout,
            decision_history_limit: coordinator_defaults.decision_history_limit,
            llm_command: "apc-llm".to_string(),
            llm_args: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Loads `<state_dir>/config.toml` (or `OJ_CONFIG_PATH`) if present,
    /// then applies the same environment variables a `clap`-parsed CLI flag
    /// would export before exec'ing the daemon. A missing file is not an
    /// error — every field simply keeps its built-in default.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::config_path()?;
        let raw = Self::read_raw(&path)?;
        Ok(Self::default().merge(raw).with_env_overrides())
    }

    fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
        if !path.exists() {
            return Ok(RawConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    fn merge(mut self, raw: RawConfig) -> Self {
        if let Some(v) = raw.pool_size {
            self.pool_size = v;
        }
        if let Some(v) = raw.agent_roster {
            self.agent_roster = v;
        }
        if let Some(v) = raw.agent_roles {
            self.agent_roles = v;
        }
        if let Some(v) = raw.unity_enabled {
            self.unity_enabled = v;
        }
        if let Some(v) = raw.debounce_ms {
            self.debounce = Duration::from_millis(v);
        }
        if let Some(v) = raw.max_wait_ms {
            self.max_wait = Duration::from_millis(v);
        }
        if let Some(v) = raw.cooldown_ms {
            self.cooldown = Duration::from_millis(v);
        }
        if let Some(v) = raw.eval_timeout_secs {
            self.eval_timeout = Duration::from_secs(v);
        }
        if let Some(v) = raw.decision_history_limit {
            self.decision_history_limit = v;
        }
        if let Some(v) = raw.llm_command {
            self.llm_command = v;
        }
        if let Some(v) = raw.llm_args {
            self.llm_args = v;
        }
        self
    }

    /// Environment variables always win over the TOML file, matching
    /// `oj-daemon`'s existing env-first precedence for every other setting
    /// in this module.
    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("OJ_POOL_SIZE") {
            if let Ok(n) = v.parse() {
                self.pool_size = n;
            }
        }
        if let Ok(v) = std::env::var("OJ_UNITY_ENABLED") {
            self.unity_enabled = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("OJ_DEBOUNCE_MS") {
            if let Ok(n) = v.parse() {
                self.debounce = Duration::from_millis(n);
            }
        }
        if let Ok(v) = std::env::var("OJ_MAX_WAIT_MS") {
            if let Ok(n) = v.parse() {
                self.max_wait = Duration::from_millis(n);
            }
        }
        if let Ok(v) = std::env::var("OJ_COOLDOWN_MS") {
            if let Ok(n) = v.parse() {
                self.cooldown = Duration::from_millis(n);
            }
        }
        if let Ok(v) = std::env::var("OJ_EVAL_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.eval_timeout = Duration::from_secs(n);
            }
        }
        if let Ok(v) = std::env::var("OJ_DECISION_HISTORY_LIMIT") {
            if let Ok(n) = v.parse() {
                self.decision_history_limit = n;
            }
        }
        if let Ok(v) = std::env::var("OJ_LLM_COMMAND") {
            self.llm_command = v;
        }
        if let Ok(v) = std::env::var("OJ_LLM_ARGS") {
            self.llm_args = v.split(',').map(str::to_string).filter(|s| !s.is_empty()).collect();
        }
        self.agent_roster = env::agent_roster();
        self.agent_roles = env::agent_roles();
        self
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            debounce: self.debounce,
            max_wait: self.max_wait,
            cooldown: self.cooldown,
            eval_timeout: self.eval_timeout,
            decision_history_limit: self.decision_history_limit,
            unity_enabled: self.unity_enabled,
            ..CoordinatorConfig::default()
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
