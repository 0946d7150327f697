// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout for persisted state, rooted at a workspace.
//!
//! ```text
//! <root>/_AiDevLog/Plans/<sessionId>/tasks.json
//! <root>/_AiDevLog/Plans/<sessionId>/workflow_history.json
//! <root>/_AiDevLog/Plans/<sessionId>/coordinator_history.json
//! <root>/_AiDevLog/Plans/<sessionId>/coordinators/<timestamp>_<evalId>_{prompt|output}.txt
//! <root>/_AiDevLog/Plans/<sessionId>/plan.md                 (owned externally, read-only)
//! <root>/.apc/sessions.json
//! <root>/.apc/agent_pool.json
//! ```
//!
//! The `plan.md` path is tracked (`PlanSession::plan_file_path`) but never
//! written by this crate — plan authoring belongs to the external planning
//! subsystem referenced only through its contract.

use oj_core::SessionId;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn plans_dir(&self) -> PathBuf {
        self.root.join("_AiDevLog").join("Plans")
    }

    pub fn session_dir(&self, session: &SessionId) -> PathBuf {
        self.plans_dir().join(session.as_str())
    }

    pub fn plan_file(&self, session: &SessionId) -> PathBuf {
        self.session_dir(session).join("plan.md")
    }

    pub fn tasks_file(&self, session: &SessionId) -> PathBuf {
        self.session_dir(session).join("tasks.json")
    }

    pub fn workflow_history_file(&self, session: &SessionId) -> PathBuf {
        self.session_dir(session).join("workflow_history.json")
    }

    pub fn coordinator_history_file(&self, session: &SessionId) -> PathBuf {
        self.session_dir(session).join("coordinator_history.json")
    }

    pub fn coordinators_dir(&self, session: &SessionId) -> PathBuf {
        self.session_dir(session).join("coordinators")
    }

    /// `<timestamp>_<evalId>_{prompt|output}.txt` audit log path.
    pub fn coordinator_audit_file(
        &self,
        session: &SessionId,
        timestamp_ms: u64,
        eval_id: &str,
        kind: &str,
    ) -> PathBuf {
        self.coordinators_dir(session).join(format!("{timestamp_ms}_{eval_id}_{kind}.txt"))
    }

    fn apc_dir(&self) -> PathBuf {
        self.root.join(".apc")
    }

    pub fn sessions_file(&self) -> PathBuf {
        self.apc_dir().join("sessions.json")
    }

    pub fn agent_pool_file(&self) -> PathBuf {
        self.apc_dir().join("agent_pool.json")
    }

    pub fn paused_processes_dir(&self) -> PathBuf {
        self.apc_dir().join(".paused_processes")
    }

    pub fn context_dir(&self) -> PathBuf {
        self.root.join("_AiDevLog").join("Context")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_dir_nests_under_plans() {
        let layout = StateLayout::new("/ws");
        let sid = SessionId::new("PS_000001");
        assert_eq!(layout.tasks_file(&sid), PathBuf::from("/ws/_AiDevLog/Plans/PS_000001/tasks.json"));
    }

    #[test]
    fn coordinator_audit_file_embeds_eval_id_and_kind() {
        let layout = StateLayout::new("/ws");
        let sid = SessionId::new("PS_000001");
        let path = layout.coordinator_audit_file(&sid, 1000, "ev1", "prompt");
        assert_eq!(
            path,
            PathBuf::from("/ws/_AiDevLog/Plans/PS_000001/coordinators/1000_ev1_prompt.txt")
        );
    }
}
