// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`StateStore`]: the single entry point the daemon uses to load and
//! persist every durable entity kind. Each `load_*`/`save_*` pair maps to
//! exactly one file under [`StateLayout`]; there is no cross-file
//! transaction — callers that must keep two files consistent (e.g.
//! archiving a workflow while trimming its occupancy) save in the order
//! that leaves the session resumable if the process dies between writes.

use super::agent_pool::AgentPoolFile;
use super::histories::{CoordinatorHistoryFile, WorkflowHistoryFile};
use super::sessions::SessionRegistry;
use super::tasks::TaskStoreFile;
use crate::atomic::{read_json, write_json_atomic};
use crate::layout::StateLayout;
use crate::StorageError;
use oj_core::SessionId;

#[derive(Debug, Clone)]
pub struct StateStore {
    layout: StateLayout,
}

impl StateStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn load_sessions(&self) -> Result<SessionRegistry, StorageError> {
        Ok(read_json(&self.layout.sessions_file())?.unwrap_or_default())
    }

    pub fn save_sessions(&self, registry: &SessionRegistry) -> Result<(), StorageError> {
        write_json_atomic(&self.layout.sessions_file(), registry)
    }

    pub fn load_agent_pool(&self) -> Result<AgentPoolFile, StorageError> {
        Ok(read_json(&self.layout.agent_pool_file())?.unwrap_or_default())
    }

    pub fn save_agent_pool(&self, pool: &AgentPoolFile) -> Result<(), StorageError> {
        write_json_atomic(&self.layout.agent_pool_file(), pool)
    }

    pub fn load_tasks(&self, session: &SessionId) -> Result<TaskStoreFile, StorageError> {
        Ok(read_json(&self.layout.tasks_file(session))?.unwrap_or_default())
    }

    pub fn save_tasks(&self, session: &SessionId, tasks: &TaskStoreFile) -> Result<(), StorageError> {
        write_json_atomic(&self.layout.tasks_file(session), tasks)
    }

    pub fn load_coordinator_history(
        &self,
        session: &SessionId,
    ) -> Result<CoordinatorHistoryFile, StorageError> {
        Ok(read_json(&self.layout.coordinator_history_file(session))?.unwrap_or_default())
    }

    pub fn save_coordinator_history(
        &self,
        session: &SessionId,
        history: &CoordinatorHistoryFile,
    ) -> Result<(), StorageError> {
        write_json_atomic(&self.layout.coordinator_history_file(session), history)
    }

    pub fn load_workflow_history(
        &self,
        session: &SessionId,
    ) -> Result<WorkflowHistoryFile, StorageError> {
        Ok(read_json(&self.layout.workflow_history_file(session))?.unwrap_or_default())
    }

    pub fn save_workflow_history(
        &self,
        session: &SessionId,
        history: &WorkflowHistoryFile,
    ) -> Result<(), StorageError> {
        write_json_atomic(&self.layout.workflow_history_file(session), history)
    }

    /// Append one coordinator audit log (prompt or model output) as plain
    /// text. These are write-once files named by timestamp + eval id, so no
    /// atomic rename dance is needed — a partial write is only ever a
    /// partial audit record, never a corrupted state file.
    pub fn write_coordinator_audit(
        &self,
        session: &SessionId,
        timestamp_ms: u64,
        eval_id: &str,
        kind: &str,
        content: &str,
    ) -> Result<(), StorageError> {
        let path = self.layout.coordinator_audit_file(session, timestamp_ms, eval_id, kind);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| StorageError::io(parent.to_string_lossy().into_owned(), source))?;
        }
        std::fs::write(&path, content)
            .map_err(|source| StorageError::io(path.to_string_lossy().into_owned(), source))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
