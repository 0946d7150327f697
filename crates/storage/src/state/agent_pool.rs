// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The global agent pool snapshot: `.apc/agent_pool.json`. One entry per
//! name in the canonical agent roster, regardless of how many sessions
//! exist — the pool is shared across all sessions (C2).

use oj_core::{AgentName, AgentPoolEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPoolFile {
    #[serde(default)]
    pub entries: Vec<AgentPoolEntry>,
}

impl AgentPoolFile {
    pub fn get(&self, name: &AgentName) -> Option<&AgentPoolEntry> {
        self.entries.iter().find(|e| &e.name == name)
    }

    pub fn get_mut(&mut self, name: &AgentName) -> Option<&mut AgentPoolEntry> {
        self.entries.iter_mut().find(|e| &e.name == name)
    }

    pub fn upsert(&mut self, entry: AgentPoolEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }
}

#[cfg(test)]
#[path = "agent_pool_tests.rs"]
mod tests;
