// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The global session registry: every [`PlanSession`] the daemon knows
//! about, keyed by id. One file (`.apc/sessions.json`), read in full on
//! startup and rewritten in full on every registration/status change —
//! registries stay small (one entry per plan the user has ever started).

use oj_core::{PlanSession, SessionId};
use serde::{Deserialize, Serialize};

pub type SessionRegistryEntry = PlanSession;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRegistry {
    #[serde(default)]
    pub sessions: Vec<SessionRegistryEntry>,
}

impl SessionRegistry {
    pub fn get(&self, id: &SessionId) -> Option<&SessionRegistryEntry> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut SessionRegistryEntry> {
        self.sessions.iter_mut().find(|s| &s.id == id)
    }

    /// Insert a new entry, or overwrite the existing one with the same id.
    pub fn upsert(&mut self, entry: SessionRegistryEntry) {
        match self.sessions.iter_mut().find(|s| s.id == entry.id) {
            Some(slot) => *slot = entry,
            None => self.sessions.push(entry),
        }
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<SessionRegistryEntry> {
        let idx = self.sessions.iter().position(|s| &s.id == id)?;
        Some(self.sessions.remove(idx))
    }
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
