// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session bounded history files: coordinator evaluations and completed
//! workflows. Both are sliding windows ([`oj_core::push_bounded`]) — the
//! file on disk is simply the in-memory vector, rewritten whole.

use oj_core::{ArchivedWorkflow, CompletedWorkflowSummary, CoordinatorHistoryEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinatorHistoryFile {
    #[serde(default)]
    pub entries: Vec<CoordinatorHistoryEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowHistoryFile {
    #[serde(default)]
    pub completed: Vec<CompletedWorkflowSummary>,
    /// Summaries older than [`oj_core::WORKFLOW_ARCHIVE_GRACE`] are demoted
    /// here; their live workflow object has already been dropped.
    #[serde(default)]
    pub archived: Vec<ArchivedWorkflow>,
}

#[cfg(test)]
#[path = "histories_tests.rs"]
mod tests;
