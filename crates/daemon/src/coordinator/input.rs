// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles the text an evaluation sends to the model (§4.5.1): role intro,
//! the triggering event(s), the plan, decision history, current state, and
//! the decision instructions. Each section is its own function so a future
//! template change touches one spot instead of a monolithic format string.

use oj_core::{Clock, CoordinatorHistoryEntry, SessionId, TaskStatus};
use oj_engine::{AgentPoolRuntime, TaskStore};
use std::fmt::Write as _;
use std::path::Path;

/// Upper bound on how much of the plan file content is included; past this
/// the `## Task Breakdown` region is preserved and everything else around it
/// is dropped rather than truncated mid-section.
const PLAN_BUDGET_CHARS: usize = 8_000;
const DECISION_HISTORY_DEFAULT: usize = 10;

pub struct RoleIntroTemplate {
    pub text: String,
}

impl RoleIntroTemplate {
    pub fn render(&self, session: &SessionId, now_ms: u64, workflow_selection: &str) -> String {
        self.text
            .replace("{{sessionId}}", session.as_str())
            .replace("{{timestamp}}", &now_ms.to_string())
            .replace("{{WORKFLOW_SELECTION}}", workflow_selection)
    }
}

/// Workflow-type options available to the model, derived from the registry
/// and filtered by whether Unity features are enabled for this deployment.
pub fn workflow_selection(registry: &oj_engine::WorkflowRegistry, unity_enabled: bool) -> String {
    let mut out = String::new();
    for workflow_type in [
        oj_core::WorkflowType::TaskImplementation,
        oj_core::WorkflowType::ErrorResolution,
        oj_core::WorkflowType::ContextGathering,
        oj_core::WorkflowType::PlanningRevision,
    ] {
        if !unity_enabled && workflow_type == oj_core::WorkflowType::ErrorResolution {
            continue;
        }
        if let Some(metadata) = registry.metadata(workflow_type) {
            let _ = writeln!(out, "- {workflow_type} (phases: {})", metadata.phases.join(" -> "));
        }
    }
    out
}

/// Section 2: the single triggering event, or a batch-events dump.
pub fn triggering_event_section(triggering_event: &str, payload: &serde_json::Value) -> String {
    format!("## Triggering event\n{triggering_event}\n{payload}\n")
}

/// Section 3: requirement text plus plan-file content, truncated to a budget
/// while preserving the `## Task Breakdown` region verbatim.
pub fn plan_section(plan_file: &Path) -> String {
    let Ok(content) = std::fs::read_to_string(plan_file) else {
        return "## Plan\n(no plan file found)\n".to_string();
    };
    if content.len() <= PLAN_BUDGET_CHARS {
        return format!("## Plan\n{content}\n");
    }
    if let Some(breakdown_start) = content.find("## Task Breakdown") {
        let breakdown = &content[breakdown_start..];
        let head_budget = PLAN_BUDGET_CHARS.saturating_sub(breakdown.len().min(PLAN_BUDGET_CHARS));
        let head = &content[..breakdown_start.min(head_budget)];
        return format!("## Plan\n{head}\n...(truncated)...\n{breakdown}\n");
    }
    format!("## Plan\n{}\n...(truncated)...\n", &content[..PLAN_BUDGET_CHARS])
}

/// Section 4: last N decision history entries, newest first is not
/// required — the model reads them in dispatch order, oldest first, the
/// same order they happened.
pub fn decision_history_section(history: &[CoordinatorHistoryEntry], limit: Option<usize>) -> String {
    let limit = limit.unwrap_or(DECISION_HISTORY_DEFAULT);
    let mut out = String::from("## Decision history\n");
    for entry in history.iter().rev().take(limit).collect::<Vec<_>>().into_iter().rev() {
        let outcome = match &entry.outcome {
            Some(o) if o.success => "succeeded",
            Some(_) => "failed",
            None => "pending",
        };
        let _ = writeln!(
            out,
            "- [{}] event={} dispatched={:?} outcome={} reasoning={}",
            entry.timestamp_ms, entry.triggering_event, entry.dispatched_tasks, outcome, entry.reasoning
        );
    }
    out
}

/// Section 5: ready tasks first, then in_progress, then blocked/paused, then
/// counts; active workflows with phase/progress; agents by role; pending
/// user questions.
pub fn current_state_section<C: Clock>(
    session: &SessionId,
    tasks: &TaskStore,
    pool: &AgentPoolRuntime<C>,
    engine: &oj_engine::WorkflowEngine,
) -> String {
    let mut out = String::from("## Current state\n");
    let Some(file) = tasks.snapshot_session(session) else {
        out.push_str("(no tasks loaded for this session)\n");
        return out;
    };

    let ready = tasks.get_ready(session);
    let _ = writeln!(out, "Ready: {}", ready.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", "));

    let in_progress: Vec<_> = file.tasks.iter().filter(|t| t.status == TaskStatus::InProgress).map(|t| t.id.as_str()).collect();
    let _ = writeln!(out, "In progress: {}", in_progress.join(", "));

    let blocked: Vec<_> = file
        .tasks
        .iter()
        .filter(|t| matches!(t.status, TaskStatus::Blocked | TaskStatus::AwaitingDecision))
        .map(|t| t.id.as_str())
        .collect();
    let _ = writeln!(out, "Blocked/awaiting decision: {}", blocked.join(", "));

    let succeeded = file.tasks.iter().filter(|t| t.status == TaskStatus::Succeeded).count();
    let _ = writeln!(out, "Counts: total={} succeeded={}", file.tasks.len(), succeeded);

    out.push_str("Active workflows:\n");
    for live in engine.live_for_session(session) {
        let _ = writeln!(
            out,
            "- {} ({}) task={:?} phase={} ({}%)",
            live.workflow_id, live.workflow_type, live.task_id, live.progress.phase, live.progress.percentage
        );
    }

    let snapshot = pool.snapshot();
    let (mut available, mut busy) = (0usize, Vec::new());
    for entry in &snapshot.entries {
        match &entry.state {
            oj_core::AgentPoolState::Available => available += 1,
            oj_core::AgentPoolState::Busy(claim) => busy.push(format!("{} ({})", entry.name, claim.role)),
            _ => {}
        }
    }
    let _ = writeln!(out, "Agents: available={available} busy=[{}]", busy.join(", "));

    let pending_questions: Vec<_> = file
        .tasks
        .iter()
        .filter_map(|t| t.pending_question.as_deref().map(|q| format!("{}: {}", t.id, q)))
        .collect();
    let _ = writeln!(out, "Pending user questions: {}", pending_questions.join("; "));

    out
}

/// Section 6: decision instructions, with the mandatory output footer.
pub fn decision_instructions_section(instructions: &str) -> String {
    format!(
        "## Instructions\n{instructions}\n\nEnd your response with:\nREASONING: <why you chose this action>\nCONFIDENCE: <0.0-1.0>\n"
    )
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
