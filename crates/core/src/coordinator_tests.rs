use super::*;

#[test]
fn reasoning_is_truncated_to_max_chars() {
    let long = "x".repeat(REASONING_MAX_CHARS + 100);
    let entry = CoordinatorHistoryEntry::new(0, "agent_available", long);
    assert_eq!(entry.reasoning.chars().count(), REASONING_MAX_CHARS);
}

#[test]
fn push_bounded_evicts_oldest_first() {
    let mut history: Vec<u32> = Vec::new();
    for i in 0..COORDINATOR_HISTORY_WINDOW as u32 + 5 {
        push_bounded(&mut history, i, COORDINATOR_HISTORY_WINDOW);
    }
    assert_eq!(history.len(), COORDINATOR_HISTORY_WINDOW);
    // oldest five (0..5) should have been dropped
    assert_eq!(history[0], 5);
    assert_eq!(*history.last().unwrap(), COORDINATOR_HISTORY_WINDOW as u32 + 4);
}

#[test]
fn push_bounded_under_cap_keeps_everything() {
    let mut history: Vec<u32> = Vec::new();
    push_bounded(&mut history, 1, 50);
    push_bounded(&mut history, 2, 50);
    assert_eq!(history, vec![1, 2]);
}

#[test]
fn archived_workflow_derives_from_summary() {
    let summary = CompletedWorkflowSummary {
        workflow_id: WorkflowId::new(),
        workflow_type: WorkflowType::TaskImplementation,
        terminal_status: WorkflowStatus::Succeeded,
        task_id: None,
        started_at_ms: 10,
        completed_at_ms: 20,
        error: None,
        output: None,
        log_path: None,
    };
    let archived: ArchivedWorkflow = (&summary).into();
    assert_eq!(archived.id, summary.workflow_id);
    assert_eq!(archived.archived_at_ms, 20);
}
