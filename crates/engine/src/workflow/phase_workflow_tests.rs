use super::*;
use oj_core::SessionId;

fn ctx() -> WorkflowContext {
    WorkflowContext { session: SessionId::new("PS_000001"), task_id: None, now_ms: 0 }
}

fn new_workflow() -> PhaseWorkflow {
    PhaseWorkflow::new(WorkflowId::new(), WorkflowType::TaskImplementation, &["setup", "implement", "done"], RoleId::new("implementer"))
}

#[test]
fn start_transitions_to_running_and_requests_an_agent() {
    let mut wf = new_workflow();
    wf.start(&ctx()).unwrap();
    assert_eq!(wf.status(), WorkflowStatus::Running);
    assert!(wf.agent_role_needed().is_some());
}

#[test]
fn starting_twice_after_terminal_is_rejected() {
    let mut wf = new_workflow();
    wf.start(&ctx()).unwrap();
    wf.cancel(&ctx());
    assert_eq!(wf.start(&ctx()), Err(WorkflowError::AlreadyTerminal));
}

#[test]
fn agent_allocated_clears_the_need_and_emits_spawn() {
    let mut wf = new_workflow();
    wf.start(&ctx()).unwrap();
    let effects = wf.agent_allocated(&ctx(), AgentName::new("alice"));
    assert!(wf.agent_role_needed().is_none());
    assert!(effects.iter().any(|e| matches!(e, Effect::SpawnAgent { .. })));
}

#[test]
fn stage_complete_advances_through_every_phase_to_succeeded() {
    let mut wf = new_workflow();
    wf.start(&ctx()).unwrap();
    wf.agent_allocated(&ctx(), AgentName::new("alice"));

    wf.handle_workflow_event_response(&ctx(), "stageComplete", serde_json::json!({"success": true})).unwrap();
    assert_eq!(wf.status(), WorkflowStatus::Running);
    assert!(wf.agent_role_needed().is_some());

    wf.agent_allocated(&ctx(), AgentName::new("alice"));
    wf.handle_workflow_event_response(&ctx(), "stageComplete", serde_json::json!({"success": true})).unwrap();
    assert_eq!(wf.status(), WorkflowStatus::Succeeded);
}

#[test]
fn stage_complete_with_failure_fails_the_workflow() {
    let mut wf = new_workflow();
    wf.start(&ctx()).unwrap();
    wf.agent_allocated(&ctx(), AgentName::new("alice"));
    wf.handle_workflow_event_response(&ctx(), "stageComplete", serde_json::json!({"success": false})).unwrap();
    assert_eq!(wf.status(), WorkflowStatus::Failed);
}

#[test]
fn unknown_event_type_is_rejected() {
    let mut wf = new_workflow();
    wf.start(&ctx()).unwrap();
    let err = wf.handle_workflow_event_response(&ctx(), "bogus", serde_json::json!({})).unwrap_err();
    assert_eq!(err, WorkflowError::UnknownEventType("bogus".to_string()));
}

#[test]
fn cancel_is_idempotent_once_terminal() {
    let mut wf = new_workflow();
    wf.start(&ctx()).unwrap();
    let first = wf.cancel(&ctx());
    assert!(!first.is_empty());
    let second = wf.cancel(&ctx());
    assert!(second.is_empty());
}
