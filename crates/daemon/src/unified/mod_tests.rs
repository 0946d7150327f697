use super::*;
use crate::coordinator::{CoordinatorConfig, FakeLlmClient};
use crate::effects::NullTimerSink;
use oj_adapters::{FakeAdapter, FakeNotifyAdapter};
use oj_core::{FakeClock, RoleId, Task, TaskType};
use oj_engine::{EventBroadcaster, RoleRegistry, WorkflowRegistry};
use oj_storage::StateLayout;
use tempfile::TempDir;

fn session() -> SessionId {
    SessionId::new("PS_000001")
}

type TestCoordinator = UnifiedCoordinator<FakeClock, FakeLlmClient, FakeAdapter, FakeNotifyAdapter>;

fn coordinator() -> Arc<TestCoordinator> {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(StateStore::new(StateLayout::new(dir.path())));
    let tasks = Arc::new(TaskStore::new());
    let pool = Arc::new(AgentPoolRuntime::new(
        FakeClock::new(),
        vec![AgentName::new("alice")],
        RoleRegistry::new([RoleId::new("implementer")]),
    ));
    let events = Arc::new(EventBroadcaster::new());
    let engine = Arc::new(WorkflowEngine::new(WorkflowRegistry::with_defaults(), Arc::clone(&events)));
    let llm = Arc::new(FakeLlmClient::new());
    let agent = Arc::new(CoordinatorAgent::new(
        CoordinatorConfig::default(),
        FakeClock::new(),
        llm,
        Arc::clone(&storage),
        Arc::clone(&tasks),
        Arc::clone(&pool),
        Arc::clone(&engine),
    ));
    let rendezvous = Arc::new(CompletionRendezvous::new());
    let (tx, _rx) = tokio::sync::mpsc::channel(16);
    let effects = Arc::new(EffectExecutor::new(
        FakeAdapter::new(),
        FakeNotifyAdapter::new(),
        Arc::clone(&events),
        tx,
        Arc::new(NullTimerSink),
    ));

    Arc::new(UnifiedCoordinator::new(FakeClock::new(), storage, tasks, pool, engine, agent, rendezvous, effects, events))
}

fn approve(coordinator: &TestCoordinator) {
    let mut s = coordinator.load_session(&session());
    s.status = SessionStatus::Approved;
    coordinator.save_session(s);
}

#[tokio::test]
async fn dispatch_workflow_marks_a_task_implementation_in_progress() {
    let coordinator = coordinator();
    let task_id = TaskId::parse("PS_000001_T1").unwrap();
    coordinator.tasks.load_session(session(), oj_storage::TaskStoreFile::default());
    coordinator.tasks.upsert_task(Task::new(task_id.clone(), session(), "build it", TaskType::Implementation, 0));

    let handle = coordinator.dispatch_workflow(session(), WorkflowType::TaskImplementation, Some(task_id.clone())).unwrap();
    assert!(coordinator.engine.status(handle.workflow_id).is_some());

    let snapshot = coordinator.tasks.get_task(&session(), &task_id).unwrap();
    assert_eq!(snapshot.status, oj_core::TaskStatus::InProgress);
}

#[tokio::test]
async fn start_task_workflow_refuses_an_unapproved_session() {
    let coordinator = coordinator();
    let task_id = TaskId::parse("PS_000001_T1").unwrap();
    coordinator.tasks.load_session(session(), oj_storage::TaskStoreFile::default());
    coordinator.tasks.upsert_task(Task::new(task_id.clone(), session(), "build it", TaskType::Implementation, 0));

    let err = coordinator.start_task_workflow(session(), task_id, WorkflowType::TaskImplementation).unwrap_err();
    assert_eq!(err, StartTaskWorkflowError::SessionNotApproved(session()));
}

#[tokio::test]
async fn start_task_workflow_refuses_incomplete_dependencies() {
    let coordinator = coordinator();
    approve(&coordinator);

    let blocker = TaskId::parse("PS_000001_T1").unwrap();
    let blocked = TaskId::parse("PS_000001_T2").unwrap();
    coordinator.tasks.load_session(session(), oj_storage::TaskStoreFile::default());
    coordinator.tasks.upsert_task(Task::new(blocker.clone(), session(), "first", TaskType::Implementation, 0));
    coordinator.tasks.upsert_task(Task::new(blocked.clone(), session(), "second", TaskType::Implementation, 0));
    coordinator.tasks.add_dependency(&session(), &blocked, blocker).unwrap();

    let err = coordinator.start_task_workflow(session(), blocked, WorkflowType::TaskImplementation).unwrap_err();
    assert!(matches!(err, StartTaskWorkflowError::DependenciesIncomplete(_, _)));
}

#[tokio::test]
async fn start_task_workflow_succeeds_once_approved_with_no_dependencies() {
    let coordinator = coordinator();
    approve(&coordinator);

    let task_id = TaskId::parse("PS_000001_T1").unwrap();
    coordinator.tasks.load_session(session(), oj_storage::TaskStoreFile::default());
    coordinator.tasks.upsert_task(Task::new(task_id.clone(), session(), "build it", TaskType::Implementation, 0));

    let handle = coordinator.start_task_workflow(session(), task_id, WorkflowType::TaskImplementation).unwrap();
    assert!(coordinator.engine.status(handle.workflow_id).is_some());
}

#[tokio::test]
async fn process_agent_queue_fulfills_a_request_against_an_available_agent() {
    let coordinator = coordinator();
    let workflow_id = coordinator.engine.start(WorkflowType::ContextGathering, session(), None, 0).unwrap().0.workflow_id;

    let rx = coordinator.request_agent(session(), workflow_id, RoleId::new("implementer"), 0);
    coordinator.process_agent_queue().await;

    let agent = rx.await.unwrap();
    assert_eq!(agent.as_str(), "alice");
}

#[tokio::test]
async fn cancel_session_reclaims_agents_and_resets_a_planless_session() {
    let coordinator = coordinator();
    let mut s = coordinator.load_session(&session());
    s.status = SessionStatus::Planning;
    coordinator.save_session(s);

    coordinator.pool.allocate(&session(), WorkflowId::new(), &RoleId::new("implementer"), 1).unwrap();
    coordinator.cancel_session(&session());

    assert_eq!(coordinator.session_status(&session()), SessionStatus::NoPlan);
    assert_eq!(coordinator.pool.counts().resting, 1);
}

#[tokio::test]
async fn complete_session_refuses_unless_approved() {
    let coordinator = coordinator();
    let err = coordinator.complete_session(&session()).unwrap_err();
    assert_eq!(err, CompleteSessionError::NotApproved(session()));
}

#[tokio::test]
async fn complete_session_succeeds_once_approved() {
    let coordinator = coordinator();
    approve(&coordinator);
    coordinator.complete_session(&session()).unwrap();
    assert_eq!(coordinator.session_status(&session()), SessionStatus::Completed);
}

#[tokio::test]
async fn pause_and_resume_evaluations_delegate_to_the_coordinator_agent() {
    let coordinator = coordinator();
    coordinator.pause_evaluations(&session(), "plan mutation in progress");
    assert!(coordinator.coordinator.is_paused(&session()));
    coordinator.resume_evaluations(&session());
    assert!(!coordinator.coordinator.is_paused(&session()));
}

#[tokio::test]
async fn run_cleanup_tick_archives_terminal_workflows_past_their_grace_period() {
    let coordinator = coordinator();
    let (handle, _) = coordinator.engine.start(WorkflowType::TaskImplementation, session(), None, 0).unwrap();
    coordinator.engine.cancel(handle.workflow_id, 0);

    let grace_ms = oj_core::WORKFLOW_ARCHIVE_GRACE.as_millis() as u64;
    coordinator.clock.set_epoch_ms(grace_ms + 1);
    coordinator.run_cleanup_tick();

    assert!(coordinator.engine.progress(handle.workflow_id).is_none());
}

/// Signals a rendezvous key, retrying until the driver has actually armed
/// the wait (it races the agent allocation, so the waiter may not exist yet
/// on the first attempt).
async fn signal_stage(coordinator: &TestCoordinator, key: RendezvousKey) {
    let signal = oj_engine::CompletionSignal { result: "success".to_string(), payload: None, signaled_at_ms: 0 };
    for _ in 0..200 {
        if coordinator.rendezvous.signal_completion(key.clone(), signal.clone()) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    panic!("driver never armed a wait for {key:?}");
}

#[tokio::test]
async fn drive_workflow_advances_every_phase_and_marks_the_task_succeeded() {
    let coordinator = coordinator();
    coordinator.spawn_workflow_completion_listener();

    let task_id = TaskId::parse("PS_000001_T1").unwrap();
    coordinator.tasks.load_session(session(), oj_storage::TaskStoreFile::default());
    coordinator.tasks.upsert_task(Task::new(task_id.clone(), session(), "build it", TaskType::Implementation, 0));

    let handle = coordinator.dispatch_workflow(session(), WorkflowType::TaskImplementation, Some(task_id.clone())).unwrap();

    for stage in ["setup", "implement", "review", "done"] {
        let key = RendezvousKey::new(handle.workflow_id, stage, Some(task_id.clone()));
        signal_stage(&coordinator, key).await;
    }

    for _ in 0..200 {
        if coordinator.tasks.get_task(&session(), &task_id).map(|t| t.status) == Some(oj_core::TaskStatus::Succeeded) {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }

    let snapshot = coordinator.tasks.get_task(&session(), &task_id).unwrap();
    assert_eq!(snapshot.status, oj_core::TaskStatus::Succeeded);
    assert!(coordinator.engine.status(handle.workflow_id).unwrap().is_terminal());

    let persisted = coordinator.storage.load_tasks(&session()).unwrap();
    let persisted_task = persisted.get(&task_id).unwrap();
    assert_eq!(persisted_task.status, oj_core::TaskStatus::Succeeded);
}

#[tokio::test]
async fn cancel_workflow_mid_wait_leaves_the_task_awaiting_decision() {
    let coordinator = coordinator();
    coordinator.spawn_workflow_completion_listener();

    let task_id = TaskId::parse("PS_000001_T1").unwrap();
    coordinator.tasks.load_session(session(), oj_storage::TaskStoreFile::default());
    coordinator.tasks.upsert_task(Task::new(task_id.clone(), session(), "build it", TaskType::Implementation, 0));

    let handle = coordinator.dispatch_workflow(session(), WorkflowType::TaskImplementation, Some(task_id.clone())).unwrap();

    for _ in 0..200 {
        if coordinator.rendezvous.live_signal_count() > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    assert!(coordinator.cancel_workflow(handle.workflow_id));

    for _ in 0..200 {
        if coordinator.tasks.get_task(&session(), &task_id).map(|t| t.status) == Some(oj_core::TaskStatus::AwaitingDecision) {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }

    let snapshot = coordinator.tasks.get_task(&session(), &task_id).unwrap();
    assert_eq!(snapshot.status, oj_core::TaskStatus::AwaitingDecision);
    assert_eq!(snapshot.previous_attempts.len(), 1);
}
