use super::*;
use crate::coordinator::{CoordinatorConfig, CoordinatorOutput, FakeLlmClient};
use oj_core::{AgentName, FakeClock, PlanSession, RoleId, Task, TaskType};
use oj_engine::{EventBroadcaster, RoleRegistry, WorkflowRegistry};
use oj_storage::{StateLayout, TaskStoreFile};
use std::time::Duration as StdDuration;
use tempfile::TempDir;

fn session() -> SessionId {
    SessionId::new("PS_000001")
}

fn approve(storage: &StateStore, id: &SessionId) {
    let mut registry = storage.load_sessions().unwrap_or_default();
    let mut entry = PlanSession::new(id.clone(), 0);
    entry.status = SessionStatus::Approved;
    registry.upsert(entry);
    storage.save_sessions(&registry).unwrap();
}

struct Fixture {
    monitor: Arc<IdleMonitor<FakeClock, FakeLlmClient>>,
    coordinator: Arc<CoordinatorAgent<FakeClock, FakeLlmClient>>,
    tasks: Arc<TaskStore>,
    engine: Arc<WorkflowEngine>,
    pool: Arc<AgentPoolRuntime<FakeClock>>,
    storage: Arc<StateStore>,
    clock: FakeClock,
    ready_tx: watch::Sender<bool>,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(StateStore::new(StateLayout::new(dir.path())));
    let tasks = Arc::new(TaskStore::new());
    let pool = Arc::new(AgentPoolRuntime::new(
        FakeClock::new(),
        vec![AgentName::new("alice")],
        RoleRegistry::new([RoleId::new("implementer")]),
    ));
    let engine = Arc::new(WorkflowEngine::new(WorkflowRegistry::with_defaults(), Arc::new(EventBroadcaster::new())));
    let llm = Arc::new(FakeLlmClient::new());
    let mut config = CoordinatorConfig::default();
    config.debounce = StdDuration::from_millis(10);
    config.max_wait = StdDuration::from_millis(100);
    config.cooldown = StdDuration::from_millis(10);
    let coordinator =
        Arc::new(CoordinatorAgent::new(config, FakeClock::new(), llm, Arc::clone(&storage), Arc::clone(&tasks), Arc::clone(&pool), Arc::clone(&engine)));

    let clock = FakeClock::new();
    let (ready_tx, ready_rx) = watch::channel(false);
    let monitor = Arc::new(IdleMonitor::new(
        clock.clone(),
        Arc::clone(&storage),
        Arc::clone(&tasks),
        Arc::clone(&pool),
        Arc::clone(&engine),
        Arc::clone(&coordinator),
        ready_rx,
    ));

    Fixture { monitor, coordinator, tasks, engine, pool, storage, clock, ready_tx }
}

#[tokio::test(start_paused = true)]
async fn tick_is_a_no_op_before_system_ready_flips() {
    let f = fixture();
    approve(&f.storage, &session());

    f.monitor.tick();
    f.clock.advance(StdDuration::from_secs(120));
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;

    assert!(f.coordinator.llm().prompts_seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn tick_fires_once_a_fully_idle_session_passes_the_idle_threshold() {
    let f = fixture();
    approve(&f.storage, &session());
    f.ready_tx.send(true).unwrap();
    f.coordinator.llm().push_response(Ok(CoordinatorOutput::new("ok")));

    // First detection only records idleSince, never fires on the same tick.
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;
    assert!(f.coordinator.llm().prompts_seen().is_empty());

    f.clock.advance(StdDuration::from_millis(60_000));
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;
    assert_eq!(f.coordinator.llm().prompts_seen().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn tick_does_not_refire_within_the_cooldown_window() {
    let f = fixture();
    approve(&f.storage, &session());
    f.ready_tx.send(true).unwrap();
    f.coordinator.llm().push_response(Ok(CoordinatorOutput::new("ok")));
    f.coordinator.llm().push_response(Ok(CoordinatorOutput::new("ok again")));

    f.monitor.tick();
    f.clock.advance(StdDuration::from_millis(60_000));
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;
    assert_eq!(f.coordinator.llm().prompts_seen().len(), 1);

    // Still fully idle one tick later, well before the 5 minute cooldown.
    f.clock.advance(StdDuration::from_millis(10_000));
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;
    assert_eq!(f.coordinator.llm().prompts_seen().len(), 1, "cooldown should have suppressed a second fire");

    // Past the 5 minute cooldown, the next idle tick fires again.
    f.clock.advance(StdDuration::from_millis(5 * 60_000));
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;
    assert_eq!(f.coordinator.llm().prompts_seen().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn tick_fires_immediately_for_a_busy_but_starved_session() {
    let f = fixture();
    approve(&f.storage, &session());
    f.ready_tx.send(true).unwrap();
    f.coordinator.llm().push_response(Ok(CoordinatorOutput::new("ok")));

    f.tasks.load_session(session(), TaskStoreFile::default());
    let task_id = oj_core::TaskId::parse("PS_000001_T1").unwrap();
    f.tasks.upsert_task(Task::new(task_id.clone(), session(), "ready work", TaskType::Implementation, 0));
    f.tasks.update_ready_tasks(&session());
    let (_, effects) = f.engine.start(oj_core::WorkflowType::TaskImplementation, session(), None, 0).unwrap();
    drop(effects);

    // Active workflow present alongside a ready task: threshold is 0, so the
    // very next tick after detection fires (no 60s wait needed).
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;
    assert!(f.coordinator.llm().prompts_seen().is_empty());

    f.clock.advance(StdDuration::from_millis(1));
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;
    assert_eq!(f.coordinator.llm().prompts_seen().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn tick_clears_idle_tracking_once_a_starved_session_gets_more_ready_work_absorbed() {
    let f = fixture();
    approve(&f.storage, &session());
    f.ready_tx.send(true).unwrap();

    f.tasks.load_session(session(), TaskStoreFile::default());
    let task_id = oj_core::TaskId::parse("PS_000001_T1").unwrap();
    f.tasks.upsert_task(Task::new(task_id.clone(), session(), "ready work", TaskType::Implementation, 0));
    f.tasks.update_ready_tasks(&session());
    let (handle, effects) = f.engine.start(oj_core::WorkflowType::TaskImplementation, session(), None, 0).unwrap();
    drop(effects);

    f.monitor.tick();

    // Task absorbed into in-progress: no ready tasks left, one active
    // workflow — not a candidate shape at all, so idleSince resets.
    f.tasks.mark_in_progress(&session(), &task_id, handle.workflow_id, 0);
    f.clock.advance(StdDuration::from_millis(60_000));
    f.monitor.tick();
    tokio::time::advance(StdDuration::from_millis(200)).await;
    assert!(f.coordinator.llm().prompts_seen().is_empty());
}

#[tokio::test]
async fn startup_trigger_fires_for_an_idle_approved_session_with_an_available_agent() {
    let f = fixture();
    approve(&f.storage, &session());
    f.coordinator.llm().push_response(Ok(CoordinatorOutput::new("ok")));

    f.monitor.startup_trigger();
    tokio::time::sleep(StdDuration::from_millis(200)).await;

    assert_eq!(f.coordinator.llm().prompts_seen().len(), 1);
}

#[tokio::test]
async fn startup_trigger_skips_sessions_with_an_active_workflow() {
    let f = fixture();
    approve(&f.storage, &session());
    f.engine.start(oj_core::WorkflowType::TaskImplementation, session(), None, 0).unwrap();

    f.monitor.startup_trigger();
    tokio::time::sleep(StdDuration::from_millis(200)).await;

    assert!(f.coordinator.llm().prompts_seen().is_empty());
}

#[tokio::test]
async fn startup_trigger_does_nothing_with_no_available_agents() {
    let f = fixture();
    approve(&f.storage, &session());
    f.pool.allocate(&session(), oj_core::WorkflowId::new(), &RoleId::new("implementer"), 1).unwrap();

    f.monitor.startup_trigger();
    tokio::time::sleep(StdDuration::from_millis(200)).await;

    assert!(f.coordinator.llm().prompts_seen().is_empty());
}
