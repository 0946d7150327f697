use super::*;
use oj_core::{TaskType, WorkflowId};

fn session() -> SessionId {
    SessionId::new("PS_000001")
}

fn task(id: &str, status: TaskStatus) -> Task {
    let mut t = Task::new(TaskId::parse(id).unwrap(), session(), "do the thing", TaskType::Implementation, 0);
    t.status = status;
    t
}

#[test]
fn dependents_are_recomputed_from_dependencies() {
    let store = TaskStore::new();
    store.upsert_task(task("PS_000001_T1", TaskStatus::Ready));
    let mut t2 = task("PS_000001_T2", TaskStatus::Blocked);
    t2.dependencies = vec![TaskId::parse("PS_000001_T1").unwrap()];
    store.upsert_task(t2);

    let dependents = store.dependents(&session(), &TaskId::parse("PS_000001_T1").unwrap());
    assert_eq!(dependents, vec![TaskId::parse("PS_000001_T2").unwrap()]);
}

#[test]
fn add_dependency_rejects_a_cycle() {
    let store = TaskStore::new();
    store.upsert_task(task("PS_000001_T1", TaskStatus::Ready));
    store.upsert_task(task("PS_000001_T2", TaskStatus::Ready));
    let t1 = TaskId::parse("PS_000001_T1").unwrap();
    let t2 = TaskId::parse("PS_000001_T2").unwrap();

    store.add_dependency(&session(), &t2, t1.clone()).unwrap();
    let err = store.add_dependency(&session(), &t1, t2).unwrap_err();
    assert!(matches!(err, TaskStoreError::DependencyCycle(_, _)));
}

#[test]
fn get_ready_requires_every_dependency_succeeded() {
    let store = TaskStore::new();
    store.upsert_task(task("PS_000001_T1", TaskStatus::Ready));
    let mut t2 = task("PS_000001_T2", TaskStatus::Blocked);
    t2.dependencies = vec![TaskId::parse("PS_000001_T1").unwrap()];
    store.upsert_task(t2);

    assert_eq!(store.get_ready(&session()), vec![TaskId::parse("PS_000001_T1").unwrap()]);

    store.mark_succeeded(&session(), &TaskId::parse("PS_000001_T1").unwrap(), 1);
    let ready = store.get_ready(&session());
    assert!(ready.contains(&TaskId::parse("PS_000001_T2").unwrap()));
}

#[test]
fn update_ready_tasks_promotes_and_demotes_the_status_flag() {
    let store = TaskStore::new();
    store.upsert_task(task("PS_000001_T1", TaskStatus::Created));
    let mut t2 = task("PS_000001_T2", TaskStatus::Created);
    t2.dependencies = vec![TaskId::parse("PS_000001_T1").unwrap()];
    store.upsert_task(t2);

    store.update_ready_tasks(&session());
    assert_eq!(store.get_task(&session(), &TaskId::parse("PS_000001_T1").unwrap()).unwrap().status, TaskStatus::Ready);
    assert_eq!(store.get_task(&session(), &TaskId::parse("PS_000001_T2").unwrap()).unwrap().status, TaskStatus::Blocked);

    store.mark_succeeded(&session(), &TaskId::parse("PS_000001_T1").unwrap(), 1);
    store.update_ready_tasks(&session());
    assert_eq!(store.get_task(&session(), &TaskId::parse("PS_000001_T2").unwrap()).unwrap().status, TaskStatus::Ready);
}

#[test]
fn update_ready_tasks_does_not_disturb_in_progress_or_awaiting_decision() {
    let store = TaskStore::new();
    store.upsert_task(task("PS_000001_T1", TaskStatus::InProgress));
    store.update_ready_tasks(&session());
    assert_eq!(store.get_task(&session(), &TaskId::parse("PS_000001_T1").unwrap()).unwrap().status, TaskStatus::InProgress);
}

#[test]
fn conflicting_exclusive_occupancies_are_detected() {
    let store = TaskStore::new();
    let t1 = TaskId::parse("PS_000001_T1").unwrap();
    let wf1 = WorkflowId::new();
    let wf2 = WorkflowId::new();
    store.declare_occupancy(&session(), wf1, vec![t1.clone()], OccupancyKind::Exclusive, "implementing");

    let conflicts = store.check_conflicts(&session(), wf2, &[t1.clone()]);
    assert_eq!(conflicts, vec![ConflictEntry { task_id: t1, occupying_workflow: wf1 }]);
}

#[test]
fn shared_occupancies_do_not_conflict_with_each_other() {
    let store = TaskStore::new();
    let t1 = TaskId::parse("PS_000001_T1").unwrap();
    let wf1 = WorkflowId::new();
    let wf2 = WorkflowId::new();
    store.declare_occupancy(&session(), wf1, vec![t1.clone()], OccupancyKind::Shared, "reading");

    let conflicts = store.check_conflicts(&session(), wf2, &[t1]);
    assert!(conflicts.is_empty());
}

#[test]
fn release_occupancy_clears_the_conflict() {
    let store = TaskStore::new();
    let t1 = TaskId::parse("PS_000001_T1").unwrap();
    let wf1 = WorkflowId::new();
    let wf2 = WorkflowId::new();
    store.declare_occupancy(&session(), wf1, vec![t1.clone()], OccupancyKind::Exclusive, "implementing");
    store.release_occupancy(&session(), wf1, None);

    assert!(store.check_conflicts(&session(), wf2, &[t1]).is_empty());
}

#[test]
fn waiting_conflicts_drain_once_every_blocker_finishes() {
    let store = TaskStore::new();
    let t1 = TaskId::parse("PS_000001_T1").unwrap();
    let waiting_wf = WorkflowId::new();
    let blocker_a = WorkflowId::new();
    let blocker_b = WorkflowId::new();
    store.register_waiting_for_conflicts(&session(), waiting_wf, vec![t1], vec![blocker_a, blocker_b]);

    let unblocked = store.drain_unblocked_waiters(&session(), blocker_a);
    assert!(unblocked.is_empty());

    let unblocked = store.drain_unblocked_waiters(&session(), blocker_b);
    assert_eq!(unblocked.len(), 1);
    assert_eq!(unblocked[0].workflow_id, waiting_wf);
}

#[test]
fn record_failure_returns_task_to_blocked_never_terminal() {
    let store = TaskStore::new();
    store.upsert_task(task("PS_000001_T1", TaskStatus::InProgress));
    let wf = WorkflowId::new();

    store.record_failure(&session(), &TaskId::parse("PS_000001_T1").unwrap(), wf, "build failed", 5);
    let t = store.get_task(&session(), &TaskId::parse("PS_000001_T1").unwrap()).unwrap();
    assert_eq!(t.status, TaskStatus::Blocked);
    assert_eq!(t.previous_attempts.len(), 1);
    assert_eq!(t.previous_fix_summary.as_deref(), Some("build failed"));
}

#[test]
fn delete_task_removes_it_and_recomputes_dependents() {
    let store = TaskStore::new();
    store.upsert_task(task("PS_000001_T1", TaskStatus::Ready));
    let mut t2 = task("PS_000001_T2", TaskStatus::Blocked);
    t2.dependencies = vec![TaskId::parse("PS_000001_T1").unwrap()];
    store.upsert_task(t2);

    store.delete_task(&session(), &TaskId::parse("PS_000001_T1").unwrap(), "superseded");
    assert!(store.get_task(&session(), &TaskId::parse("PS_000001_T1").unwrap()).is_none());
}
