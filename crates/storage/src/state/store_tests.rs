use super::super::agent_pool::AgentPoolFile;
use super::super::sessions::SessionRegistry;
use super::super::tasks::TaskStoreFile;
use super::*;
use oj_core::{AgentName, AgentPoolEntry, PlanSession, SessionId, Task, TaskId, TaskType};

fn store() -> (tempfile::TempDir, StateStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(StateLayout::new(dir.path()));
    (dir, store)
}

#[test]
fn sessions_round_trip() {
    let (_dir, store) = store();
    let mut registry = SessionRegistry::default();
    registry.upsert(PlanSession::new(SessionId::new("PS_000001"), 1_000));
    store.save_sessions(&registry).unwrap();

    let reloaded = store.load_sessions().unwrap();
    assert_eq!(reloaded.sessions.len(), 1);
}

#[test]
fn missing_sessions_file_loads_as_default() {
    let (_dir, store) = store();
    let registry = store.load_sessions().unwrap();
    assert!(registry.sessions.is_empty());
}

#[test]
fn tasks_are_scoped_per_session() {
    let (_dir, store) = store();
    let session = SessionId::new("PS_000001");
    let mut file = TaskStoreFile::default();
    file.upsert(Task::new(
        TaskId::parse("PS_000001_T1").unwrap(),
        session.clone(),
        "desc",
        TaskType::Implementation,
        1_000,
    ));
    store.save_tasks(&session, &file).unwrap();

    let other_session = SessionId::new("PS_000002");
    let other = store.load_tasks(&other_session).unwrap();
    assert!(other.tasks.is_empty());

    let reloaded = store.load_tasks(&session).unwrap();
    assert_eq!(reloaded.tasks.len(), 1);
}

#[test]
fn agent_pool_is_global_not_per_session() {
    let (_dir, store) = store();
    let mut pool = AgentPoolFile::default();
    pool.upsert(AgentPoolEntry::available(AgentName::new("atlas")));
    store.save_agent_pool(&pool).unwrap();

    let reloaded = store.load_agent_pool().unwrap();
    assert_eq!(reloaded.entries.len(), 1);
}

#[test]
fn coordinator_audit_writes_readable_text_file() {
    let (dir, store) = store();
    let session = SessionId::new("PS_000001");
    store.write_coordinator_audit(&session, 1_000, "ev1", "prompt", "hello").unwrap();

    let path = dir.path().join("_AiDevLog/Plans/PS_000001/coordinators/1000_ev1_prompt.txt");
    assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
}
