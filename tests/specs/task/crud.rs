//! Task CRUD and dependency-edge specs (§4.2).

use crate::prelude::*;

#[test]
fn create_get_and_list_a_task() {
    let ws = Workspace::new();
    ws.start_daemon();
    let session = ws.approved_session();

    let task_id = format!("{session}_T1");
    let created = ws
        .oj(&["task", "create", &session, &task_id, "implement the thing"])
        .passes()
        .json();
    assert_eq!(created["description"], "implement the thing");
    // `status` starts at `created` — the `ready`/`blocked` flag only moves
    // on `TaskStore::update_ready_tasks` (§4.2), which the coordinator and
    // idle monitor run, not `task.create` itself. `exec.status`'s `ready`
    // list is computed fresh and doesn't need that recompute (see
    // `dependency_gate.rs`).
    assert_eq!(created["status"], "created");

    let fetched = ws.oj(&["task", "get", &session, &task_id]).passes().json();
    assert_eq!(fetched["id"], task_id);

    let list = ws.oj(&["task", "list", &session]).passes().json();
    assert_eq!(list.as_array().unwrap().len(), 1);

    ws.stop_daemon();
}

#[test]
fn reject_a_simple_non_global_task_id() {
    let ws = Workspace::new();
    ws.start_daemon();
    let session = ws.approved_session();

    ws.oj(&["task", "create", &session, "T1", "implement the thing"]).fails();

    ws.stop_daemon();
}

#[test]
fn add_and_remove_a_dependency_edge() {
    let ws = Workspace::new();
    ws.start_daemon();
    let session = ws.approved_session();

    let t1 = format!("{session}_T1");
    let t2 = format!("{session}_T2");
    ws.oj(&["task", "create", &session, &t1, "first"]).passes();
    ws.oj(&["task", "create", &session, &t2, "second"]).passes();

    ws.oj(&["task", "add-dependency", &session, &t2, &t1]).passes();
    let t2_after = ws.oj(&["task", "get", &session, &t2]).passes().json();
    assert!(t2_after["dependencies"].as_array().unwrap().iter().any(|d| d == &t1));

    ws.oj(&["task", "remove-dependency", &session, &t2, &t1]).passes();
    let t2_cleared = ws.oj(&["task", "get", &session, &t2]).passes().json();
    assert!(t2_cleared["dependencies"].as_array().unwrap().is_empty());

    ws.stop_daemon();
}

#[test]
fn delete_a_task() {
    let ws = Workspace::new();
    ws.start_daemon();
    let session = ws.approved_session();

    let t1 = format!("{session}_T1");
    ws.oj(&["task", "create", &session, &t1, "throwaway"]).passes();
    ws.oj(&["task", "delete", &session, &t1, "--reason", "no longer needed"]).passes();

    ws.oj(&["task", "get", &session, &t1]).fails();

    ws.stop_daemon();
}
