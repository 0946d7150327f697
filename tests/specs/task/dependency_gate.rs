//! §8 scenario 2: a task's workflow cannot start until every dependency has
//! succeeded, and `task.start` surfaces that as a precondition error rather
//! than silently queuing.

use crate::prelude::*;

#[test]
fn task_start_refuses_unmet_dependencies() {
    let ws = Workspace::new();
    ws.start_daemon();
    let session = ws.approved_session();

    let t1 = format!("{session}_T1");
    let t2 = format!("{session}_T2");
    ws.oj(&["task", "create", &session, &t1, "first step"]).passes();
    ws.oj(&["task", "create", &session, &t2, "second step", "--dependencies", &t1])
        .passes();

    ws.oj(&["task", "start", &session, &t2])
        .fails()
        .stderr_has("incomplete dependencies");

    ws.stop_daemon();
}

#[test]
fn task_start_succeeds_once_its_dependency_has_no_deps_of_its_own() {
    let ws = Workspace::new();
    ws.start_daemon();
    let session = ws.approved_session();

    let t1 = format!("{session}_T1");
    ws.oj(&["task", "create", &session, &t1, "no dependencies"]).passes();

    ws.oj(&["task", "start", &session, &t1]).passes();

    let after = ws.oj(&["task", "get", &session, &t1]).passes().json();
    assert_eq!(after["status"], "in_progress");

    ws.stop_daemon();
}

#[test]
fn starting_the_same_task_twice_is_refused_while_the_first_workflow_is_live() {
    let ws = Workspace::new();
    ws.start_daemon();
    let session = ws.approved_session();

    let t1 = format!("{session}_T1");
    ws.oj(&["task", "create", &session, &t1, "no dependencies"]).passes();

    ws.oj(&["task", "start", &session, &t1]).passes();
    ws.oj(&["task", "start", &session, &t1])
        .fails()
        .stderr_has("already has a non-terminal workflow");

    ws.stop_daemon();
}

#[test]
fn starting_an_unapproved_sessions_task_is_refused() {
    let ws = Workspace::new();
    ws.start_daemon();

    let created = ws.oj(&["session", "create"]).passes().json();
    let session = created["id"].as_str().unwrap().to_string();
    let t1 = format!("{session}_T1");
    ws.oj(&["task", "create", &session, &t1, "no dependencies"]).passes();

    ws.oj(&["task", "start", &session, &t1])
        .fails()
        .stderr_has("not approved");

    ws.stop_daemon();
}
