//! Agent pool status/list/resize and the release-to-resting transition.

use crate::prelude::*;

#[test]
fn pool_status_starts_with_the_default_roster_all_available() {
    let ws = Workspace::new();
    ws.start_daemon();

    let counts = ws.oj(&["pool", "status"]).passes().json();
    assert_eq!(counts["available"], 4);
    assert_eq!(counts["resting"], 0);
    assert_eq!(counts["allocated"], 0);
    assert_eq!(counts["busy"], 0);

    let list = ws.oj(&["pool", "list"]).passes().json();
    assert_eq!(list["entries"].as_array().unwrap().len(), 4);

    ws.stop_daemon();
}

#[test]
fn releasing_an_available_agent_moves_it_to_resting() {
    let ws = Workspace::new();
    ws.start_daemon();
    let session = ws.approved_session();

    ws.oj(&["agent", "release", &session, "agent-1"]).passes();

    let counts = ws.oj(&["pool", "status"]).passes().json();
    assert_eq!(counts["available"], 3);
    assert_eq!(counts["resting"], 1);

    ws.stop_daemon();
}

#[test]
fn resize_shrinks_the_roster_by_removing_available_entries() {
    let ws = Workspace::new();
    ws.start_daemon();

    let counts = ws
        .oj(&["pool", "resize", "--roster", "agent-1,agent-2", "2"])
        .passes()
        .json();
    assert_eq!(counts["available"], 2);
    assert_eq!(counts["allocated"], 0);
    assert_eq!(counts["busy"], 0);
    assert_eq!(counts["resting"], 0);

    ws.stop_daemon();
}
