// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision event helpers

use super::Event;

pub(super) fn log_summary(event: &Event, t: &str) -> String {
    match event {
        Event::DecisionCreated { id, task_id, owner, source, .. } => match task_id {
            Some(task_id) => format!("{t} id={id} task={task_id} source={source:?}"),
            None => format!("{t} id={id} owner={owner} source={source:?}"),
        },
        Event::DecisionResolved { id, chosen, .. } => {
            if let Some(c) = chosen {
                format!("{t} id={id} chosen={c}")
            } else {
                format!("{t} id={id}")
            }
        }
        _ => unreachable!("not a decision event"),
    }
}

pub(super) fn task_id(event: &Event) -> Option<&crate::task::TaskId> {
    match event {
        Event::DecisionCreated { task_id, .. } => task_id.as_ref(),
        _ => unreachable!("not a decision event with task_id"),
    }
}
