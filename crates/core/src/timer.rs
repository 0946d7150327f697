// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifier type for tracking scheduled timers.
//!
//! TimerId uniquely identifies a timer instance used for scheduling delayed
//! actions: an agent's resting cooldown, or a session's coordinator
//! debounce/cooldown fire.

use crate::agent::AgentId;
use crate::session::SessionId;

crate::define_id! {
    /// Unique identifier for a timer instance.
    ///
    /// Timers are used to schedule delayed actions within the system, such as
    /// an agent's resting cooldown or a coordinator evaluation fire.
    pub struct TimerId;
}

impl TimerId {
    pub fn agent_rest(agent_id: &AgentId) -> Self {
        TimerKind::AgentRest(agent_id.clone()).to_timer_id()
    }

    pub fn coordinator_fire(session_id: &SessionId) -> Self {
        TimerKind::CoordinatorFire(session_id.clone()).to_timer_id()
    }

    /// Parse this timer ID into a typed `TimerKind`.
    pub fn kind(&self) -> Option<TimerKind> {
        TimerKind::parse(self.as_str())
    }
}

/// Parsed representation of a timer ID for type-safe routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// An agent's resting cooldown, after release and before becoming
    /// available again.
    AgentRest(AgentId),
    /// A session's coordinator debounce/cooldown fire timer. Only one is
    /// ever live per session; re-arming cancels and replaces it.
    CoordinatorFire(SessionId),
}

impl TimerKind {
    /// Parse a timer ID string into a typed `TimerKind`.
    ///
    /// Returns `None` for unrecognized timer ID formats.
    pub fn parse(id: &str) -> Option<TimerKind> {
        if let Some(rest) = id.strip_prefix("agent-rest:") {
            return Some(TimerKind::AgentRest(AgentId::new(rest)));
        }
        if let Some(rest) = id.strip_prefix("coordinator-fire:") {
            return Some(TimerKind::CoordinatorFire(SessionId::new(rest)));
        }
        None
    }

    /// Format this `TimerKind` back into a canonical `TimerId`.
    pub fn to_timer_id(&self) -> TimerId {
        match self {
            TimerKind::AgentRest(agent_id) => TimerId::new(format!("agent-rest:{agent_id}")),
            TimerKind::CoordinatorFire(session_id) => {
                TimerId::new(format!("coordinator-fire:{session_id}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
