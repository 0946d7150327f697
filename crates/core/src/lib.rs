// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-core: entity types and state machines shared by every other crate in
//! the workspace — the agent/task/session/workflow domain model, the event
//! and effect vocabularies, and small id/clock utilities. No runtime state
//! lives here; `oj-engine` and `oj-daemon` hold that.

pub mod macros;

pub mod agent;
pub mod agent_pool;
pub mod clock;
pub mod container;
pub mod coordinator;
pub mod decision;
pub mod effect;
pub mod event;
pub mod id;
pub mod owner;
pub mod project;
pub mod session;
pub mod task;
pub mod time_fmt;
pub mod timer;
pub mod workflow;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{agent_dir, AgentError, AgentId, AgentState, PromptResponse};
pub use agent_pool::{
    AgentClaim, AgentName, AgentPoolEntry, AgentPoolState, RoleId, UnknownRole, REST_COOLDOWN,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use container::ContainerConfig;
pub use coordinator::{
    push_bounded, ArchivedWorkflow, CompletedWorkflowSummary, CoordinatorHistoryEntry,
    DispatchOutcome, COORDINATOR_HISTORY_WINDOW, REASONING_MAX_CHARS, WORKFLOW_ARCHIVE_GRACE,
    WORKFLOW_HISTORY_WINDOW,
};
pub use decision::{Decision, DecisionId, DecisionOption, DecisionSource};
pub use effect::Effect;
pub use event::{Event, PromptType, QuestionData, QuestionEntry, QuestionOption};
pub use id::{short, IdGen, UuidIdGen};
pub use owner::{OwnerId, OwnerMismatch};
pub use project::{namespace_to_option, scoped_name, split_scoped_name, Namespace};
pub use session::{PlanSession, SessionId, SessionStatus};
pub use task::{InvalidTaskId, Task, TaskAttempt, TaskId, TaskStatus, TaskType};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
pub use timer::{TimerId, TimerKind};
pub use workflow::{
    ConflictResolution, OccupancyKind, TaskConflict, TaskOccupancy, Workflow, WorkflowId,
    WorkflowProgress, WorkflowStatus, WorkflowType,
};
