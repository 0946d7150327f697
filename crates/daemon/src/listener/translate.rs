// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates the internal domain event bus ([`oj_core::Event`]) into the
//! external wire broadcast shape ([`oj_wire::BroadcastEvent`]). The two are
//! deliberately distinct types (§6): the internal bus carries every
//! component's bookkeeping detail, the wire enum carries only the literal
//! event names an external client is allowed to depend on. Anything without
//! a wire counterpart is silently dropped here rather than forwarded.

use oj_adapters::{AgentAdapter, NotifyAdapter};
use oj_core::{Clock, Event};
use oj_wire::BroadcastEvent;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::ListenCtx;
use crate::coordinator::LlmClient;

/// Per-connection translation state. `oj_core::Event::PoolChanged` only
/// carries the post-change snapshot; the wire's `pool.changed` wants a
/// before/after pair, so each connection tracks the last count it forwarded.
pub struct EventTranslator {
    last_available: AtomicUsize,
    seen_first: std::sync::atomic::AtomicBool,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self { last_available: AtomicUsize::new(0), seen_first: std::sync::atomic::AtomicBool::new(false) }
    }

    pub fn translate<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
        &mut self,
        ctx: &ListenCtx<C, L, A, N>,
        event: &Event,
    ) -> Option<BroadcastEvent> {
        match event {
            Event::SessionCreated { session_id, created_at_ms } => {
                Some(BroadcastEvent::SessionCreated { session_id: session_id.clone(), created_at_ms: *created_at_ms })
            }
            Event::SessionUpdated { session_id, status } => Some(BroadcastEvent::SessionUpdated {
                session_id: session_id.clone(),
                status: *status,
                updated_at_ms: ctx.clock.epoch_ms(),
            }),
            Event::WorkflowCompleted { workflow_id, session_id, status } => {
                let task_id = ctx.unified.workflow_mapping(*workflow_id).and_then(|(_, task)| task);
                Some(BroadcastEvent::WorkflowCompleted {
                    workflow_id: *workflow_id,
                    session_id: session_id.clone(),
                    task_id,
                    terminal_status: *status,
                    completed_at_ms: ctx.clock.epoch_ms(),
                })
            }
            Event::WorkflowEvent { workflow_id, event_type, .. } => {
                let (session_id, _) = ctx.unified.workflow_mapping(*workflow_id)?;
                let percentage = ctx.engine.progress(*workflow_id).map(|p| p.percentage).unwrap_or(0.0);
                Some(BroadcastEvent::WorkflowEvent {
                    workflow_id: *workflow_id,
                    session_id,
                    phase: event_type.clone(),
                    percentage,
                })
            }
            Event::WorkflowsCleaned { session_id, count } => {
                Some(BroadcastEvent::WorkflowsCleaned { session_id: session_id.clone(), removed_count: *count })
            }
            Event::DepsList { task_id, dependencies } => {
                let dependents =
                    ctx.tasks.get_task(&task_id.session_id(), task_id).map(|t| t.dependents).unwrap_or_default();
                Some(BroadcastEvent::DepsList {
                    session_id: task_id.session_id(),
                    tasks: vec![oj_wire::TaskDependencyView {
                        task_id: task_id.clone(),
                        dependencies: dependencies.clone(),
                        dependents,
                    }],
                })
            }
            // `user.questionAsked` carries a decision id the wire DTO needs
            // but the internal event doesn't — the `user.ask` RPC handler
            // hands the id back directly in its `CommandResult` instead of
            // relying on this broadcast path to deliver it.
            Event::PoolChanged { available, .. } => {
                let before = if self.seen_first.swap(true, Ordering::SeqCst) {
                    self.last_available.load(Ordering::SeqCst)
                } else {
                    *available
                };
                self.last_available.store(*available, Ordering::SeqCst);
                Some(BroadcastEvent::PoolChanged { before_available: before, after_available: *available })
            }
            // Agent/decision/system-shutdown/custom events have no wire
            // counterpart; clients observe their effects indirectly through
            // the events above (task/workflow/pool state changes).
            _ => None,
        }
    }
}

impl Default for EventTranslator {
    fn default() -> Self {
        Self::new()
    }
}
