// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command RPC dispatch (§6): one function per category, routed from
//! [`oj_wire::Request::category_and_action`]. Every handler is a thin
//! adapter over calls already exposed by `oj-engine`/`oj-daemon::unified` —
//! this module owns no business logic of its own, only param parsing and
//! error-to-wire translation.

use std::path::PathBuf;

use oj_adapters::{AgentAdapter, NotifyAdapter};
use oj_core::{
    AgentId, AgentName, Clock, Decision, DecisionId, DecisionOption, DecisionSource, OwnerId, QuestionData,
    SessionId, Task, TaskId, TaskType, WorkflowId, WorkflowType,
};
use oj_wire::{CommandCategory, CommandResult, Request, TaskDependencyView, WorkflowHistoryView};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::coordinator::{LlmClient, TriggerKind};
use crate::env;
use crate::unified::ERROR_RESOLUTION_SESSION_ID;

use super::ListenCtx;

pub(super) async fn handle_request<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    request: Request,
    ctx: &ListenCtx<C, L, A, N>,
    _cancel: &CancellationToken,
) -> CommandResult {
    let id = request.id.clone();
    let Some((category_str, action)) = request.category_and_action() else {
        return CommandResult::err(id, format!("malformed cmd: {}", request.cmd));
    };
    let Some(category) = CommandCategory::parse(category_str) else {
        return CommandResult::err(id, format!("unknown command category: {category_str}"));
    };

    match category {
        CommandCategory::Session => session_cmd(&id, action, request.params, ctx),
        CommandCategory::Plan => plan_cmd(&id, action, request.params, ctx),
        CommandCategory::Exec => exec_cmd(&id, action, request.params, ctx),
        CommandCategory::Workflow => workflow_cmd(&id, action, request.params, ctx),
        CommandCategory::Pool => pool_cmd(&id, action, request.params, ctx),
        CommandCategory::Agent => agent_cmd(&id, action, request.params, ctx),
        CommandCategory::Task => task_cmd(&id, action, request.params, ctx),
        CommandCategory::TaskAgent => task_agent_cmd(&id, action, request.params, ctx),
        CommandCategory::Coordinator => coordinator_cmd(&id, action, request.params, ctx),
        CommandCategory::Roles => roles_cmd(&id, action),
        CommandCategory::Config => config_cmd(&id, action),
        CommandCategory::System => system_cmd(&id, action, ctx),
        CommandCategory::User => user_cmd(&id, action, request.params, ctx),
        CommandCategory::Unity => unity_cmd(&id, action, request.params, ctx),
        // §6.1: no operation is defined by this core for these categories —
        // a minimal passthrough keeps the RPC surface complete without
        // fabricating business logic this implementation never specified.
        CommandCategory::Process | CommandCategory::Folders | CommandCategory::Deps | CommandCategory::Prompts => {
            passthrough_cmd(&id, category_str, action, request.params)
        }
    }
}

/// Parses `params` into `T`, translating a malformed shape into a
/// `ValidationError`-flavored [`CommandResult`] (§7) rather than a panic.
fn parse<T: for<'de> Deserialize<'de>>(id: &str, params: Value) -> Result<T, CommandResult> {
    serde_json::from_value(params).map_err(|err| CommandResult::err(id, format!("invalid params: {err}")))
}

fn ok<T: serde::Serialize>(id: &str, data: T) -> CommandResult {
    match CommandResult::ok(id, data) {
        Ok(result) => result,
        Err(err) => CommandResult::err(id, format!("failed to serialize response: {err}")),
    }
}

macro_rules! try_parse {
    ($id:expr, $params:expr) => {
        match parse($id, $params) {
            Ok(v) => v,
            Err(err) => return err,
        }
    };
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionParams {
    session: SessionId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PauseParams {
    session: SessionId,
    #[serde(default)]
    reason: Option<String>,
}

fn session_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "create" => ok(id, ctx.unified.create_session()),
        "get" => {
            let p: SessionParams = try_parse!(id, params);
            ok(id, ctx.unified.get_session(&p.session))
        }
        "status" => {
            let p: SessionParams = try_parse!(id, params);
            ok(id, ctx.unified.session_status(&p.session))
        }
        "approve" => {
            let p: SessionParams = try_parse!(id, params);
            match ctx.unified.approve_session(&p.session) {
                Ok(session) => ok(id, session),
                Err(err) => CommandResult::err(id, err.to_string()),
            }
        }
        "cancel" => {
            let p: SessionParams = try_parse!(id, params);
            ctx.unified.cancel_session(&p.session);
            CommandResult::ok_empty(id)
        }
        "complete" => {
            let p: SessionParams = try_parse!(id, params);
            match ctx.unified.complete_session(&p.session) {
                Ok(()) => CommandResult::ok_empty(id),
                Err(err) => CommandResult::err(id, err.to_string()),
            }
        }
        "pause" => {
            let p: PauseParams = try_parse!(id, params);
            ctx.unified.pause_evaluations(&p.session, p.reason.unwrap_or_else(|| "session.pause".to_string()));
            CommandResult::ok_empty(id)
        }
        "resume" => {
            let p: SessionParams = try_parse!(id, params);
            ctx.unified.resume_evaluations(&p.session);
            CommandResult::ok_empty(id)
        }
        _ => unknown_action(id, "session", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetPlanPathParams {
    session: SessionId,
    path: PathBuf,
}

fn plan_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "setPath" => {
            let p: SetPlanPathParams = try_parse!(id, params);
            ok(id, ctx.unified.set_plan_path(&p.session, p.path))
        }
        _ => unknown_action(id, "plan", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartTaskParams {
    session: SessionId,
    task: TaskId,
    #[serde(default)]
    workflow_type: Option<WorkflowType>,
}

fn start_task<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    let p: StartTaskParams = try_parse!(id, params);
    let workflow_type = p.workflow_type.unwrap_or(WorkflowType::TaskImplementation);
    match ctx.unified.start_task_workflow(p.session, p.task, workflow_type) {
        Ok(handle) => ok(id, handle.workflow_id),
        Err(err) => CommandResult::err(id, err.to_string()),
    }
}

/// `exec` and `task` both expose "start a task's workflow" — §8's scenarios
/// use both spellings (`exec.start`, `task.start`) for the same gated entry
/// point, so both route here (see DESIGN.md).
fn exec_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "start" => start_task(id, params, ctx),
        "status" => {
            let p: SessionParams = try_parse!(id, params);
            let ready = ctx.tasks.get_ready(&p.session);
            let active_workflows = ctx.engine.live_for_session(&p.session).len();
            ok(id, serde_json::json!({"ready": ready, "activeWorkflows": active_workflows}))
        }
        _ => unknown_action(id, "exec", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowIdParams {
    workflow: WorkflowId,
}

fn workflow_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "cancel" => {
            let p: WorkflowIdParams = try_parse!(id, params);
            ok(id, ctx.unified.cancel_workflow(p.workflow))
        }
        "status" => {
            let p: WorkflowIdParams = try_parse!(id, params);
            match ctx.engine.status(p.workflow) {
                Some(status) => ok(id, serde_json::json!({"status": status, "progress": ctx.engine.progress(p.workflow)})),
                None => CommandResult::err(id, format!("unknown workflow: {}", p.workflow)),
            }
        }
        "list" => {
            let p: SessionParams = try_parse!(id, params);
            ok(id, ctx.engine.live_for_session(&p.session))
        }
        "history" => {
            let p: SessionParams = try_parse!(id, params);
            let file = ctx.storage.load_workflow_history(&p.session).unwrap_or_default();
            ok(id, WorkflowHistoryView { completed: file.completed, archived: file.archived })
        }
        _ => unknown_action(id, "workflow", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResizeParams {
    roster: Vec<String>,
    new_size: usize,
}

fn pool_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "status" => ok(id, ctx.pool.counts()),
        "list" => ok(id, ctx.pool.snapshot()),
        "resize" => {
            let p: ResizeParams = try_parse!(id, params);
            let roster: Vec<AgentName> = p.roster.into_iter().map(AgentName::new).collect();
            ctx.pool.resize(&roster, p.new_size);
            ok(id, ctx.pool.counts())
        }
        _ => unknown_action(id, "pool", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentCompleteParams {
    #[serde(default)]
    session: Option<SessionId>,
    workflow: WorkflowId,
    stage: String,
    result: String,
    #[serde(default)]
    task: Option<TaskId>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentReleaseParams {
    session: SessionId,
    agent: String,
}

fn agent_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        // Agent completion callback (§6): an external agent CLI signals a
        // workflow stage finished. Routed through CompletionRendezvous —
        // `session` is accepted but unused, it only narrows the key when
        // `task` disambiguates a multi-task stage.
        "complete" => {
            let p: AgentCompleteParams = try_parse!(id, params);
            let _ = p.session;
            let key = oj_engine::RendezvousKey::new(p.workflow, p.stage, p.task);
            let signal = oj_engine::CompletionSignal {
                result: p.result,
                payload: p.data,
                signaled_at_ms: ctx.clock.epoch_ms(),
            };
            let delivered = ctx.rendezvous.signal_completion(key, signal);
            ok(id, oj_wire::CompletionAck { delivered })
        }
        "release" => {
            let p: AgentReleaseParams = try_parse!(id, params);
            ctx.unified.on_agent_released(&p.session, &AgentName::new(p.agent));
            CommandResult::ok_empty(id)
        }
        _ => unknown_action(id, "agent", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskGetParams {
    session: SessionId,
    task: TaskId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskCreateParams {
    session: SessionId,
    task: TaskId,
    description: String,
    #[serde(default)]
    task_type: Option<TaskType>,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    dependencies: Vec<TaskId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDependencyParams {
    session: SessionId,
    task: TaskId,
    depends_on: TaskId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDeleteParams {
    session: SessionId,
    task: TaskId,
    #[serde(default)]
    reason: Option<String>,
}

/// `TaskStore::load_session` unconditionally replaces the session's file
/// (unlike `UnifiedCoordinator::load_session`'s lazy init), so callers that
/// mutate the task store must guard against clobbering in-memory state a
/// prior request already built up.
fn ensure_tasks_loaded<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    ctx: &ListenCtx<C, L, A, N>,
    session: &SessionId,
) {
    if ctx.tasks.snapshot_session(session).is_none() {
        let file = ctx.storage.load_tasks(session).unwrap_or_default();
        ctx.tasks.load_session(session.clone(), file);
    }
}

/// §4.2/§6/§9: writes a session's task set back to `tasks.json` after every
/// RPC that mutates it.
fn persist_tasks<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    ctx: &ListenCtx<C, L, A, N>,
    session: &SessionId,
) {
    let Some(file) = ctx.tasks.snapshot_session(session) else { return };
    if let Err(err) = ctx.storage.save_tasks(session, &file) {
        warn!(%session, %err, "failed to persist tasks");
    }
}

fn task_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "start" => start_task(id, params, ctx),
        "get" => {
            let p: TaskGetParams = try_parse!(id, params);
            ensure_tasks_loaded(ctx, &p.session);
            match ctx.tasks.get_task(&p.session, &p.task) {
                Some(task) => ok(id, task),
                None => CommandResult::err(id, format!("unknown task: {}", p.task)),
            }
        }
        "list" => {
            let p: SessionParams = try_parse!(id, params);
            ensure_tasks_loaded(ctx, &p.session);
            ok(id, ctx.tasks.snapshot_session(&p.session).unwrap_or_default())
        }
        "create" => {
            let p: TaskCreateParams = try_parse!(id, params);
            ensure_tasks_loaded(ctx, &p.session);
            let mut task = Task::new(
                p.task,
                p.session,
                p.description,
                p.task_type.unwrap_or(TaskType::Implementation),
                ctx.clock.epoch_ms(),
            );
            task.priority = p.priority;
            task.dependencies = p.dependencies;
            ctx.tasks.upsert_task(task.clone());
            persist_tasks(ctx, &p.session);
            ok(id, task)
        }
        "addDependency" => {
            let p: TaskDependencyParams = try_parse!(id, params);
            ensure_tasks_loaded(ctx, &p.session);
            match ctx.tasks.add_dependency(&p.session, &p.task, p.depends_on.clone()) {
                Ok(()) => {
                    ctx.events.emit(oj_core::Event::DepsList {
                        task_id: p.task.clone(),
                        dependencies: ctx.tasks.dependencies(&p.session, &p.task),
                    });
                    persist_tasks(ctx, &p.session);
                    CommandResult::ok_empty(id)
                }
                Err(err) => CommandResult::err(id, err.to_string()),
            }
        }
        "removeDependency" => {
            let p: TaskDependencyParams = try_parse!(id, params);
            ensure_tasks_loaded(ctx, &p.session);
            match ctx.tasks.remove_dependency(&p.session, &p.task, &p.depends_on) {
                Ok(()) => {
                    ctx.events.emit(oj_core::Event::DepsList {
                        task_id: p.task.clone(),
                        dependencies: ctx.tasks.dependencies(&p.session, &p.task),
                    });
                    persist_tasks(ctx, &p.session);
                    CommandResult::ok_empty(id)
                }
                Err(err) => CommandResult::err(id, err.to_string()),
            }
        }
        "delete" => {
            let p: TaskDeleteParams = try_parse!(id, params);
            ensure_tasks_loaded(ctx, &p.session);
            match ctx.tasks.delete_task(&p.session, &p.task, p.reason.unwrap_or_default()) {
                Some(task) => {
                    persist_tasks(ctx, &p.session);
                    ok(id, task)
                }
                None => CommandResult::err(id, format!("unknown task: {}", p.task)),
            }
        }
        _ => unknown_action(id, "task", action),
    }
}

/// `taskAgent`: which agent (if any) currently holds a claim mentioning
/// this task, read off the pool's own claim bookkeeping rather than a
/// separate index.
fn task_agent_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "get" => {
            let p: TaskGetParams = try_parse!(id, params);
            let _ = p.session;
            let snapshot = ctx.pool.snapshot();
            let holder = snapshot.entries.into_iter().find(|e| match &e.state {
                oj_core::AgentPoolState::Allocated(claim) | oj_core::AgentPoolState::Busy(claim) => {
                    claim.task.as_ref() == Some(&p.task)
                }
                _ => false,
            });
            ok(id, holder)
        }
        _ => unknown_action(id, "taskAgent", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoordinatorEvaluateParams {
    session: SessionId,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoordinatorHistoryParams {
    session: SessionId,
}

fn coordinator_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "evaluate" => {
            let p: CoordinatorEvaluateParams = try_parse!(id, params);
            ctx.coordinator.queue_event(
                p.session,
                TriggerKind::ManualEvaluation,
                serde_json::json!({"reason": p.reason.unwrap_or_else(|| "coordinator.evaluate".to_string())}),
            );
            CommandResult::ok_empty(id)
        }
        "history" => {
            let p: CoordinatorHistoryParams = try_parse!(id, params);
            ok(id, ctx.storage.load_coordinator_history(&p.session).unwrap_or_default())
        }
        _ => unknown_action(id, "coordinator", action),
    }
}

fn roles_cmd(id: &str, action: &str) -> CommandResult {
    match action {
        "list" => ok(id, env::agent_roles()),
        _ => unknown_action(id, "roles", action),
    }
}

fn config_cmd(id: &str, action: &str) -> CommandResult {
    match action {
        "get" => ok(
            id,
            serde_json::json!({
                "protocolVersion": env::PROTOCOL_VERSION,
                "ipcTimeoutMs": env::ipc_timeout().as_millis(),
                "drainTimeoutMs": env::drain_timeout().as_millis(),
                "agentRoster": env::agent_roster(),
                "agentRoles": env::agent_roles(),
            }),
        ),
        _ => unknown_action(id, "config", action),
    }
}

fn system_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "ping" => CommandResult::ok_empty(id),
        "status" => ok(
            id,
            serde_json::json!({
                "protocolVersion": env::PROTOCOL_VERSION,
                "uptimeSecs": ctx.start_time.elapsed().as_secs(),
            }),
        ),
        "shutdown" => {
            ctx.shutdown.notify_waiters();
            CommandResult::ok_empty(id)
        }
        _ => unknown_action(id, "system", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserAskParams {
    task: TaskId,
    #[serde(default)]
    agent: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    question_data: Option<QuestionData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRespondParams {
    decision: String,
    #[serde(default)]
    chosen: Option<usize>,
    #[serde(default)]
    choices: Vec<usize>,
    #[serde(default)]
    message: Option<String>,
}

/// `user.ask` attaches a question to a task and hands the new decision id
/// straight back in the `CommandResult` — `Event::UserQuestionAsked` has no
/// wire translation (see `listener::translate`), so this is the only way a
/// caller learns the id it must pass to `user.respond`.
fn user_ask<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    let p: UserAskParams = try_parse!(id, params);
    let session = p.task.session_id();
    ctx.tasks.mark_awaiting_decision(
        &session,
        &p.task,
        p.context.clone().unwrap_or_default(),
        ctx.clock.epoch_ms(),
    );
    persist_tasks(ctx, &session);

    let now_ms = ctx.clock.epoch_ms();
    let decision = Decision {
        id: DecisionId::new(),
        agent_id: AgentId::new(p.agent.unwrap_or_else(|| "system".to_string())),
        owner: OwnerId::task(p.task.clone()),
        project: session.as_str().to_string(),
        source: DecisionSource::Question,
        context: p.context.unwrap_or_default(),
        options: p.options.into_iter().map(DecisionOption::new).collect(),
        questions: p.question_data.clone(),
        choices: Vec::new(),
        message: None,
        created_at_ms: now_ms,
        resolved_at_ms: None,
        superseded_by: None,
    };
    let decision_id = decision.id;
    ctx.decisions.lock().insert(decision_id, decision);

    ctx.events.emit(oj_core::Event::UserQuestionAsked {
        task_id: p.task,
        question: p.question_data.unwrap_or(QuestionData { questions: Vec::new() }),
    });

    ok(id, serde_json::json!({"decisionId": decision_id}))
}

/// A decision must be unresolved, a single `chosen` index must fall within its option range,
/// per-question `choices` must match the question count and each choice its
/// own option range, and at least one of `chosen`/`choices`/`message` must
/// be present.
fn user_respond<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    let p: UserRespondParams = try_parse!(id, params);
    let decision_id = DecisionId::from_string(&p.decision);

    let mut decisions = ctx.decisions.lock();
    let Some(decision) = decisions.get_mut(&decision_id) else {
        return CommandResult::err(id, format!("decision not found: {}", p.decision));
    };
    if decision.is_resolved() {
        return CommandResult::err(id, format!("decision {} is already resolved", p.decision));
    }
    if let Some(choice) = p.chosen {
        if choice == 0 || choice > decision.options.len() {
            return CommandResult::err(id, format!("choice {choice} out of range (1..{})", decision.options.len()));
        }
    }
    if !p.choices.is_empty() {
        if let Some(ref qd) = decision.questions {
            if p.choices.len() != qd.questions.len() {
                return CommandResult::err(
                    id,
                    format!("expected {} choices (one per question), got {}", qd.questions.len(), p.choices.len()),
                );
            }
            for (i, &c) in p.choices.iter().enumerate() {
                let opt_count = qd.questions[i].options.len();
                if c == 0 || c > opt_count {
                    return CommandResult::err(
                        id,
                        format!("choice {c} for question {} out of range (1..{opt_count})", i + 1),
                    );
                }
            }
        }
    }
    if p.chosen.is_none() && p.choices.is_empty() && p.message.is_none() {
        return CommandResult::err(id, "must provide either a choice, choices, or a message".to_string());
    }

    let now_ms = ctx.clock.epoch_ms();
    decision.choices = match p.chosen {
        Some(c) => vec![c],
        None => p.choices.clone(),
    };
    decision.message = p.message.clone();
    decision.resolved_at_ms = Some(now_ms);
    let task_id = decision.owner.as_task().cloned();
    drop(decisions);

    ctx.events.emit(oj_core::Event::DecisionResolved {
        id: decision_id,
        chosen: p.chosen,
        choices: p.choices,
        message: p.message,
        resolved_at_ms: now_ms,
    });

    if let Some(task_id) = task_id {
        let session = task_id.session_id();
        ctx.tasks.mark_in_progress(&session, &task_id, WorkflowId::new(), now_ms);
        persist_tasks(ctx, &session);
        ctx.coordinator.queue_event(session, TriggerKind::UserResponded, serde_json::json!({"task": task_id}));
    }

    CommandResult::ok_empty(id)
}

fn user_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "ask" => user_ask(id, params, ctx),
        "respond" => user_respond(id, params, ctx),
        _ => unknown_action(id, "user", action),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnityErrorParams {
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// `unity.error`: Unity's own subsystem owns the detail of what failed; this
/// core only needs to wake the coordinator for the shared error-resolution
/// session (§4.6, `ERROR_RESOLUTION_SESSION_ID`) and let it decide whether
/// to dispatch an `error_resolution` workflow — nothing here synthesizes a
/// `TaskId`, since error-resolution workflows run untargeted (`task_id =
/// None`).
fn unity_cmd<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    id: &str,
    action: &str,
    params: Value,
    ctx: &ListenCtx<C, L, A, N>,
) -> CommandResult {
    match action {
        "error" => {
            let p: UnityErrorParams = try_parse!(id, params);
            let session = SessionId::new(ERROR_RESOLUTION_SESSION_ID);
            let payload = serde_json::json!({"context": p.context, "data": p.data});
            ctx.coordinator.queue_event(session, TriggerKind::UnityError, payload);
            CommandResult::ok_empty(id)
        }
        _ => passthrough_cmd(id, "unity", action, params),
    }
}

/// §6.1: categories with no operation defined by this core echo their
/// params back as the response payload, so a client can tell the request
/// was received without this implementation inventing a business surface
/// for a subsystem (Unity's broader pipeline, the paused-process manager,
/// the context gatherer, prompt templates) that lives outside it.
fn passthrough_cmd(id: &str, category: &str, action: &str, params: Value) -> CommandResult {
    ok(id, serde_json::json!({"category": category, "action": action, "received": params}))
}

fn unknown_action(id: &str, category: &str, action: &str) -> CommandResult {
    CommandResult::err(id, format!("unknown action: {category}.{action}"))
}
