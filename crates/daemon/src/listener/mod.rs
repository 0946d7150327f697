// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket RPC listener (§6). One accepted connection runs a single
//! long-lived loop: it races an incoming [`oj_wire::Request`] frame against
//! the session's [`oj_engine::EventBroadcaster`] subscription, writing
//! whichever resolves first back as a [`oj_wire::Response`] — a request gets
//! `Response::Result`, a domain event gets `Response::Event`. There is no
//! separate subscribe handshake: every connection sees broadcasts for as
//! long as it stays open.

mod dispatch;
mod translate;

use std::sync::Arc;
use std::time::Instant;

use oj_adapters::{AgentAdapter, NotifyAdapter};
use oj_core::{Clock, Decision, DecisionId};
use oj_engine::{AgentPoolRuntime, CompletionRendezvous, EventBroadcaster, TaskStore, WorkflowEngine};
use oj_storage::StateStore;
use oj_wire::{self, CommandResult, ProtocolError, Request, Response};
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::coordinator::{CoordinatorAgent, LlmClient};
use crate::env::ipc_timeout;
use crate::unified::UnifiedCoordinator;
use translate::EventTranslator;

/// Shared daemon context handed to every connection task.
pub struct ListenCtx<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter> {
    pub unified: Arc<UnifiedCoordinator<C, L, A, N>>,
    pub coordinator: Arc<CoordinatorAgent<C, L>>,
    pub tasks: Arc<TaskStore>,
    pub pool: Arc<AgentPoolRuntime<C>>,
    pub engine: Arc<WorkflowEngine>,
    pub rendezvous: Arc<CompletionRendezvous>,
    pub storage: Arc<StateStore>,
    pub events: Arc<EventBroadcaster>,
    pub clock: C,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
    /// Decisions created by `user.ask`, resolved by `user.respond`. Kept
    /// in-process only — a decision not yet answered when the daemon
    /// restarts is lost, the same as any other in-flight RPC state.
    pub decisions: Mutex<HashMap<DecisionId, Decision>>,
}

/// Accepts Unix socket connections and spawns one task per connection.
pub struct Listener<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter> {
    unix: UnixListener,
    ctx: Arc<ListenCtx<C, L, A, N>>,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl<C: Clock + 'static, L: LlmClient, A: AgentAdapter, N: NotifyAdapter> Listener<C, L, A, N> {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx<C, L, A, N>>) -> Self {
        Self { unix, ctx }
    }

    /// Runs the accept loop until the process is torn down. Never returns
    /// on its own; the caller aborts the task on shutdown.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    let (reader, writer) = stream.into_split();
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(err);
                        }
                    });
                }
                Err(err) => error!(%err, "unix accept error"),
            }
        }
    }
}

fn log_connection_error(err: ConnectionError) {
    match err {
        ConnectionError::Protocol(ProtocolError::Io(ref io)) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            debug!("client disconnected");
        }
        other => warn!(%other, "connection error"),
    }
}

/// Drives one connection: reads request frames, dispatches each to
/// [`dispatch::handle_request`], and interleaves [`oj_wire::Response::Event`]
/// frames translated from the shared event bus. Ends when the client closes
/// its side of the socket.
async fn handle_connection<R, W, C, L, A, N>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx<C, L, A, N>,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    C: Clock + 'static,
    L: LlmClient,
    A: AgentAdapter,
    N: NotifyAdapter,
{
    let mut event_rx = ctx.events.subscribe();
    let mut translator = EventTranslator::new();

    loop {
        tokio::select! {
            request = oj_wire::read_request(&mut reader) => {
                let request = match request {
                    Ok(request) => request,
                    Err(ProtocolError::Io(ref io)) if io.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
                    Err(err) => return Err(err.into()),
                };
                let response = handle_one_request(request, ctx).await;
                write_with_timeout(&mut writer, &response).await?;
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if let Some(broadcast) = translator.translate(ctx, &event) {
                            write_with_timeout(&mut writer, &Response::Event(broadcast)).await?;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event subscriber lagged, dropping missed broadcasts");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        // The broadcaster outlives every connection in practice;
                        // treat closure the same as a clean disconnect.
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn write_with_timeout<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<(), ConnectionError> {
    tokio::time::timeout(ipc_timeout(), oj_wire::write_response(writer, response))
        .await
        .map_err(|_| ConnectionError::Protocol(ProtocolError::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "write timed out"))))?
        .map_err(Into::into)
}

/// Races request handling against the cancellation a client disconnect
/// would otherwise leave orphaned — handlers here are all cheap in-memory
/// calls, so in practice this only guards against a hung downstream call.
async fn handle_one_request<C: Clock, L: LlmClient, A: AgentAdapter, N: NotifyAdapter>(
    request: Request,
    ctx: &ListenCtx<C, L, A, N>,
) -> Response {
    info!(id = %request.id, cmd = %request.cmd, "received request");
    let cancel = CancellationToken::new();
    let result = dispatch::handle_request(request, ctx, &cancel).await;
    Response::Result(result)
}

#[allow(dead_code)]
fn unknown_command(id: impl Into<String>) -> CommandResult {
    CommandResult::err(id, "unknown command")
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
