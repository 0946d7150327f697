// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-to-client frames: either the reply to one [`crate::Request`]
//! (a [`CommandResult`]) or a [`BroadcastEvent`] pushed to subscribers
//! outside of any request/response pair.

use serde::{Deserialize, Serialize};

use crate::types::BroadcastEvent;

/// Reply to a Command RPC request: `{id, success, data?, message?, error?}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResult {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResult {
    /// A successful reply carrying a serializable payload.
    pub fn ok(id: impl Into<String>, data: impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: id.into(),
            success: true,
            data: Some(serde_json::to_value(data)?),
            message: None,
            error: None,
        })
    }

    /// A successful reply with no payload (e.g. a fire-and-forget command).
    pub fn ok_empty(id: impl Into<String>) -> Self {
        Self { id: id.into(), success: true, data: None, message: None, error: None }
    }

    /// A successful reply carrying only a human-readable message.
    pub fn ok_message(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self { id: id.into(), success: true, data: None, message: Some(message.into()), error: None }
    }

    /// A failed reply. Used for `ValidationError`/`PreconditionError` (see the
    /// error handling design): surfaced synchronously, no state mutation.
    pub fn err(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self { id: id.into(), success: false, data: None, message: None, error: Some(error.into()) }
    }
}

/// A frame sent from the daemon to a connected client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic acknowledgement with no payload (e.g. hello/heartbeat plumbing).
    Ok,

    /// Health check response.
    Pong,

    /// Version handshake response.
    Hello { version: String },

    /// Daemon is shutting down; clients should stop issuing requests.
    ShuttingDown,

    /// A protocol-level error not tied to a specific request id (malformed
    /// frame, unknown command category, ...).
    Error { message: String },

    /// Reply to a Command RPC request.
    Result(CommandResult),

    /// A broadcast event, independent of any request/response pair.
    Event(BroadcastEvent),
}

impl Response {
    pub fn result(result: CommandResult) -> Self {
        Response::Result(result)
    }

    pub fn event(event: BroadcastEvent) -> Self {
        Response::Event(event)
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod response_tests;
