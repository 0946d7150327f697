// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication: a single Command RPC channel
//! carrying `{id, cmd, params}` requests and `{id, success, data?, message?,
//! error?}` replies, plus out-of-band broadcast events.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod types;
mod wire;

pub use request::{CommandCategory, Request};
pub use response::{CommandResult, Response};
pub use types::{
    BroadcastEvent, CompletionAck, CoordinatorHistoryView, TaskDependencyView, WorkflowHistoryView,
};
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
pub use wire::{read_request, write_response, MAX_MESSAGE_BYTES};

#[cfg(test)]
mod property_tests;
