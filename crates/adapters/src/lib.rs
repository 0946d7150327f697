// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oj-adapters: the external agent CLI process runner contract and its
//! built-in implementations. This crate is deliberately small — the control
//! plane's behavior never depends on which [`AgentAdapter`] backs a given
//! deployment.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod agent;
pub mod notify;

pub use agent::{
    AgentAdapter, AgentAdapterError, AgentConfig, AgentHandle, AgentReconnectConfig, ProcessAdapter,
};
#[cfg(any(test, feature = "test-support"))]
pub use agent::fake::FakeAdapter;
pub use notify::{DesktopNotifyAdapter, NotifyAdapter, NotifyError};
