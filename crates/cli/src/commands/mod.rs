// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One module per RPC category (`oj_wire::CommandCategory`), each owning the
//! clap subcommand shape and the handful of lines that translate it into a
//! `DaemonClient::send` call.

pub mod agent;
pub mod coordinator;
pub mod daemon;
pub mod plan;
pub mod pool;
pub mod roles_config;
pub mod session;
pub mod system;
pub mod task;
pub mod unity;
pub mod user;
pub mod workflow;
