// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! apc-storage: durable JSON-backed persistence for the control plane.
//!
//! Every file this crate writes is a versioned JSON envelope
//! (`{"v": <u32>, "data": <T>}`) written with write-tmp-then-rename so a
//! crash mid-write never leaves a torn file behind. There is no WAL and no
//! replay: each entity kind owns one small file, read on startup and
//! rewritten whole on every mutation. See [`atomic::write_json_atomic`].

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod atomic;
pub mod layout;
pub mod state;

pub use atomic::{read_json, write_json_atomic, StorageError};
pub use layout::StateLayout;
pub use state::{
    AgentPoolFile, CoordinatorHistoryFile, SessionRegistry, SessionRegistryEntry, StateStore,
    TaskStoreFile, WorkflowHistoryFile,
};
