//! Process-level integration suite: every test here spawns the real `oj`
//! and `ojd` binaries against an isolated tempdir workspace. See
//! `specs/prelude.rs` for the shared harness.

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/mod.rs"]
mod cli;

#[path = "specs/daemon/mod.rs"]
mod daemon;

#[path = "specs/session/mod.rs"]
mod session;

#[path = "specs/task/mod.rs"]
mod task;

#[path = "specs/pool/mod.rs"]
mod pool;

#[path = "specs/coordinator/mod.rs"]
mod coordinator;
