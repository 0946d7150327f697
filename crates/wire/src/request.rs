// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command RPC request envelope: `{id, cmd, params}`.

use serde::{Deserialize, Serialize};

/// A single request on the command channel. `cmd` is `"<category>.<action>"`;
/// category stability is a compatibility concern (see [`CommandCategory`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub id: String,
    pub cmd: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Request {
    pub fn new(id: impl Into<String>, cmd: impl Into<String>, params: serde_json::Value) -> Self {
        Self { id: id.into(), cmd: cmd.into(), params }
    }

    /// Splits `cmd` into its `<category>.<action>` halves, if well-formed.
    pub fn category_and_action(&self) -> Option<(&str, &str)> {
        self.cmd.split_once('.')
    }
}

/// The stable set of command categories accepted on the RPC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandCategory {
    Session,
    Plan,
    Exec,
    Workflow,
    Pool,
    Agent,
    Task,
    TaskAgent,
    Unity,
    Roles,
    Coordinator,
    Process,
    Config,
    Folders,
    Deps,
    Prompts,
    System,
    User,
}

impl CommandCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Plan => "plan",
            Self::Exec => "exec",
            Self::Workflow => "workflow",
            Self::Pool => "pool",
            Self::Agent => "agent",
            Self::Task => "task",
            Self::TaskAgent => "taskAgent",
            Self::Unity => "unity",
            Self::Roles => "roles",
            Self::Coordinator => "coordinator",
            Self::Process => "process",
            Self::Config => "config",
            Self::Folders => "folders",
            Self::Deps => "deps",
            Self::Prompts => "prompts",
            Self::System => "system",
            Self::User => "user",
        }
    }

    /// Parse the leading segment of a `cmd` string, if it names a known category.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "session" => Self::Session,
            "plan" => Self::Plan,
            "exec" => Self::Exec,
            "workflow" => Self::Workflow,
            "pool" => Self::Pool,
            "agent" => Self::Agent,
            "task" => Self::Task,
            "taskAgent" => Self::TaskAgent,
            "unity" => Self::Unity,
            "roles" => Self::Roles,
            "coordinator" => Self::Coordinator,
            "process" => Self::Process,
            "config" => Self::Config,
            "folders" => Self::Folders,
            "deps" => Self::Deps,
            "prompts" => Self::Prompts,
            "system" => Self::System,
            "user" => Self::User,
            _ => return None,
        })
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
