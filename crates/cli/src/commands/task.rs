// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj task` - task CRUD, dependency edges, and workflow start
//! (`task.*`/`exec.*`/`taskAgent.*` — `exec.start` and `task.start` are the
//! same dispatch entry point under two spellings, see `oj-daemon`'s own
//! `listener::dispatch::exec_cmd`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Start a task's workflow (gated on an approved session and met dependencies)
    Start {
        session: String,
        task: String,
        #[arg(long)]
        workflow_type: Option<String>,
    },
    /// Fetch one task
    Get { session: String, task: String },
    /// List every task in a session
    List { session: String },
    /// Create a task
    Create {
        session: String,
        task: String,
        description: String,
        #[arg(long)]
        task_type: Option<String>,
        #[arg(long, default_value_t = 0)]
        priority: i32,
        #[arg(long, value_delimiter = ',')]
        dependencies: Vec<String>,
    },
    /// Add a dependency edge
    AddDependency { session: String, task: String, depends_on: String },
    /// Remove a dependency edge
    RemoveDependency { session: String, task: String, depends_on: String },
    /// Delete a task
    Delete {
        session: String,
        task: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Show which agent (if any) currently holds a task's claim
    Agent { session: String, task: String },
    /// Show the ready queue and active workflow count for a session
    ExecStatus { session: String },
}

pub async fn run(args: TaskArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        TaskCommand::Start { session, task, workflow_type } => {
            let result = client
                .send("task.start", json!({"session": session, "task": task, "workflowType": workflow_type}))
                .await?;
            format_or_json(format, &result.data, || println!("Workflow dispatched: {:?}", result.data))?;
        }
        TaskCommand::Get { session, task } => {
            let result = client.send("task.get", json!({"session": session, "task": task})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        TaskCommand::List { session } => {
            let result = client.send("task.list", json!({"session": session})).await?;
            let items = result.data.and_then(|v| v.as_array().cloned()).unwrap_or_default();
            handle_list(format, &items, "No tasks found.", |items| {
                for item in items {
                    println!("{}", item);
                }
            })?;
        }
        TaskCommand::Create { session, task, description, task_type, priority, dependencies } => {
            let result = client
                .send(
                    "task.create",
                    json!({
                        "session": session,
                        "task": task,
                        "description": description,
                        "taskType": task_type,
                        "priority": priority,
                        "dependencies": dependencies,
                    }),
                )
                .await?;
            format_or_json(format, &result.data, || println!("Task created: {:?}", result.data))?;
        }
        TaskCommand::AddDependency { session, task, depends_on } => {
            client.send("task.addDependency", json!({"session": session, "task": task, "dependsOn": depends_on})).await?;
            println!("Dependency added");
        }
        TaskCommand::RemoveDependency { session, task, depends_on } => {
            client
                .send("task.removeDependency", json!({"session": session, "task": task, "dependsOn": depends_on}))
                .await?;
            println!("Dependency removed");
        }
        TaskCommand::Delete { session, task, reason } => {
            let result = client.send("task.delete", json!({"session": session, "task": task, "reason": reason})).await?;
            format_or_json(format, &result.data, || println!("Task deleted"))?;
        }
        TaskCommand::Agent { session, task } => {
            let result = client.send("taskAgent.get", json!({"session": session, "task": task})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        TaskCommand::ExecStatus { session } => {
            let result = client.send("exec.status", json!({"session": session})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
    }
    Ok(())
}
