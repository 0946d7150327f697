// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj workflow` - in-flight workflow inspection and cancellation (`workflow.*`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Args)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommand,
}

#[derive(Subcommand)]
pub enum WorkflowCommand {
    /// Cancel a running workflow
    Cancel { workflow: String },
    /// Show a workflow's status and progress
    Status { workflow: String },
    /// List the workflows currently live for a session
    List { session: String },
    /// Show a session's completed/archived workflow history
    History { session: String },
}

pub async fn run(args: WorkflowArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        WorkflowCommand::Cancel { workflow } => {
            let result = client.send("workflow.cancel", json!({"workflow": workflow})).await?;
            format_or_json(format, &result.data, || println!("Workflow cancelled"))?;
        }
        WorkflowCommand::Status { workflow } => {
            let result = client.send("workflow.status", json!({"workflow": workflow})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        WorkflowCommand::List { session } => {
            let result = client.send("workflow.list", json!({"session": session})).await?;
            let items = result.data.and_then(|v| v.as_array().cloned()).unwrap_or_default();
            handle_list(format, &items, "No live workflows.", |items| {
                for item in items {
                    println!("{}", item);
                }
            })?;
        }
        WorkflowCommand::History { session } => {
            let result = client.send("workflow.history", json!({"session": session})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
    }
    Ok(())
}
