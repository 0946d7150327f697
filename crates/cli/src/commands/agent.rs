// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj agent` - completion callback and release (`agent.*`). These are the
//! commands an external agent CLI (not a human) invokes from inside a
//! workflow stage to signal back to the daemon.

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommand,
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Signal that a workflow stage completed
    Complete {
        workflow: String,
        stage: String,
        result: String,
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        data: Option<String>,
    },
    /// Release an agent back to the pool
    Release { session: String, agent: String },
}

pub async fn run(args: AgentArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        AgentCommand::Complete { workflow, stage, result, session, task, data } => {
            let data: Option<serde_json::Value> = match data {
                Some(raw) => Some(serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))),
                None => None,
            };
            let reply = client
                .send(
                    "agent.complete",
                    json!({"workflow": workflow, "stage": stage, "result": result, "session": session, "task": task, "data": data}),
                )
                .await?;
            format_or_json(format, &reply.data, || println!("{:?}", reply.data))?;
        }
        AgentCommand::Release { session, agent } => {
            client.send("agent.release", json!({"session": session, "agent": agent})).await?;
            println!("Agent released");
        }
    }
    Ok(())
}
