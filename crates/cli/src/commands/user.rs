// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj user` - questions asked of the human during a workflow, and their
//! resolution (`user.*`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Attach a question to a task, awaiting a human decision
    Ask {
        task: String,
        #[arg(long)]
        agent: Option<String>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long, value_delimiter = ',')]
        options: Vec<String>,
    },
    /// Resolve a pending decision
    Respond {
        decision: String,
        #[arg(long)]
        chosen: Option<usize>,
        #[arg(long, value_delimiter = ',')]
        choices: Vec<usize>,
        #[arg(long)]
        message: Option<String>,
    },
}

pub async fn run(args: UserArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        UserCommand::Ask { task, agent, context, options } => {
            let result =
                client.send("user.ask", json!({"task": task, "agent": agent, "context": context, "options": options})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        UserCommand::Respond { decision, chosen, choices, message } => {
            client
                .send("user.respond", json!({"decision": decision, "chosen": chosen, "choices": choices, "message": message}))
                .await?;
            println!("Decision {decision} resolved");
        }
    }
    Ok(())
}
