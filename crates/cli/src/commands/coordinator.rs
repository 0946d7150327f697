// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj coordinator` - manual evaluation trigger and history (`coordinator.*`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct CoordinatorArgs {
    #[command(subcommand)]
    pub command: CoordinatorCommand,
}

#[derive(Subcommand)]
pub enum CoordinatorCommand {
    /// Queue a manual coordinator evaluation for a session
    Evaluate {
        session: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Show a session's coordinator evaluation history
    History { session: String },
}

pub async fn run(args: CoordinatorArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        CoordinatorCommand::Evaluate { session, reason } => {
            client.send("coordinator.evaluate", json!({"session": session, "reason": reason})).await?;
            println!("Evaluation queued");
        }
        CoordinatorCommand::History { session } => {
            let result = client.send("coordinator.history", json!({"session": session})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
    }
    Ok(())
}
