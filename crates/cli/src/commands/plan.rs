// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj plan` - plan document association (`plan.*`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct PlanArgs {
    #[command(subcommand)]
    pub command: PlanCommand,
}

#[derive(Subcommand)]
pub enum PlanCommand {
    /// Record the plan document path for a session
    SetPath { session: String, path: String },
}

pub async fn run(args: PlanArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        PlanCommand::SetPath { session, path } => {
            let result = client.send("plan.setPath", json!({"session": session, "path": path})).await?;
            format_or_json(format, &result.data, || println!("Plan path recorded"))?;
        }
    }
    Ok(())
}
