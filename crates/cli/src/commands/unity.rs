// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj unity` - the one non-passthrough `unity.*` action, plus a raw
//! passthrough escape hatch for `unity`/`process`/`folders`/`deps`/`prompts`
//! categories this core doesn't model a business surface for (see
//! `oj-daemon`'s own `listener::dispatch::passthrough_cmd`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct UnityArgs {
    #[command(subcommand)]
    pub command: UnityCommand,
}

#[derive(Subcommand)]
pub enum UnityCommand {
    /// Report an error, waking the shared error-resolution coordinator session
    Error {
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        data: Option<String>,
    },
    /// Send a raw `<category>.<action>` command, e.g. for folders/deps/prompts
    Raw {
        cmd: String,
        #[arg(long, default_value = "{}")]
        params: String,
    },
}

pub async fn run(args: UnityArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        UnityCommand::Error { context, data } => {
            let data: Option<serde_json::Value> = match data {
                Some(raw) => Some(serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))),
                None => None,
            };
            client.send("unity.error", json!({"context": context, "data": data})).await?;
            println!("Error reported");
        }
        UnityCommand::Raw { cmd, params } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| ExitError::new(1, format!("invalid --params json: {e}")))?;
            let result = client.send(&cmd, params).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
    }
    Ok(())
}
