// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj pool` - agent pool inspection and resize (`pool.*`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct PoolArgs {
    #[command(subcommand)]
    pub command: PoolCommand,
}

#[derive(Subcommand)]
pub enum PoolCommand {
    /// Show available/allocated/busy/resting counts
    Status,
    /// List every agent pool entry
    List,
    /// Resize the pool to a new roster
    Resize {
        #[arg(long, value_delimiter = ',')]
        roster: Vec<String>,
        new_size: usize,
    },
}

pub async fn run(args: PoolArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        PoolCommand::Status => {
            let result = client.send("pool.status", json!({})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        PoolCommand::List => {
            let result = client.send("pool.list", json!({})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        PoolCommand::Resize { roster, new_size } => {
            let result = client.send("pool.resize", json!({"roster": roster, "newSize": new_size})).await?;
            format_or_json(format, &result.data, || println!("Pool resized"))?;
        }
    }
    Ok(())
}
