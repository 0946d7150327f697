// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj roles` and `oj config` - read-only introspection of the running
//! daemon's role registry and effective configuration (`roles.*`/`config.*`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct RolesArgs {
    #[command(subcommand)]
    pub command: RolesCommand,
}

#[derive(Subcommand)]
pub enum RolesCommand {
    /// List the role ids the pool accepts in `allocate`
    List,
}

pub async fn run_roles(args: RolesArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        RolesCommand::List => {
            let result = client.send("roles.list", json!({})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
    }
    Ok(())
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the daemon's effective configuration
    Get,
}

pub async fn run_config(args: ConfigArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        ConfigCommand::Get => {
            let result = client.send("config.get", json!({})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
    }
    Ok(())
}
