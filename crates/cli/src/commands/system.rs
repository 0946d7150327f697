// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj system` - low-level health checks against the command socket
//! (`system.*`). `oj daemon status` is the user-facing version of this;
//! `ping`/`raw-status` stay around for scripting against the protocol
//! directly.

use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Subcommand)]
pub enum SystemCommand {
    /// Check that the daemon is listening
    Ping,
    /// Protocol version and uptime, straight off the wire
    Status,
}

pub async fn run(args: SystemArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect().await?;
    match args.command {
        SystemCommand::Ping => {
            client.ping().await?;
            println!("pong");
        }
        SystemCommand::Status => {
            let (version, uptime) = client.status().await?;
            let obj = serde_json::json!({"protocolVersion": version, "uptimeSecs": uptime});
            format_or_json(format, &obj, || println!("ojd {version}, up {uptime}s"))?;
        }
    }
    Ok(())
}
