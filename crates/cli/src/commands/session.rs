// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj session` - plan session lifecycle (`session.*`).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Create a new plan session
    Create,
    /// Show a session's full state
    Get { session: String },
    /// Show a session's status summary
    Status { session: String },
    /// Approve a pending session, allowing task workflows to start
    Approve { session: String },
    /// Cancel a session
    Cancel { session: String },
    /// Mark a session complete
    Complete { session: String },
    /// Pause coordinator evaluations for a session
    Pause {
        session: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Resume coordinator evaluations for a session
    Resume { session: String },
}

pub async fn run(args: SessionArgs, format: OutputFormat) -> Result<(), ExitError> {
    let mut client = DaemonClient::connect_or_start().await?;
    match args.command {
        SessionCommand::Create => {
            let result = client.send("session.create", json!({})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        SessionCommand::Get { session } => {
            let result = client.send("session.get", json!({"session": session})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        SessionCommand::Status { session } => {
            let result = client.send("session.status", json!({"session": session})).await?;
            format_or_json(format, &result.data, || println!("{:?}", result.data))?;
        }
        SessionCommand::Approve { session } => {
            let result = client.send("session.approve", json!({"session": session})).await?;
            format_or_json(format, &result.data, || println!("Session {session} approved"))?;
        }
        SessionCommand::Cancel { session } => {
            client.send("session.cancel", json!({"session": &session})).await?;
            println!("Session {session} cancelled");
        }
        SessionCommand::Complete { session } => {
            client.send("session.complete", json!({"session": &session})).await?;
            println!("Session {session} completed");
        }
        SessionCommand::Pause { session, reason } => {
            client.send("session.pause", json!({"session": &session, "reason": reason})).await?;
            println!("Session {session} paused");
        }
        SessionCommand::Resume { session } => {
            client.send("session.resume", json!({"session": &session})).await?;
            println!("Session {session} resumed");
        }
    }
    Ok(())
}
