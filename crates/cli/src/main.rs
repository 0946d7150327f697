// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj` - the command-line front end for the Odd Jobs control plane. Talks
//! to `ojd` over its command socket, starting it on demand when a
//! subcommand needs it.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};

use commands::{agent, coordinator, daemon, plan, pool, roles_config, session, system, task, unity, user, workflow};
use exit_error::ExitError;
use output::OutputFormat;

/// Protocol version this CLI build speaks: crate version plus git commit.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(name = "oj", version = VERSION, about = "Odd Jobs control-plane CLI")]
struct Cli {
    /// Output format for command results
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan session lifecycle
    Session(session::SessionArgs),
    /// Plan document association
    Plan(plan::PlanArgs),
    /// Task CRUD, dependencies, and workflow start
    Task(task::TaskArgs),
    /// In-flight workflow inspection and cancellation
    Workflow(workflow::WorkflowArgs),
    /// Agent pool inspection and resize
    Pool(pool::PoolArgs),
    /// Agent completion callback and release
    Agent(agent::AgentArgs),
    /// Coordinator manual evaluation and history
    Coordinator(coordinator::CoordinatorArgs),
    /// Human-in-the-loop questions and decisions
    User(user::UserArgs),
    /// Role registry introspection
    Roles(roles_config::RolesArgs),
    /// Effective daemon configuration
    Config(roles_config::ConfigArgs),
    /// Low-level protocol health checks
    System(system::SystemArgs),
    /// Unity error reporting and raw passthrough commands
    Unity(unity::UnityArgs),
    /// Daemon process lifecycle: start/stop/status/logs
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.output;

    let result = match cli.command {
        Commands::Session(args) => session::run(args, format).await,
        Commands::Plan(args) => plan::run(args, format).await,
        Commands::Task(args) => task::run(args, format).await,
        Commands::Workflow(args) => workflow::run(args, format).await,
        Commands::Pool(args) => pool::run(args, format).await,
        Commands::Agent(args) => agent::run(args, format).await,
        Commands::Coordinator(args) => coordinator::run(args, format).await,
        Commands::User(args) => user::run(args, format).await,
        Commands::Roles(args) => roles_config::run_roles(args, format).await,
        Commands::Config(args) => roles_config::run_config(args, format).await,
        Commands::System(args) => system::run(args, format).await,
        Commands::Unity(args) => unity::run(args, format).await,
        Commands::Daemon(args) => daemon::run(args, format).await,
    };

    if let Err(err) = result {
        report_and_exit(err);
    }
}

fn report_and_exit(err: ExitError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(err.code);
}
