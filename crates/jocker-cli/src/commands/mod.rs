//! CLI command definitions and dispatch.

pub mod create;
pub mod exec;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jocker_common::config::JockerConfig;
use jocker_common::error::JockerError;
use jocker_core::engine::Jocker;

/// jocker — per-user overlay containers with a gated exec.
#[derive(Parser, Debug)]
#[command(name = jocker_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the JSON configuration file.
    #[arg(
        long,
        global = true,
        env = "JOCKER_CONFIG",
        default_value = jocker_common::constants::DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Privilege-dropping helper to use instead of the configured one.
    #[arg(long, global = true)]
    pub helper: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision the overlay root of a user directory.
    Create(create::CreateArgs),
    /// Validate and run a command inside an existing root.
    Exec(exec::ExecArgs),
    /// Provision the root, then validate and run a command inside it.
    Run(run::RunArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if configuration loading or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let engine = engine(&cli)?;
    match cli.command {
        Command::Create(args) => create::execute(&engine, args),
        Command::Exec(args) => exec::execute(&engine, args),
        Command::Run(args) => run::execute(&engine, args),
    }
}

/// Exit code for errors where the gate refused the entry point.
///
/// Other failures keep the default error exit.
pub fn rejection_exit_code(err: &anyhow::Error) -> Option<i32> {
    err.downcast_ref::<JockerError>()
        .filter(|e| e.is_validation())
        .map(|_| jocker_common::constants::REJECTED_EXIT_CODE)
}

fn engine(cli: &Cli) -> anyhow::Result<Jocker> {
    let mut config = JockerConfig::load(&cli.config)?;
    if let Some(helper) = &cli.helper {
        config.helper = Some(helper.clone());
    }
    tracing::debug!(config = ?config, "configuration loaded");
    Ok(Jocker::new(config)?)
}
