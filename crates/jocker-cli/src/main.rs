//! # jocker
//!
//! Provisions per-user overlay roots and runs entry points inside them as
//! the home's owner, after checking the entry point's ownership and mode.

mod commands;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = commands::execute(cli) {
        if let Some(code) = commands::rejection_exit_code(&err) {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{}: {err}", jocker_common::constants::BIN_NAME);
            }
            std::process::exit(code);
        }
        return Err(err);
    }
    Ok(())
}
