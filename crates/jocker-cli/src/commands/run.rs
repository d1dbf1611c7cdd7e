//! `jocker run` — Provision a user's root, then run a command inside it.

use clap::Args;
use jocker_core::engine::Jocker;

use super::exec::ExecArgs;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Home to provision and the command to run in it.
    #[command(flatten)]
    pub exec: ExecArgs,
}

/// Executes the `run` command.
///
/// Exits the process with the helper's exit code.
///
/// # Errors
///
/// Returns an error if provisioning or validation fails, or the helper
/// cannot be launched.
pub fn execute(engine: &Jocker, args: RunArgs) -> anyhow::Result<()> {
    let outcome = engine.run(&args.exec.descriptor())?;
    tracing::debug!(%outcome, "command finished");
    std::process::exit(outcome.code());
}
