//! `jocker create` — Provision a user's overlay root.

use std::path::PathBuf;

use clap::Args;
use jocker_core::engine::Jocker;

/// Arguments for the `create` command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// User directory that becomes the overlay's upper layer and mount point.
    pub upper_dir: PathBuf,
}

/// Executes the `create` command.
///
/// # Errors
///
/// Returns an error if the work directory or any mount cannot be set up.
pub fn execute(engine: &Jocker, args: CreateArgs) -> anyhow::Result<()> {
    let spec = engine.create(&args.upper_dir)?;
    tracing::info!(
        upper = %spec.upper_dir.display(),
        work = %spec.work_dir.display(),
        "root ready"
    );
    Ok(())
}
