//! # chroot-spawn
//!
//! `chroot-spawn <uid> <gid> <command> [args...]`
//!
//! Makes the working directory the new root, drops to `uid`/`gid` and
//! replaces itself with `command`. The environment is passed through as is.
//! Must be started with enough privilege to `chroot` and change identity.

mod privilege;

use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

use anyhow::Context;
use clap::Parser;
use jocker_common::types::IdentityBinding;

/// Arguments, in the order the jocker spawn bridge passes them.
#[derive(Parser, Debug)]
#[command(
    name = jocker_common::constants::HELPER_BIN_NAME,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// User id to run the command as.
    uid: u32,
    /// Group id to run the command as.
    gid: u32,
    /// Command path inside the new root.
    command: PathBuf,
    /// Arguments for the command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<OsString>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let identity = IdentityBinding::new(args.uid, args.gid);

    let root = std::env::current_dir().context("cannot read working directory")?;
    privilege::enter_root(&root)?;
    privilege::drop_to(identity)?;

    tracing::debug!(%identity, command = %args.command.display(), "exec");
    let err = Command::new(&args.command).args(&args.args).exec();
    Err(err).with_context(|| format!("cannot exec {}", args.command.display()))
}
