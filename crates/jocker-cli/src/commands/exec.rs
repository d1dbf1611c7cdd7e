//! `jocker exec` — Run a validated command inside a user's root.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Args;
use jocker_core::engine::{CommandDescriptor, Jocker};
use jocker_core::env::Environment;

/// Arguments for the `exec` command.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Home directory of the user; its owner is the identity used.
    pub home: PathBuf,

    /// Command path relative to the home (e.g. `/init`).
    pub command: PathBuf,

    /// Extra environment variable, `KEY=VALUE`. May be repeated.
    #[arg(short = 'e', long = "env", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Arguments passed to the command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}

impl ExecArgs {
    /// Builds the command descriptor over the inherited environment.
    #[must_use]
    pub fn descriptor(self) -> CommandDescriptor {
        let mut env = Environment::inherit();
        env.extend(self.env);
        CommandDescriptor::new(self.home, self.command)
            .args(self.args)
            .env(env)
    }
}

/// Executes the `exec` command.
///
/// Exits the process with the helper's exit code.
///
/// # Errors
///
/// Returns an error if validation fails or the helper cannot be launched.
pub fn execute(engine: &Jocker, args: ExecArgs) -> anyhow::Result<()> {
    let outcome = engine.exec(&args.descriptor())?;
    tracing::debug!(%outcome, "command finished");
    std::process::exit(outcome.code());
}

/// Parses a `KEY=VALUE` pair.
pub fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::ffi::OsStr;

    use clap::Parser;

    use super::*;
    use crate::commands::{Cli, Command};

    #[test]
    fn env_pair_splits_on_first_equals() {
        assert_eq!(
            parse_env_pair("OPTS=a=b").unwrap(),
            ("OPTS".to_string(), "a=b".to_string())
        );
        assert!(parse_env_pair("NOVALUE").is_err());
        assert!(parse_env_pair("=x").is_err());
    }

    #[test]
    fn descriptor_layers_env_over_inherited() {
        let cli = Cli::try_parse_from([
            "jocker", "exec", "-e", "GREETING=hi", "/home/alice", "/init", "--", "-v",
        ])
        .unwrap();
        let Command::Exec(args) = cli.command else {
            unreachable!("parsed exec");
        };

        let cmd = args.descriptor();
        assert_eq!(cmd.home, PathBuf::from("/home/alice"));
        assert_eq!(cmd.command, PathBuf::from("/init"));
        assert_eq!(cmd.args, vec![OsString::from("-v")]);
        assert_eq!(cmd.env.get("GREETING"), Some(OsStr::new("hi")));
        assert!(cmd.env.materialize().len() >= std::env::vars_os().count());
    }
}
