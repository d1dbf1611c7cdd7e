//! Bridge to the external privilege-dropping helper.
//!
//! The helper is invoked as `<helper> <uid> <gid> <command> [args...]` with
//! the home as working directory and inherited stdio. This module only
//! shapes the arguments and relays how the helper terminated.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use jocker_common::config::JockerConfig;
use jocker_common::constants::HELPER_BIN_NAME;
use jocker_common::error::{JockerError, Result};
use jocker_common::types::{ExitOutcome, IdentityBinding};

/// A fully validated invocation of the helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Identity the helper drops to.
    pub identity: IdentityBinding,
    /// Command path as seen from inside the container root.
    pub command: PathBuf,
    /// Arguments passed to the command.
    pub args: Vec<OsString>,
    /// Working directory of the helper (the home).
    pub cwd: PathBuf,
    /// Complete environment of the helper.
    pub env: BTreeMap<OsString, OsString>,
}

impl SpawnRequest {
    /// Returns the helper's argv: `[uid, gid, command, ...args]`.
    #[must_use]
    pub fn helper_argv(&self) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 3);
        argv.push(OsString::from(self.identity.uid.to_string()));
        argv.push(OsString::from(self.identity.gid.to_string()));
        argv.push(self.command.clone().into_os_string());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Launches the helper and waits for it to terminate.
pub trait Spawner: Send + Sync {
    /// Runs `request` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`JockerError::Spawn`] if the helper cannot be launched.
    fn spawn(&self, request: &SpawnRequest) -> Result<ExitOutcome>;
}

/// Runs the helper binary as a child process.
#[derive(Debug, Clone, Default)]
pub struct HelperSpawner {
    helper: Option<PathBuf>,
}

impl HelperSpawner {
    /// Uses the helper at `helper`.
    #[must_use]
    pub fn new(helper: impl Into<PathBuf>) -> Self {
        Self {
            helper: Some(helper.into()),
        }
    }

    /// Uses the configured helper, or locates one at spawn time.
    #[must_use]
    pub fn from_config(config: &JockerConfig) -> Self {
        Self {
            helper: config.helper.clone(),
        }
    }

    /// Path of the helper binary.
    ///
    /// # Errors
    ///
    /// Returns [`JockerError::Config`] if no helper is configured and none
    /// can be located.
    pub fn helper(&self) -> Result<PathBuf> {
        self.helper.clone().map_or_else(locate_helper, Ok)
    }
}

impl Spawner for HelperSpawner {
    fn spawn(&self, request: &SpawnRequest) -> Result<ExitOutcome> {
        use std::os::unix::process::ExitStatusExt;

        let helper = self.helper()?;
        tracing::info!(
            helper = %helper.display(),
            identity = %request.identity,
            command = %request.command.display(),
            cwd = %request.cwd.display(),
            "spawning helper"
        );

        let status = Command::new(&helper)
            .args(request.helper_argv())
            .current_dir(&request.cwd)
            .env_clear()
            .envs(&request.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| JockerError::Spawn {
                helper: helper.clone(),
                source: e,
            })?;

        let outcome = status.code().map_or_else(
            || ExitOutcome::Signaled(status.signal().unwrap_or_default()),
            ExitOutcome::Exited,
        );
        tracing::info!(helper = %helper.display(), %outcome, "helper finished");
        Ok(outcome)
    }
}

/// Finds the helper next to the current executable, then on `PATH`.
///
/// # Errors
///
/// Returns [`JockerError::Config`] if neither location has the helper.
pub fn locate_helper() -> Result<PathBuf> {
    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(HELPER_BIN_NAME)));
    if let Some(path) = sibling.filter(|p| p.is_file()) {
        return Ok(path);
    }

    which::which(HELPER_BIN_NAME).map_err(|e| JockerError::Config {
        message: format!("{HELPER_BIN_NAME} not found: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use super::*;

    fn request(cwd: &Path, args: &[&str]) -> SpawnRequest {
        SpawnRequest {
            identity: IdentityBinding::new(1000, 100),
            command: PathBuf::from("/init"),
            args: args.iter().map(OsString::from).collect(),
            cwd: cwd.to_path_buf(),
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn helper_argv_prepends_identity_and_command() {
        let req = request(Path::new("/home/alice"), &["-v", "x"]);
        assert_eq!(req.helper_argv(), vec!["1000", "100", "/init", "-v", "x"]);
    }

    #[test]
    fn helper_argv_without_args() {
        let req = request(Path::new("/home/alice"), &[]);
        assert_eq!(req.helper_argv(), vec!["1000", "100", "/init"]);
    }

    #[test]
    fn configured_helper_wins() {
        let config = JockerConfig {
            helper: Some("/opt/helper".into()),
            ..JockerConfig::default()
        };
        let spawner = HelperSpawner::from_config(&config);
        assert_eq!(spawner.helper().unwrap(), PathBuf::from("/opt/helper"));
    }

    #[test]
    fn missing_helper_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = HelperSpawner::new(dir.path().join("absent"));

        let err = spawner.spawn(&request(dir.path(), &[])).unwrap_err();
        assert!(matches!(err, JockerError::Spawn { .. }));
    }

    // Scripts are written before any of them runs so no writable descriptor
    // is open while another one is exec'd.
    #[test]
    fn helper_receives_shaped_invocation_and_exit_is_relayed() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("record");
        let recorder = dir.path().join("recorder");
        let killer = dir.path().join("killer");
        std::fs::write(
            &recorder,
            "#!/bin/sh\necho \"$@\" > \"$RECORD\"\npwd >> \"$RECORD\"\necho \"$GREETING\" >> \"$RECORD\"\nexit 7\n",
        )
        .unwrap();
        std::fs::write(&killer, "#!/bin/sh\nkill -9 $$\n").unwrap();
        for script in [&recorder, &killer] {
            std::fs::set_permissions(script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let mut req = request(dir.path(), &["a", "b"]);
        let _ = req.env.insert("RECORD".into(), record.clone().into_os_string());
        let _ = req.env.insert("GREETING".into(), "hi".into());

        let outcome = HelperSpawner::new(&recorder).spawn(&req).unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(7));

        let recorded = std::fs::read_to_string(&record).unwrap();
        let cwd = dir.path().canonicalize().unwrap();
        assert_eq!(
            recorded,
            format!("1000 100 /init a b\n{}\nhi\n", cwd.display())
        );

        let outcome = HelperSpawner::new(&killer).spawn(&req).unwrap();
        assert_eq!(outcome, ExitOutcome::Signaled(9));
    }
}
