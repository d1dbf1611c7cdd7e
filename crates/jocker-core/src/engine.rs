//! The `create`, `exec` and `run` workflows.
//!
//! `run` = `create` then `exec`; `exec` = validate then spawn. Any failure
//! short-circuits and is returned unchanged.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use jocker_common::config::JockerConfig;
use jocker_common::error::Result;
use jocker_common::types::ExitOutcome;

use crate::env::Environment;
use crate::filesystem::mount::{HostMounter, Mounter};
use crate::filesystem::overlayfs::OverlaySpec;
use crate::filesystem::provision::provision;
use crate::spawn::{HelperSpawner, SpawnRequest, Spawner};
use crate::validate::{HostMetadata, MetadataSource, validate};

/// A command to run inside a user's home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// The user's home, also the container root.
    pub home: PathBuf,
    /// Command path relative to the home (e.g. `/init`).
    pub command: PathBuf,
    /// Arguments passed to the command.
    pub args: Vec<OsString>,
    /// Environment layered over the ambient one.
    pub env: Environment,
}

impl CommandDescriptor {
    /// Describes `command` under `home` with no arguments and the inherited
    /// environment.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>, command: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            command: command.into(),
            args: Vec::new(),
            env: Environment::inherit(),
        }
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replaces the environment.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }
}

/// Coordinates provisioning, validation and spawning.
pub struct Jocker {
    config: JockerConfig,
    metadata: Box<dyn MetadataSource>,
    mounter: Box<dyn Mounter>,
    spawner: Box<dyn Spawner>,
}

impl Jocker {
    /// Creates an engine backed by the host filesystem, kernel mounts and
    /// the helper named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: JockerConfig) -> Result<Self> {
        config.validate()?;
        let spawner = HelperSpawner::from_config(&config);
        Ok(Self::with_parts(
            config,
            Box::new(HostMetadata),
            Box::new(HostMounter),
            Box::new(spawner),
        ))
    }

    /// Creates an engine from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        config: JockerConfig,
        metadata: Box<dyn MetadataSource>,
        mounter: Box<dyn Mounter>,
        spawner: Box<dyn Spawner>,
    ) -> Self {
        Self {
            config,
            metadata,
            mounter,
            spawner,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &JockerConfig {
        &self.config
    }

    /// Provisions the overlay root at `upper_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is unusable or any directory or mount
    /// step fails.
    pub fn create(&self, upper_dir: &Path) -> Result<OverlaySpec> {
        tracing::info!(upper = %upper_dir.display(), "creating container root");
        provision(self.mounter.as_ref(), &self.config, upper_dir)
    }

    /// Validates the command and runs it through the helper as the home's
    /// owner. Blocks until the helper exits.
    ///
    /// # Errors
    ///
    /// Returns the validation error, or a spawn error if the helper cannot
    /// be launched. The helper's own exit status is returned as `Ok`.
    pub fn exec(&self, command: &CommandDescriptor) -> Result<ExitOutcome> {
        let identity = validate(self.metadata.as_ref(), &command.home, &command.command)?;

        let request = SpawnRequest {
            identity,
            command: command.command.clone(),
            args: command.args.clone(),
            cwd: command.home.clone(),
            env: command.env.materialize(),
        };
        self.spawner.spawn(&request)
    }

    /// Provisions the home as a container root, then executes the command.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Jocker::create`] or [`Jocker::exec`].
    pub fn run(&self, command: &CommandDescriptor) -> Result<ExitOutcome> {
        let _ = self.create(&command.home)?;
        self.exec(command)
    }
}
