//! Configuration model for provisioning and spawning.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{JockerError, Result};

/// Root configuration for the jocker runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JockerConfig {
    /// Explicit path to the privilege-dropping helper.
    ///
    /// When unset the helper is looked up next to the current executable,
    /// then on `PATH`.
    pub helper: Option<PathBuf>,
    /// Host directory bind-mounted at `<upperdir>/dev`.
    pub dev_source: PathBuf,
    /// Host directory bind-mounted at `<upperdir>/proc`.
    pub proc_source: PathBuf,
    /// Mode used when creating overlay work directories.
    pub workdir_mode: u32,
}

impl Default for JockerConfig {
    fn default() -> Self {
        Self {
            helper: None,
            dev_source: PathBuf::from(constants::HOST_DEV_DIR),
            proc_source: PathBuf::from(constants::HOST_PROC_DIR),
            workdir_mode: constants::WORKDIR_MODE,
        }
    }
}

impl JockerConfig {
    /// Loads configuration from a JSON file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds an out-of-range value.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(JockerError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot constrain.
    ///
    /// # Errors
    ///
    /// Returns an error if `workdir_mode` has bits outside `0o7777`.
    pub fn validate(&self) -> Result<()> {
        if self.workdir_mode & !0o7777 != 0 {
            return Err(JockerError::Config {
                message: format!("workdir_mode {:#o} is not a permission mode", self.workdir_mode),
            });
        }
        Ok(())
    }
}
