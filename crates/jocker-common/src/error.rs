//! Unified error taxonomy for the jocker workspace.
//!
//! Validation failures, provisioning failures and spawn failures share one
//! enum so callers pattern-match on the kind instead of comparing messages.
//! Each variant carries the offending path(s) as structured fields.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum JockerError {
    /// The home directory or the command file does not exist.
    #[error("{} not found", path.display())]
    NotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// The command path climbs out of its home through a `..` component.
    #[error("{} escapes {}", command.display(), home.display())]
    OutsideHome {
        /// Home directory the command must stay under.
        home: PathBuf,
        /// Command path, relative to the home.
        command: PathBuf,
    },

    /// The command path exists but is not a regular file.
    #[error("{} is not a file", path.display())]
    NotAFile {
        /// Full path of the command (home joined with command).
        path: PathBuf,
    },

    /// The command file is not owned by the same uid and gid as its home.
    #[error("{} uid & gid don't match with {}", home.display(), command.display())]
    IdentityMismatch {
        /// Home directory whose identity was expected.
        home: PathBuf,
        /// Command path, relative to the home.
        command: PathBuf,
    },

    /// None of the owner, group or other execute bits are set.
    #[error("{} is not executable", command.display())]
    NotExecutable {
        /// Command path, relative to the home.
        command: PathBuf,
    },

    /// A metadata lookup failed for a reason other than absence.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Creating a directory or performing a mount failed.
    #[error("provisioning failed at {}: {source}", path.display())]
    Provision {
        /// Directory or mount point that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The privilege-dropping helper could not be launched.
    #[error("failed to spawn helper {}: {source}", helper.display())]
    Spawn {
        /// Helper executable that was invoked.
        helper: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl JockerError {
    /// Returns `true` for the gate rejections produced by command validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::OutsideHome { .. }
                | Self::NotAFile { .. }
                | Self::IdentityMismatch { .. }
                | Self::NotExecutable { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, JockerError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn identity_mismatch_message_names_home_and_command() {
        let err = JockerError::IdentityMismatch {
            home: "/home/bob".into(),
            command: "/init".into(),
        };
        assert_eq!(err.to_string(), "/home/bob uid & gid don't match with /init");
    }

    #[test]
    fn outside_home_message_names_both_paths() {
        let err = JockerError::OutsideHome {
            home: "/home/alice".into(),
            command: "/../outside".into(),
        };
        assert_eq!(err.to_string(), "/../outside escapes /home/alice");
    }

    #[test]
    fn not_found_message_names_path() {
        let err = JockerError::NotFound {
            path: "/home/init".into(),
        };
        assert_eq!(err.to_string(), "/home/init not found");
    }

    #[test]
    fn io_error_keeps_native_source() {
        let err = JockerError::Io {
            path: "/home".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let source = err.source().and_then(|s| s.downcast_ref::<std::io::Error>());
        assert_eq!(
            source.map(std::io::Error::kind),
            Some(std::io::ErrorKind::PermissionDenied)
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn gate_rejections_are_validation_errors() {
        assert!(JockerError::NotExecutable { command: "/init".into() }.is_validation());
        assert!(JockerError::NotAFile { path: "/home/init".into() }.is_validation());
        assert!(
            JockerError::OutsideHome {
                home: "/home".into(),
                command: "/../etc/shadow".into(),
            }
            .is_validation()
        );
    }
}
