//! Ownership and permission gate for the entry-point executable.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 0. the command path stays under the home (no `..`),
//! 1. the home directory exists,
//! 2. the command exists under the home,
//! 3. the command is a regular file,
//! 4. the command's uid and gid equal the home's,
//! 5. at least one execute bit is set.
//!
//! On success the home's identity is returned. A command can therefore
//! never run with an identity its containing home does not hold.

use std::io;
use std::path::{Component, Path, PathBuf};

use jocker_common::constants::EXECUTE_BITS;
use jocker_common::error::{JockerError, Result};
use jocker_common::types::IdentityBinding;

/// The subset of `stat(2)` the gate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Whether the path is a regular file.
    pub is_file: bool,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Permission bits and file type, as reported by `st_mode`.
    pub mode: u32,
}

/// Source of file metadata.
pub trait MetadataSource: Send + Sync {
    /// Returns metadata for `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns the native I/O error; `NotFound` marks a missing path.
    fn stat(&self, path: &Path) -> io::Result<FileMeta>;
}

/// Reads metadata from the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMetadata;

impl MetadataSource for HostMetadata {
    fn stat(&self, path: &Path) -> io::Result<FileMeta> {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata(path)?;
        Ok(FileMeta {
            is_file: meta.is_file(),
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode(),
        })
    }
}

/// Joins a command path under its home.
///
/// Command paths are written as if the home were `/` (e.g. `/init`), so the
/// root component is dropped instead of replacing the home.
#[must_use]
pub fn command_path(home: &Path, command: &Path) -> PathBuf {
    let relative: PathBuf = command
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    home.join(relative)
}

/// Validates `command` under `home` and returns the identity to run it as.
///
/// # Errors
///
/// - [`JockerError::OutsideHome`] if `command` has a `..` component.
/// - [`JockerError::NotFound`] if the home or the command is missing.
/// - [`JockerError::Io`] for any other metadata failure.
/// - [`JockerError::NotAFile`] if the command is not a regular file.
/// - [`JockerError::IdentityMismatch`] if uid or gid differ from the home's.
/// - [`JockerError::NotExecutable`] if no execute bit is set.
pub fn validate(
    source: &dyn MetadataSource,
    home: &Path,
    command: &Path,
) -> Result<IdentityBinding> {
    // The helper resolves `command` inside the chroot, so the file checked
    // here must be the one it will exec.
    if command.components().any(|c| matches!(c, Component::ParentDir)) {
        tracing::warn!(home = %home.display(), command = %command.display(), "command escapes its home");
        return Err(JockerError::OutsideHome {
            home: home.to_path_buf(),
            command: command.to_path_buf(),
        });
    }

    let home_meta = stat(source, home)?;

    let full_path = command_path(home, command);
    let command_meta = stat(source, &full_path)?;

    if !command_meta.is_file {
        tracing::warn!(path = %full_path.display(), "command is not a regular file");
        return Err(JockerError::NotAFile { path: full_path });
    }

    if command_meta.uid != home_meta.uid || command_meta.gid != home_meta.gid {
        tracing::warn!(
            home = %home.display(),
            command = %command.display(),
            home_uid = home_meta.uid,
            home_gid = home_meta.gid,
            command_uid = command_meta.uid,
            command_gid = command_meta.gid,
            "command identity does not match its home"
        );
        return Err(JockerError::IdentityMismatch {
            home: home.to_path_buf(),
            command: command.to_path_buf(),
        });
    }

    if command_meta.mode & EXECUTE_BITS == 0 {
        tracing::warn!(
            command = %command.display(),
            mode = format_args!("{:o}", command_meta.mode),
            "command is not executable"
        );
        return Err(JockerError::NotExecutable {
            command: command.to_path_buf(),
        });
    }

    let identity = IdentityBinding::new(home_meta.uid, home_meta.gid);
    tracing::debug!(home = %home.display(), command = %command.display(), %identity, "command validated");
    Ok(identity)
}

fn stat(source: &dyn MetadataSource, path: &Path) -> Result<FileMeta> {
    source.stat(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            JockerError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            JockerError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}
