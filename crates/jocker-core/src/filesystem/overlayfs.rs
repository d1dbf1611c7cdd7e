//! `OverlayFS` root for a single user.
//!
//! The host root is the read-only lower layer and the user's directory is
//! the writable upper layer. The work directory lives outside the upper
//! layer, at `<users root>/.workdirs/<user>`.

use std::path::{Path, PathBuf};

use jocker_common::constants::{OVERLAY_LOWER_DIR, WORKDIRS_DIR};
use jocker_common::error::{JockerError, Result};

use super::mount::{MountFlags, Mounter, MountRequest};

/// Layer directories of an `OverlayFS` mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySpec {
    /// Read-only lower layer.
    pub lower_dir: PathBuf,
    /// Writable upper layer, also the mount point.
    pub upper_dir: PathBuf,
    /// Work directory required by `OverlayFS`.
    pub work_dir: PathBuf,
}

impl OverlaySpec {
    /// Derives the overlay layout for a user's upper directory.
    ///
    /// The user is the last component of `upper_dir` and the users root is
    /// its parent.
    ///
    /// # Errors
    ///
    /// Returns an error if `upper_dir` has no final component or parent, if
    /// the derived work directory would fall inside `upper_dir`, or if a path
    /// contains a character that cannot be expressed in overlay options.
    pub fn for_upper_dir(upper_dir: &Path) -> Result<Self> {
        let (Some(user), Some(users_root)) = (upper_dir.file_name(), upper_dir.parent()) else {
            return Err(JockerError::Config {
                message: format!("{} does not name a user directory", upper_dir.display()),
            });
        };

        let spec = Self {
            lower_dir: PathBuf::from(OVERLAY_LOWER_DIR),
            upper_dir: upper_dir.to_path_buf(),
            work_dir: users_root.join(WORKDIRS_DIR).join(user),
        };

        if spec.work_dir.starts_with(&spec.upper_dir) {
            return Err(JockerError::Config {
                message: format!(
                    "work directory {} would be inside {}",
                    spec.work_dir.display(),
                    spec.upper_dir.display()
                ),
            });
        }
        for dir in [&spec.upper_dir, &spec.work_dir] {
            let text = dir.to_string_lossy();
            if text.contains([',', ':']) {
                return Err(JockerError::Config {
                    message: format!("overlay path {text} contains ',' or ':'"),
                });
            }
        }
        Ok(spec)
    }

    /// Renders the `lowerdir=..,upperdir=..,workdir=..` mount data.
    #[must_use]
    pub fn mount_data(&self) -> String {
        format!(
            "lowerdir={},upperdir={},workdir={}",
            self.lower_dir.display(),
            self.upper_dir.display(),
            self.work_dir.display()
        )
    }

    /// Builds the overlay mount request, mounted at the upper directory.
    ///
    /// Set-uid bits are ignored inside the overlay.
    #[must_use]
    pub fn mount_request(&self) -> MountRequest {
        MountRequest {
            target: self.upper_dir.clone(),
            fstype: Some("overlay"),
            flags: MountFlags::NOSUID,
            source: Some(PathBuf::from("overlay")),
            data: Some(self.mount_data()),
        }
    }
}

/// Mounts the overlay described by `spec`.
///
/// # Errors
///
/// Returns [`JockerError::Provision`] if the mount fails.
pub fn mount_overlay(mounter: &dyn Mounter, spec: &OverlaySpec) -> Result<()> {
    mounter
        .mount(&spec.mount_request())
        .map_err(|e| JockerError::Provision {
            path: spec.upper_dir.clone(),
            source: e,
        })?;
    tracing::info!(upper = %spec.upper_dir.display(), work = %spec.work_dir.display(), "overlayfs mounted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_dir_is_derived_from_user_name() {
        let spec = OverlaySpec::for_upper_dir(Path::new("/users/alice")).unwrap();
        assert_eq!(spec.lower_dir, PathBuf::from("/"));
        assert_eq!(spec.upper_dir, PathBuf::from("/users/alice"));
        assert_eq!(spec.work_dir, PathBuf::from("/users/.workdirs/alice"));
    }

    #[test]
    fn mount_data_lists_all_layers() {
        let spec = OverlaySpec::for_upper_dir(Path::new("/users/alice")).unwrap();
        assert_eq!(
            spec.mount_data(),
            "lowerdir=/,upperdir=/users/alice,workdir=/users/.workdirs/alice"
        );
    }

    #[test]
    fn overlay_request_is_nosuid_at_upper_dir() {
        let request = OverlaySpec::for_upper_dir(Path::new("/users/alice"))
            .unwrap()
            .mount_request();
        assert_eq!(request.target, PathBuf::from("/users/alice"));
        assert_eq!(request.fstype, Some("overlay"));
        assert_eq!(request.flags, MountFlags::NOSUID);
    }

    #[test]
    fn root_is_not_a_user_directory() {
        let err = OverlaySpec::for_upper_dir(Path::new("/")).unwrap_err();
        assert!(matches!(err, JockerError::Config { .. }));
    }

    #[test]
    fn work_dir_inside_upper_dir_is_rejected() {
        let err = OverlaySpec::for_upper_dir(Path::new("/users/.workdirs")).unwrap_err();
        assert!(err.to_string().contains("would be inside"));
    }

    #[test]
    fn option_separators_are_rejected() {
        assert!(OverlaySpec::for_upper_dir(Path::new("/users/a,b")).is_err());
        assert!(OverlaySpec::for_upper_dir(Path::new("/us:ers/alice")).is_err());
    }
}
