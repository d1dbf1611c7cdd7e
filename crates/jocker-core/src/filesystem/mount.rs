//! Mount requests and the host mount seam.
//!
//! Also issues the auxiliary mounts (`/dev`, `/proc`, `/tmp`) inside a
//! freshly mounted overlay root.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use jocker_common::config::JockerConfig;
use jocker_common::error::{JockerError, Result};

/// Platform-neutral subset of `mount(2)` flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountFlags {
    /// Ignore set-user-ID and set-group-ID bits on the mounted filesystem.
    pub nosuid: bool,
    /// Bind-mount an existing directory instead of mounting a filesystem.
    pub bind: bool,
}

impl MountFlags {
    /// `MS_NOSUID`.
    pub const NOSUID: Self = Self {
        nosuid: true,
        bind: false,
    };
    /// `MS_BIND`.
    pub const BIND: Self = Self {
        nosuid: false,
        bind: true,
    };
}

/// One mount to perform. Built and consumed within a single provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRequest {
    /// Mount point.
    pub target: PathBuf,
    /// Filesystem type, `None` for bind mounts.
    pub fstype: Option<&'static str>,
    /// Mount flags.
    pub flags: MountFlags,
    /// Source device or directory.
    pub source: Option<PathBuf>,
    /// Filesystem-specific option string.
    pub data: Option<String>,
}

impl MountRequest {
    /// Bind-mounts `source` at `target`.
    #[must_use]
    pub fn bind(source: &Path, target: PathBuf) -> Self {
        Self {
            target,
            fstype: None,
            flags: MountFlags::BIND,
            source: Some(source.to_path_buf()),
            data: None,
        }
    }

    /// Mounts a fresh tmpfs at `target`.
    #[must_use]
    pub fn tmpfs(target: PathBuf) -> Self {
        Self {
            target,
            fstype: Some("tmpfs"),
            flags: MountFlags::NOSUID,
            source: Some(PathBuf::from("tmpfs")),
            data: None,
        }
    }
}

/// Performs directory creation and mounts on behalf of the provisioner.
pub trait Mounter: Send + Sync {
    /// Creates `path` with `mode`, and any missing parents with default
    /// permissions. An existing path is success.
    ///
    /// # Errors
    ///
    /// Returns the native I/O error for any other failure.
    fn ensure_dir(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Creates the mount point if needed and performs the mount.
    ///
    /// # Errors
    ///
    /// Returns the native I/O error if the mount point cannot be created or
    /// the mount fails.
    fn mount(&self, request: &MountRequest) -> io::Result<()>;
}

/// Mounter backed by the host kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMounter;

impl Mounter for HostMounter {
    fn ensure_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::DirBuilderExt;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match std::fs::DirBuilder::new().mode(mode).create(path) {
            Err(e) if e.kind() != io::ErrorKind::AlreadyExists => Err(e),
            _ => Ok(()),
        }
    }

    #[cfg(target_os = "linux")]
    fn mount(&self, request: &MountRequest) -> io::Result<()> {
        use nix::mount::{MsFlags, mount};

        std::fs::create_dir_all(&request.target)?;

        let mut flags = MsFlags::empty();
        if request.flags.nosuid {
            flags |= MsFlags::MS_NOSUID;
        }
        if request.flags.bind {
            flags |= MsFlags::MS_BIND;
        }

        mount(
            request.source.as_deref(),
            &request.target,
            request.fstype,
            flags,
            request.data.as_deref(),
        )?;
        tracing::debug!(
            mount_point = %request.target.display(),
            fstype = request.fstype.unwrap_or("bind"),
            "mounted"
        );
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn mount(&self, _request: &MountRequest) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Linux required for native mounts",
        ))
    }
}

/// Returns the auxiliary mounts for an overlay root at `rootfs`.
#[must_use]
pub fn essential_mounts(config: &JockerConfig, rootfs: &Path) -> [MountRequest; 3] {
    [
        MountRequest::bind(&config.dev_source, rootfs.join("dev")),
        MountRequest::bind(&config.proc_source, rootfs.join("proc")),
        MountRequest::tmpfs(rootfs.join("tmp")),
    ]
}

/// Mounts `/dev`, `/proc` and `/tmp` inside the container root concurrently.
///
/// Waits for all three and returns the first failure to arrive. Mounts that
/// succeeded are left in place; a retry remounts over them.
///
/// # Errors
///
/// Returns [`JockerError::Provision`] for the first mount that failed.
pub fn mount_essential_filesystems(
    mounter: &dyn Mounter,
    config: &JockerConfig,
    rootfs: &Path,
) -> Result<()> {
    tracing::debug!(rootfs = %rootfs.display(), "mounting essential filesystems");
    mount_all(mounter, &essential_mounts(config, rootfs))
}

fn mount_all(mounter: &dyn Mounter, requests: &[MountRequest]) -> Result<()> {
    let (tx, rx) = mpsc::channel();

    std::thread::scope(|scope| {
        for request in requests {
            let tx = tx.clone();
            let _ = scope.spawn(move || {
                let result = mounter.mount(request).map_err(|e| JockerError::Provision {
                    path: request.target.clone(),
                    source: e,
                });
                let _ = tx.send(result);
            });
        }
    });
    drop(tx);

    match rx.into_iter().find_map(std::result::Result::err) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
