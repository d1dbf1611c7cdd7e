//! Root switch and identity drop.

use std::path::Path;

use anyhow::{Context, bail};
use jocker_common::types::IdentityBinding;
use nix::unistd::{Gid, Uid, chdir, chroot, setgid, setuid};

/// Makes `root` the filesystem root of this process and moves into it.
pub fn enter_root(root: &Path) -> anyhow::Result<()> {
    chroot(root).with_context(|| format!("chroot to {} failed", root.display()))?;
    chdir("/").context("chdir to new root failed")?;
    tracing::debug!(root = %root.display(), "entered root");
    Ok(())
}

/// Drops supplementary groups, then the group, then the user id.
///
/// Fails if root privileges can be regained afterwards.
pub fn drop_to(identity: IdentityBinding) -> anyhow::Result<()> {
    let gid = Gid::from_raw(identity.gid);
    let uid = Uid::from_raw(identity.uid);

    #[cfg(target_os = "linux")]
    nix::unistd::setgroups(&[gid]).context("setgroups failed")?;
    setgid(gid).with_context(|| format!("setgid({gid}) failed"))?;
    setuid(uid).with_context(|| format!("setuid({uid}) failed"))?;

    if !uid.is_root() && setuid(Uid::from_raw(0)).is_ok() {
        bail!("privileges could not be dropped: uid 0 is still reachable");
    }
    tracing::debug!(%identity, "privileges dropped");
    Ok(())
}
