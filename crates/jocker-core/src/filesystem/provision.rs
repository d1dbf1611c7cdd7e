//! Creation of a user's isolated root.
//!
//! Sequence: work directory, overlay mount, then the three auxiliary mounts.
//! Each step depends on the previous one succeeding.

use std::path::Path;

use jocker_common::config::JockerConfig;
use jocker_common::error::{JockerError, Result};

use super::mount::{Mounter, mount_essential_filesystems};
use super::overlayfs::{OverlaySpec, mount_overlay};

/// Provisions the overlay root at `upper_dir` and returns its layout.
///
/// Re-running on an already provisioned directory tolerates the existing
/// work directory. Whether remounting is harmless is up to the mounter.
///
/// # Errors
///
/// Returns [`JockerError::Config`] for an unusable `upper_dir` and
/// [`JockerError::Provision`] if directory creation or any mount fails.
pub fn provision(
    mounter: &dyn Mounter,
    config: &JockerConfig,
    upper_dir: &Path,
) -> Result<OverlaySpec> {
    let spec = OverlaySpec::for_upper_dir(upper_dir)?;

    mounter
        .ensure_dir(&spec.work_dir, config.workdir_mode)
        .map_err(|e| JockerError::Provision {
            path: spec.work_dir.clone(),
            source: e,
        })?;

    mount_overlay(mounter, &spec)?;
    mount_essential_filesystems(mounter, config, &spec.upper_dir)?;

    tracing::info!(upper = %spec.upper_dir.display(), "container root provisioned");
    Ok(spec)
}
