//! Filesystem provisioning for per-user isolated roots.
//!
//! Provides the overlay specification, the mount seam and the provisioning
//! sequence that composes them.

pub mod mount;
pub mod overlayfs;
pub mod provision;
