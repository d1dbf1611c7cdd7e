//! # jocker-core
//!
//! Provisioning of per-user isolated roots and the command gate that must
//! pass before a privilege-dropped process runs inside them.
//!
//! - **Validation**: ownership and permission checks on the entry point.
//! - **Filesystem**: overlay root plus `dev`, `proc` and `tmp` mounts.
//! - **Spawn**: argument shaping for the external privilege-dropping helper.
//! - **Engine**: the `create`, `exec` and `run` workflows.
//!
//! This crate never drops privileges itself. It decides whether the helper
//! may be invoked and supplies its arguments.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod engine;
pub mod env;
pub mod filesystem;
pub mod spawn;
pub mod validate;
