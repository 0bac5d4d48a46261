// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for pooltray
//!
//! This crate defines the single source of truth for the pool domain types.
//! These models are used throughout the stack:
//!
//! - **pool-zfs**: Returns these types directly from its public API
//! - **pool-engine**: Diffs and snapshots sets of these records
//! - **pooltray**: Consumes these types when rendering notifications
//!
//! Records are immutable snapshots: a scan produces fresh `PoolRecord`s and
//! the previous generation is superseded, never patched in place.

pub mod common;
pub mod pool;

pub use common::bytes_to_pretty;
pub use pool::{PoolProperties, PoolRecord, PoolStatus};
