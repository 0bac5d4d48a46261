// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use async_trait::async_trait;

use pool_types::PoolRecord;

use crate::PoolError;

/// The storage-management seam the engine drives.
///
/// Enumerations return the full current set for their domain, never a
/// partial update. Calls may block on system I/O and are expected to run
/// off the presentation thread.
#[async_trait]
pub trait PoolBackend: Send + Sync {
    /// Enumerate pools currently imported by the system.
    async fn list_active(&self) -> Result<Vec<PoolRecord>, PoolError>;

    /// Enumerate pools detected on devices under the given search paths
    /// but not currently imported.
    async fn find_importable(&self, search_paths: &[PathBuf])
    -> Result<Vec<PoolRecord>, PoolError>;

    /// Import a pool previously returned by `find_importable`.
    async fn import_pool(&self, record: &PoolRecord) -> Result<(), PoolError>;

    /// Export a pool previously returned by `list_active`.
    async fn export_pool(&self, record: &PoolRecord) -> Result<(), PoolError>;
}
