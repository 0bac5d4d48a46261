// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use pool_contracts::{PoolBackend, PoolError, PoolErrorKind};
use pool_types::PoolRecord;

use crate::parse::{parse_import_output, parse_list_output};

/// `PoolBackend` implementation that shells out to `zpool`.
pub struct ZpoolBackend {
    zpool: PathBuf,
    /// Device directories passed to `zpool import` when importing, so the
    /// tool can locate the pool's vdevs.
    search_paths: Vec<PathBuf>,
}

impl ZpoolBackend {
    /// Locate `zpool` on PATH.
    pub fn new(search_paths: Vec<PathBuf>) -> Result<Self, PoolError> {
        let zpool = which::which("zpool")
            .map_err(|_| PoolError::unavailable("zpool executable not found in PATH"))?;
        Ok(Self::with_binary(zpool, search_paths))
    }

    /// Use an explicit zpool binary path.
    pub fn with_binary(zpool: PathBuf, search_paths: Vec<PathBuf>) -> Self {
        Self {
            zpool,
            search_paths,
        }
    }

    async fn run(&self, args: &[String]) -> Result<String, PoolError> {
        debug!("running {} {}", self.zpool.display(), args.join(" "));
        let output = Command::new(&self.zpool)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                PoolError::unavailable(format!("failed to run {}: {e}", self.zpool.display()))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn search_path_args(paths: &[PathBuf]) -> Vec<String> {
        let mut args = Vec::new();
        for path in paths {
            args.push("-d".to_string());
            args.push(path.display().to_string());
        }
        args
    }
}

#[async_trait]
impl PoolBackend for ZpoolBackend {
    async fn list_active(&self) -> Result<Vec<PoolRecord>, PoolError> {
        let args = ["list", "-Hp", "-o", "name,guid,health,cap,size,free"]
            .map(str::to_string)
            .to_vec();
        let output = self.run(&args).await?;
        Ok(parse_list_output(&output))
    }

    async fn find_importable(
        &self,
        search_paths: &[PathBuf],
    ) -> Result<Vec<PoolRecord>, PoolError> {
        let mut args = vec!["import".to_string()];
        args.extend(Self::search_path_args(search_paths));
        match self.run(&args).await {
            Ok(output) => Ok(parse_import_output(&output)),
            // Listing mode exits non-zero when nothing is importable.
            Err(e) if is_no_pools_message(&e.message) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn import_pool(&self, record: &PoolRecord) -> Result<(), PoolError> {
        let mut args = vec!["import".to_string()];
        args.extend(Self::search_path_args(&self.search_paths));
        args.push(record.guid.to_string());
        self.run(&args).await?;
        Ok(())
    }

    async fn export_pool(&self, record: &PoolRecord) -> Result<(), PoolError> {
        let args = vec!["export".to_string(), record.name.clone()];
        self.run(&args).await?;
        Ok(())
    }
}

fn is_no_pools_message(message: &str) -> bool {
    message.contains("no pools available")
}

/// Map zpool stderr to an error kind. The full trimmed text is kept as the
/// user-facing message.
fn classify_failure(stderr: &str) -> PoolError {
    let message = stderr.trim().to_string();
    let lower = message.to_ascii_lowercase();
    let kind = if lower.contains("permission denied") || lower.contains("must be root") {
        PoolErrorKind::PermissionDenied
    } else if lower.contains("busy") {
        PoolErrorKind::Busy
    } else if lower.contains("no such pool") {
        PoolErrorKind::NotFound
    } else if lower.contains("invalid") {
        PoolErrorKind::InvalidInput
    } else {
        PoolErrorKind::Internal
    };
    PoolError::new(kind, message)
}
