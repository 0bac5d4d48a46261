// SPDX-License-Identifier: GPL-3.0-only

//! Gated, exclusive scan worker for one pool domain.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use pool_contracts::PoolBackend;
use pool_types::PoolRecord;

use crate::event::{Domain, PoolEvent, PoolEventKind};
use crate::set::PoolSet;

/// Owns one [`PoolSet`] and re-derives it from the backend on demand.
///
/// A scan runs only when the trigger or notify flag is armed, and the scan
/// guard makes the whole cycle exclusive per worker. The two workers of an
/// engine run independently and may scan concurrently with each other.
pub struct ScanWorker {
    domain: Domain,
    backend: Arc<dyn PoolBackend>,
    search_paths: Vec<PathBuf>,
    pools: Arc<PoolSet>,
    trigger: AtomicBool,
    notify: AtomicBool,
    scan_guard: tokio::sync::Mutex<()>,
    events: mpsc::UnboundedSender<PoolEvent>,
}

impl ScanWorker {
    pub fn new(
        domain: Domain,
        backend: Arc<dyn PoolBackend>,
        search_paths: Vec<PathBuf>,
        events: mpsc::UnboundedSender<PoolEvent>,
    ) -> Self {
        Self {
            domain,
            backend,
            search_paths,
            pools: Arc::new(PoolSet::new()),
            trigger: AtomicBool::new(false),
            notify: AtomicBool::new(false),
            scan_guard: tokio::sync::Mutex::new(()),
            events,
        }
    }

    pub fn pools(&self) -> &Arc<PoolSet> {
        &self.pools
    }

    /// Request that the next eligible scan run unconditionally.
    pub fn arm_trigger(&self) {
        self.trigger.store(true, Ordering::SeqCst);
    }

    /// Request that newly-appeared pools be reported as discrete events on
    /// the next scan. Multiple requests between scans collapse to one.
    pub fn request_notify(&self) {
        self.notify.store(true, Ordering::SeqCst);
    }

    pub fn trigger_armed(&self) -> bool {
        self.trigger.load(Ordering::SeqCst)
    }

    pub fn notify_requested(&self) -> bool {
        self.notify.load(Ordering::SeqCst)
    }

    fn emit(&self, kind: PoolEventKind) {
        if self.events.send(PoolEvent::new(self.domain, kind)).is_err() {
            trace!(domain = %self.domain, "event receiver dropped");
        }
    }

    async fn enumerate(&self) -> Result<Vec<PoolRecord>, pool_contracts::PoolError> {
        match self.domain {
            Domain::Active => self.backend.list_active().await,
            Domain::Importable => self.backend.find_importable(&self.search_paths).await,
        }
    }

    /// One gated scan attempt.
    ///
    /// No-op unless a request flag is armed and no scan is already running.
    /// On backend failure the set is left untouched and the trigger is
    /// re-armed so the next tick retries.
    pub async fn scan(&self) {
        if !self.trigger_armed() && !self.notify_requested() {
            return;
        }
        let Ok(_guard) = self.scan_guard.try_lock() else {
            return;
        };
        // A cycle that just released the guard may have consumed the flags.
        if !self.trigger_armed() && !self.notify_requested() {
            return;
        }

        self.trigger.store(false, Ordering::SeqCst);
        self.emit(PoolEventKind::ScanStarted);
        debug!(domain = %self.domain, "scanning pools");

        let mut pools = match self.enumerate().await {
            Ok(pools) => pools,
            Err(e) => {
                error!(domain = %self.domain, "scan failed: {e}");
                // Re-arm so the next tick retries; notify stays as it was.
                self.trigger.store(true, Ordering::SeqCst);
                self.emit(PoolEventKind::ScanFinished);
                return;
            }
        };
        pools.sort_by(|a, b| a.name.cmp(&b.name));
        let entries: Vec<(u64, PoolRecord)> = pools.into_iter().map(|p| (p.guid, p)).collect();

        let outcome = self.pools.update(entries);
        if outcome.changed {
            self.emit(PoolEventKind::Updated);
            if self.notify_requested() {
                for guid in &outcome.added {
                    if let Some(record) = self.pools.get(*guid) {
                        self.emit(PoolEventKind::NewPoolDetected(record));
                    }
                }
                self.notify.store(false, Ordering::SeqCst);
            }
            self.pools.clear_dirty();
        }

        self.emit(PoolEventKind::ScanFinished);
        // A trigger that arrived mid-scan must go back through the gate at
        // the next tick rather than forcing an immediate re-scan.
        self.trigger.store(false, Ordering::SeqCst);
    }

    /// Import a pool previously obtained from this worker's set.
    ///
    /// The record is removed optimistically before the backend call so the
    /// consumer never shows a pool mid-transition; the next scans re-derive
    /// the truth on both success and failure.
    pub async fn import_pool(&self, record: &PoolRecord) {
        self.pools.remove(record.guid);
        self.emit(PoolEventKind::Updated);
        info!("importing pool {}", record.label());
        match self.backend.import_pool(record).await {
            Ok(()) => self.emit(PoolEventKind::ImportSucceeded(record.clone())),
            Err(e) => {
                error!("import failed: {e}");
                self.emit(PoolEventKind::ImportFailed(record.clone(), e.message));
            }
        }
    }

    /// Export a pool previously obtained from this worker's set. Same
    /// optimistic-removal contract as [`ScanWorker::import_pool`].
    pub async fn export_pool(&self, record: &PoolRecord) {
        self.pools.remove(record.guid);
        self.emit(PoolEventKind::Updated);
        info!("exporting pool {}", record.label());
        match self.backend.export_pool(record).await {
            Ok(()) => self.emit(PoolEventKind::ExportSucceeded(record.clone())),
            Err(e) => {
                error!("export failed: {e}");
                self.emit(PoolEventKind::ExportFailed(record.clone(), e.message));
            }
        }
    }
}
