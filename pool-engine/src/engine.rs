// SPDX-License-Identifier: GPL-3.0-only

//! Composition root for the reconciliation core.
//!
//! [`Engine::spawn`] builds both workers, the reconciler and the scheduler
//! in one place and hands back explicit handles; there are no ambient
//! globals anywhere in the stack.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use pool_contracts::PoolBackend;
use pool_types::PoolRecord;

use crate::event::{Domain, PoolEvent};
use crate::reconciler::Reconciler;
use crate::worker::ScanWorker;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Fixed scheduler tick interval. No jitter or backoff.
    pub interval: Duration,

    /// Device directories searched for importable pools.
    pub search_paths: Vec<PathBuf>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            search_paths: vec![PathBuf::from("/var/run/disk/by-path")],
        }
    }
}

/// Running reconciliation core: two workers, a scheduler and the
/// cross-trigger reconciler, each in its own task.
pub struct Engine {
    active: Arc<ScanWorker>,
    importable: Arc<ScanWorker>,
    active_kick: Arc<Notify>,
    importable_kick: Arc<Notify>,
    shutdown: watch::Sender<bool>,
    scheduler: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
    reconciler: JoinHandle<()>,
}

impl Engine {
    /// Build and start the core. Returns the engine handle and the merged
    /// event stream for the presentation layer.
    ///
    /// Both triggers start armed so the first tick produces full scans.
    pub fn spawn(
        backend: Arc<dyn PoolBackend>,
        options: EngineOptions,
    ) -> (Self, mpsc::UnboundedReceiver<PoolEvent>) {
        let (active_tx, active_rx) = mpsc::unbounded_channel();
        let (importable_tx, importable_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let active = Arc::new(ScanWorker::new(
            Domain::Active,
            backend.clone(),
            Vec::new(),
            active_tx,
        ));
        let importable = Arc::new(ScanWorker::new(
            Domain::Importable,
            backend,
            options.search_paths.clone(),
            importable_tx,
        ));

        active.arm_trigger();
        importable.arm_trigger();

        let active_kick = Arc::new(Notify::new());
        let importable_kick = Arc::new(Notify::new());

        let workers = vec![
            spawn_worker(active.clone(), active_kick.clone(), shutdown_rx.clone()),
            spawn_worker(
                importable.clone(),
                importable_kick.clone(),
                shutdown_rx.clone(),
            ),
        ];

        let reconciler = Reconciler::new(
            active.clone(),
            importable.clone(),
            active_rx,
            importable_rx,
            out_tx,
        );
        let reconciler = tokio::spawn(reconciler.run(shutdown_rx.clone()));

        let scheduler = spawn_scheduler(
            options.interval,
            active.clone(),
            active_kick.clone(),
            importable_kick.clone(),
            shutdown_rx,
        );

        let engine = Self {
            active,
            importable,
            active_kick,
            importable_kick,
            shutdown: shutdown_tx,
            scheduler,
            workers,
            reconciler,
        };
        (engine, out_rx)
    }

    /// Edge-triggered external change signal: request that the next
    /// importable scan report newly-appeared pools. Multiple signals
    /// between scans collapse into one.
    pub fn request_notify(&self) {
        self.importable.request_notify();
    }

    /// Cloneable handle for a change-signal source that outlives borrows
    /// of the engine itself.
    pub fn notify_handle(&self) -> NotifyHandle {
        NotifyHandle {
            importable: self.importable.clone(),
        }
    }

    /// Trigger one gated scan attempt on the given domain. No-op when the
    /// domain has no pending request or is already scanning.
    pub async fn scan(&self, domain: Domain) {
        match domain {
            Domain::Active => self.active.scan().await,
            Domain::Importable => self.importable.scan().await,
        }
    }

    /// Ordered snapshot of the active pool set.
    pub fn active_pools(&self) -> Vec<PoolRecord> {
        self.active.pools().snapshot()
    }

    /// Ordered snapshot of the importable pool set.
    pub fn importable_pools(&self) -> Vec<PoolRecord> {
        self.importable.pools().snapshot()
    }

    /// Import a pool previously returned by [`Engine::importable_pools`].
    pub async fn import_pool(&self, record: &PoolRecord) {
        self.importable.import_pool(record).await;
    }

    /// Export a pool previously returned by [`Engine::active_pools`].
    pub async fn export_pool(&self, record: &PoolRecord) {
        self.active.export_pool(record).await;
    }

    /// Wake both workers for an immediate gated scan attempt without
    /// waiting for the next tick.
    pub fn kick(&self) {
        self.active_kick.notify_one();
        self.importable_kick.notify_one();
    }

    /// Ordered shutdown: scheduler first, then the workers (a running scan
    /// completes; there is no mid-scan cancellation), then the reconciler.
    pub async fn shutdown(self) {
        info!("stopping reconciliation engine");
        let _ = self.shutdown.send(true);
        join_quietly(self.scheduler, "scheduler").await;
        for handle in self.workers {
            join_quietly(handle, "worker").await;
        }
        join_quietly(self.reconciler, "reconciler").await;
    }
}

/// Handle a change-signal source uses to set the importable worker's
/// notify flag. It never invokes backend calls itself.
#[derive(Clone)]
pub struct NotifyHandle {
    importable: Arc<ScanWorker>,
}

impl NotifyHandle {
    pub fn request(&self) {
        self.importable.request_notify();
    }
}

async fn join_quietly(handle: JoinHandle<()>, name: &str) {
    if let Err(e) = handle.await {
        warn!("{name} task ended abnormally: {e}");
    }
}

fn spawn_worker(
    worker: Arc<ScanWorker>,
    kick: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = kick.notified() => worker.scan().await,
                _ = shutdown.changed() => break,
            }
        }
    })
}

fn spawn_scheduler(
    interval: Duration,
    active: Arc<ScanWorker>,
    active_kick: Arc<Notify>,
    importable_kick: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Every tick unconditionally requests an active scan;
                    // the importable worker only scans when something
                    // (reconciler or change signal) armed it.
                    active.arm_trigger();
                    active_kick.notify_one();
                    importable_kick.notify_one();
                }
                _ = shutdown.changed() => break,
            }
        }
    })
}
