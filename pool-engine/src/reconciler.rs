// SPDX-License-Identifier: GPL-3.0-only

//! Cross-trigger wiring between the two scan workers.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use crate::event::{Domain, PoolEvent, PoolEventKind};
use crate::worker::ScanWorker;

/// Drains both workers' event channels, applies the cross-trigger table and
/// forwards every event to the single outbound consumer channel.
///
/// The wiring: an `Updated` on one domain re-arms the other domain's
/// trigger (an export makes a pool potentially importable and vice versa);
/// import/export outcomes, success or failure, re-arm both, so the
/// optimistic removal is always corrected by real scans. Re-arming only
/// sets flags; the scans themselves run on the scheduler's next kick,
/// which keeps the reconciler free of backend calls.
pub struct Reconciler {
    active: Arc<ScanWorker>,
    importable: Arc<ScanWorker>,
    active_rx: mpsc::UnboundedReceiver<PoolEvent>,
    importable_rx: mpsc::UnboundedReceiver<PoolEvent>,
    out: mpsc::UnboundedSender<PoolEvent>,
}

impl Reconciler {
    pub fn new(
        active: Arc<ScanWorker>,
        importable: Arc<ScanWorker>,
        active_rx: mpsc::UnboundedReceiver<PoolEvent>,
        importable_rx: mpsc::UnboundedReceiver<PoolEvent>,
        out: mpsc::UnboundedSender<PoolEvent>,
    ) -> Self {
        Self {
            active,
            importable,
            active_rx,
            importable_rx,
            out,
        }
    }

    fn apply(&self, event: &PoolEvent) {
        match (&event.domain, &event.kind) {
            (Domain::Active, PoolEventKind::Updated) => {
                debug!("active pools updated, re-arming importable scan");
                self.importable.arm_trigger();
            }
            (Domain::Importable, PoolEventKind::Updated) => {
                debug!("importable pools updated, re-arming active scan");
                self.active.arm_trigger();
            }
            (
                _,
                PoolEventKind::ImportSucceeded(_)
                | PoolEventKind::ImportFailed(..)
                | PoolEventKind::ExportSucceeded(_)
                | PoolEventKind::ExportFailed(..),
            ) => {
                debug!(domain = %event.domain, "mutation finished, re-arming both scans");
                self.active.arm_trigger();
                self.importable.arm_trigger();
            }
            _ => {}
        }
    }

    /// Run until shutdown is signalled or both workers are gone.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let event = tokio::select! {
                maybe = self.active_rx.recv() => maybe,
                maybe = self.importable_rx.recv() => maybe,
                _ = shutdown.changed() => break,
            };
            let Some(event) = event else {
                break;
            };
            self.apply(&event);
            if self.out.send(event).is_err() {
                trace!("event consumer dropped, stopping reconciler");
                break;
            }
        }
    }
}
