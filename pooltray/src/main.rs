// SPDX-License-Identifier: GPL-3.0-only

//! pooltray - ZFS pool discovery and import/export agent
//!
//! Periodically enumerates active and importable pools, reconciles the two
//! views and reports changes. Device hotplug events from UDisks2 request an
//! out-of-band importable scan with new-pool notifications.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod devices;
mod notify;

use pool_engine::{Engine, EngineOptions, PoolEvent, PoolEventKind};
use pool_zfs::ZpoolBackend;

use notify::notification_for;

#[derive(Debug, Parser)]
#[command(name = "pooltray", version, about = "ZFS pool discovery and import/export agent")]
struct Cli {
    /// Scheduler tick interval in seconds
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Device directory searched for importable pools (repeatable)
    #[arg(long = "search-path")]
    search_paths: Vec<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "pooltray=info,pool_engine=info,warn")]
    log_filter: String,

    /// Explicit zpool binary instead of searching PATH
    #[arg(long)]
    zpool: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting pooltray v{}", env!("CARGO_PKG_VERSION"));

    let search_paths = if cli.search_paths.is_empty() {
        vec![PathBuf::from("/var/run/disk/by-path")]
    } else {
        cli.search_paths.clone()
    };

    let backend = match cli.zpool {
        Some(path) => ZpoolBackend::with_binary(path, search_paths.clone()),
        None => ZpoolBackend::new(search_paths.clone())?,
    };

    let options = EngineOptions {
        interval: Duration::from_secs(cli.interval),
        search_paths,
    };
    let (engine, events) = Engine::spawn(Arc::new(backend), options);

    let watcher = match devices::watch_device_events(engine.notify_handle()).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("device change signal unavailable ({e}); relying on periodic scans");
            None
        }
    };

    let consumer = tokio::spawn(consume_events(events));

    info!("pooltray ready, scanning every {}s", cli.interval);
    tokio::signal::ctrl_c().await?;
    info!("received shutdown signal");

    // Ordered teardown: scheduler and workers first, then the change
    // signal source; the event consumer drains and ends with the stream.
    engine.shutdown().await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }
    let _ = consumer.await;

    info!("pooltray stopped");
    Ok(())
}


async fn consume_events(mut events: mpsc::UnboundedReceiver<PoolEvent>) {
    while let Some(event) = events.recv().await {
        if let Some(notification) = notification_for(&event) {
            info!("{}: {}", notification.title, notification.body);
            continue;
        }
        match event.kind {
            PoolEventKind::ScanStarted => debug!("{} scan started", event.domain),
            PoolEventKind::ScanFinished => debug!("{} scan finished", event.domain),
            PoolEventKind::Updated => debug!("{} pools updated", event.domain),
            _ => {}
        }
    }
}
