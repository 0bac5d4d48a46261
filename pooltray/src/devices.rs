// SPDX-License-Identifier: GPL-3.0-only

//! Device change signal source
//!
//! Watches UDisks2's ObjectManager for block devices appearing or
//! disappearing and coalesces every such event into the importable
//! worker's notify flag. The watcher never touches the storage backend;
//! scans happen on the scheduler's next tick.

use std::collections::HashMap;

use anyhow::Result;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use zbus::{Connection, zvariant};
use zbus_macros::proxy;

use pool_engine::NotifyHandle;

const BLOCK_IFACE: &str = "org.freedesktop.UDisks2.Block";

#[proxy(
    default_service = "org.freedesktop.UDisks2",
    default_path = "/org/freedesktop/UDisks2",
    interface = "org.freedesktop.DBus.ObjectManager"
)]
pub trait UDisks2ObjectManager {
    #[zbus(signal)]
    fn interfaces_added(
        &self,
        object_path: zvariant::OwnedObjectPath,
        interfaces_and_properties: HashMap<String, HashMap<String, zvariant::OwnedValue>>,
    ) -> zbus::Result<()>;

    #[zbus(signal)]
    fn interfaces_removed(
        &self,
        object_path: zvariant::OwnedObjectPath,
        interfaces: Vec<String>,
    ) -> zbus::Result<()>;
}

/// Subscribe to block device add/remove signals and forward them as notify
/// requests. Returns the watcher task handle.
pub async fn watch_device_events(notify: NotifyHandle) -> Result<JoinHandle<()>> {
    let connection = Connection::system().await?;
    let object_manager = UDisks2ObjectManagerProxy::new(&connection).await?;
    let mut added_stream = object_manager.receive_interfaces_added().await?;
    let mut removed_stream = object_manager.receive_interfaces_removed().await?;

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe_added = added_stream.next() => {
                    let Some(signal) = maybe_added else {
                        break;
                    };
                    match signal.args() {
                        Ok(args) if args.interfaces_and_properties.contains_key(BLOCK_IFACE) => {
                            debug!("block device added: {}", args.object_path);
                            notify.request();
                        }
                        Ok(_) => {}
                        Err(e) => warn!("failed to parse InterfacesAdded signal args: {e}"),
                    }
                }
                maybe_removed = removed_stream.next() => {
                    let Some(signal) = maybe_removed else {
                        break;
                    };
                    match signal.args() {
                        Ok(args) if args.interfaces.iter().any(|i| i == BLOCK_IFACE) => {
                            debug!("block device removed: {}", args.object_path);
                            notify.request();
                        }
                        Ok(_) => {}
                        Err(e) => warn!("failed to parse InterfacesRemoved signal args: {e}"),
                    }
                }
            }
        }
    });

    Ok(handle)
}
