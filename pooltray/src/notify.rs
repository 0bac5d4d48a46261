// SPDX-License-Identifier: GPL-3.0-only

//! Notification copy for the event stream.
//!
//! Only user-facing events (new pools, import/export outcomes) produce a
//! notification; scan lifecycle events stay in the debug log.

use pool_engine::{PoolEvent, PoolEventKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

pub fn notification_for(event: &PoolEvent) -> Option<Notification> {
    let (title, body) = match &event.kind {
        PoolEventKind::NewPoolDetected(record) => (
            "New pool available for import",
            format!("Pool {} is available for import", record.name),
        ),
        PoolEventKind::ImportSucceeded(record) => (
            "Import successful",
            format!("Pool {} was successfully imported", record.name),
        ),
        PoolEventKind::ImportFailed(record, message) => (
            "Import error",
            format!("Error when importing pool {}: {message}", record.name),
        ),
        PoolEventKind::ExportSucceeded(record) => (
            "Export successful",
            format!("Pool {} was successfully exported", record.name),
        ),
        PoolEventKind::ExportFailed(record, message) => (
            "Export error",
            format!("Error when exporting pool {}: {message}", record.name),
        ),
        _ => return None,
    };
    Some(Notification {
        title: title.to_string(),
        body,
    })
}
