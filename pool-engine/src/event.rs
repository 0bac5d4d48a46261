// SPDX-License-Identifier: GPL-3.0-only

//! Worker event stream types.

use std::fmt;

use pool_types::PoolRecord;

/// Which pool domain a worker covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Active,
    Importable,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Importable => f.write_str("importable"),
        }
    }
}

/// One event on a worker's stream.
///
/// Per worker the stream is FIFO and a scan cycle emits in a fixed order:
/// `ScanStarted`, then `Updated` if anything changed, then zero or more
/// `NewPoolDetected`, then `ScanFinished`. No ordering holds across the two
/// workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEvent {
    pub domain: Domain,
    pub kind: PoolEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEventKind {
    ScanStarted,
    ScanFinished,
    /// The domain's set content changed (scan diff or optimistic removal).
    Updated,
    /// A pool appeared that was absent before; only emitted when the scan
    /// ran under a notify request.
    NewPoolDetected(PoolRecord),
    ImportSucceeded(PoolRecord),
    ImportFailed(PoolRecord, String),
    ExportSucceeded(PoolRecord),
    ExportFailed(PoolRecord, String),
}

impl PoolEvent {
    pub fn new(domain: Domain, kind: PoolEventKind) -> Self {
        Self { domain, kind }
    }
}
