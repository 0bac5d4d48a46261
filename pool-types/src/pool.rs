// SPDX-License-Identifier: GPL-3.0-only

//! Pool data models
//!
//! A `PoolRecord` is one pool as seen by a single enumeration pass. The GUID
//! is the sole identity key; name and status travel with it per scan and no
//! rename detection is attempted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::bytes_to_pretty;

/// Health of a pool as reported by the volume manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    Online,
    Degraded,
    Faulted,
    Offline,
    Unavail,
    Removed,
    Unknown,
}

impl PoolStatus {
    /// Parse a zpool health token. Unrecognized tokens map to `Unknown`
    /// rather than failing, so a newer zpool cannot break enumeration.
    pub fn parse(health: &str) -> Self {
        match health.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => Self::Online,
            "DEGRADED" => Self::Degraded,
            "FAULTED" => Self::Faulted,
            "OFFLINE" => Self::Offline,
            "UNAVAIL" => Self::Unavail,
            "REMOVED" => Self::Removed,
            _ => Self::Unknown,
        }
    }

    /// Whether a pool in this state is worth offering for import.
    /// Mirrors the menu gating: only healthy or degraded pools qualify.
    pub fn is_importable(self) -> bool {
        matches!(self, Self::Online | Self::Degraded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Degraded => "DEGRADED",
            Self::Faulted => "FAULTED",
            Self::Offline => "OFFLINE",
            Self::Unavail => "UNAVAIL",
            Self::Removed => "REMOVED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational space metrics for a pool.
///
/// Active pools carry these; importable pools typically do not, since the
/// volume manager cannot report usage before import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolProperties {
    /// Used capacity, percent (0-100)
    pub capacity_percent: u8,

    /// Total size in bytes
    pub size_bytes: u64,

    /// Free space in bytes
    pub free_bytes: u64,
}

impl PoolProperties {
    /// One-line summary for notification/menu text.
    pub fn summary(&self) -> String {
        format!(
            "Size: {}, {} free",
            bytes_to_pretty(&self.size_bytes, false),
            bytes_to_pretty(&self.free_bytes, false)
        )
    }
}

/// Immutable snapshot of one discovered pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    /// Stable unique identifier, the sole identity key across scans
    pub guid: u64,

    /// Display name at scan time
    pub name: String,

    /// Health at scan time
    pub status: PoolStatus,

    /// Space metrics, when the backend supplies them
    pub properties: Option<PoolProperties>,
}

impl PoolRecord {
    /// "name (guid)" form used in logs.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.guid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive_and_tolerant() {
        assert_eq!(PoolStatus::parse("ONLINE"), PoolStatus::Online);
        assert_eq!(PoolStatus::parse("degraded"), PoolStatus::Degraded);
        assert_eq!(PoolStatus::parse(" FAULTED \n"), PoolStatus::Faulted);
        assert_eq!(PoolStatus::parse("SPLIT"), PoolStatus::Unknown);
        assert_eq!(PoolStatus::parse(""), PoolStatus::Unknown);
    }

    #[test]
    fn import_gating_matches_health() {
        assert!(PoolStatus::Online.is_importable());
        assert!(PoolStatus::Degraded.is_importable());
        assert!(!PoolStatus::Faulted.is_importable());
        assert!(!PoolStatus::Unavail.is_importable());
        assert!(!PoolStatus::Unknown.is_importable());
    }

    #[test]
    fn record_serialization_roundtrips() {
        let record = PoolRecord {
            guid: 11_612_329_350_083_180_542,
            name: "tank".to_string(),
            status: PoolStatus::Online,
            properties: Some(PoolProperties {
                capacity_percent: 42,
                size_bytes: 4 * 1024 * 1024 * 1024,
                free_bytes: 2 * 1024 * 1024 * 1024,
            }),
        };

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: PoolRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }

    #[test]
    fn properties_summary_is_human_readable() {
        let properties = PoolProperties {
            capacity_percent: 50,
            size_bytes: 6 * 1024 * 1024 * 1024,
            free_bytes: 3 * 1024 * 1024 * 1024,
        };
        assert_eq!(properties.summary(), "Size: 6.00 GB, 3.00 GB free");
    }
}
