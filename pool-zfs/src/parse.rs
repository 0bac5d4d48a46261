// SPDX-License-Identifier: GPL-3.0-only

//! Parsers for zpool command output.

use pool_types::{PoolProperties, PoolRecord, PoolStatus};

/// Parse `zpool list -Hp -o name,guid,health,cap,size,free` output.
///
/// One tab-separated pool per line; `-p` makes the numeric columns exact.
/// Malformed lines are skipped.
pub fn parse_list_output(output: &str) -> Vec<PoolRecord> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                return None;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 6 {
                return None;
            }
            Some(PoolRecord {
                guid: cols[1].trim().parse().ok()?,
                name: cols[0].trim().to_string(),
                status: PoolStatus::parse(cols[2]),
                properties: Some(PoolProperties {
                    capacity_percent: cols[3].trim().trim_end_matches('%').parse().ok()?,
                    size_bytes: cols[4].trim().parse().ok()?,
                    free_bytes: cols[5].trim().parse().ok()?,
                }),
            })
        })
        .collect()
}

#[derive(Default)]
struct Stanza {
    name: Option<String>,
    guid: Option<u64>,
    state: Option<PoolStatus>,
}

impl Stanza {
    fn finish(&mut self) -> Option<PoolRecord> {
        let name = self.name.take()?;
        let guid = self.guid.take()?;
        let status = self.state.take().unwrap_or(PoolStatus::Unknown);
        Some(PoolRecord {
            guid,
            name,
            status,
            // The volume manager cannot report usage before import.
            properties: None,
        })
    }
}

/// Parse `zpool import` listing output.
///
/// Each candidate pool is a stanza of `pool:` / `id:` / `state:` header
/// lines followed by status text and a vdev config block, which we ignore.
/// Stanzas missing a name or id are dropped.
pub fn parse_import_output(output: &str) -> Vec<PoolRecord> {
    let mut records = Vec::new();
    let mut current = Stanza::default();

    for line in output.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "pool" => {
                if let Some(record) = current.finish() {
                    records.push(record);
                }
                current = Stanza {
                    name: Some(value.trim().to_string()),
                    ..Stanza::default()
                };
            }
            "id" => current.guid = value.trim().parse().ok(),
            "state" => current.state = Some(PoolStatus::parse(value)),
            _ => {}
        }
    }
    if let Some(record) = current.finish() {
        records.push(record);
    }

    records
}
