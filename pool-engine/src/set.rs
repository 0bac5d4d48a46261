// SPDX-License-Identifier: GPL-3.0-only

//! Ordered, identity-keyed pool collection with change detection.

use std::sync::{Mutex, MutexGuard, PoisonError};

use pool_types::PoolRecord;

/// Result of one [`PoolSet::update`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Whether the key sequence changed and the set was replaced.
    pub changed: bool,

    /// GUIDs present after the update that were absent before it.
    pub added: Vec<u64>,
}

#[derive(Default)]
struct Inner {
    /// guid -> record, insertion order = scan result order.
    entries: Vec<(u64, PoolRecord)>,

    /// Set by `update` when the content changed; cleared by the consumer
    /// once it has finished reacting.
    dirty: bool,
}

/// One domain's view of the world, guarded by its own lock.
///
/// Only the owning worker mutates a set; readers take the same lock for any
/// snapshot. Two sets are never locked together, so there is no lock
/// ordering to get wrong.
#[derive(Default)]
pub struct PoolSet {
    inner: Mutex<Inner>,
}

impl PoolSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the data itself intact;
        // recover the guard instead of propagating the poison.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the set with the full result of one enumeration.
    ///
    /// The comparison is ordered key-sequence equality: same GUIDs in the
    /// same order is a no-op, and the existing records are kept even when
    /// their field values differ. A status flip without a key or order
    /// change is therefore invisible to the diff, a long-standing quirk
    /// kept for compatibility with the behavior users already rely on.
    /// A reorder (e.g. sort position change after a rename) does count as
    /// a change.
    ///
    /// Duplicate incoming GUIDs are not checked; the last pair wins, as
    /// with any mapping.
    pub fn update(&self, new_entries: Vec<(u64, PoolRecord)>) -> UpdateOutcome {
        let mut inner = self.lock();

        let same_sequence = inner.entries.len() == new_entries.len()
            && inner
                .entries
                .iter()
                .zip(new_entries.iter())
                .all(|((old, _), (new, _))| old == new);
        if same_sequence {
            return UpdateOutcome {
                changed: false,
                added: Vec::new(),
            };
        }

        let added = new_entries
            .iter()
            .map(|(guid, _)| *guid)
            .filter(|guid| !inner.entries.iter().any(|(old, _)| old == guid))
            .collect();

        inner.entries.clear();
        for (guid, record) in new_entries {
            match inner.entries.iter().position(|(g, _)| *g == guid) {
                Some(index) => inner.entries[index].1 = record,
                None => inner.entries.push((guid, record)),
            }
        }
        inner.dirty = true;

        UpdateOutcome {
            changed: true,
            added,
        }
    }

    /// Remove one record by GUID. Does not touch the dirty flag; the
    /// caller decides how to announce the removal.
    pub fn remove(&self, guid: u64) -> Option<PoolRecord> {
        let mut inner = self.lock();
        let index = inner.entries.iter().position(|(g, _)| *g == guid)?;
        Some(inner.entries.remove(index).1)
    }

    pub fn get(&self, guid: u64) -> Option<PoolRecord> {
        let inner = self.lock();
        inner
            .entries
            .iter()
            .find(|(g, _)| *g == guid)
            .map(|(_, record)| record.clone())
    }

    pub fn contains(&self, guid: u64) -> bool {
        self.lock().entries.iter().any(|(g, _)| *g == guid)
    }

    /// Ordered snapshot of the current records.
    pub fn snapshot(&self) -> Vec<PoolRecord> {
        self.lock()
            .entries
            .iter()
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    pub fn clear_dirty(&self) {
        self.lock().dirty = false;
    }
}
