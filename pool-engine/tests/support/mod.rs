//! Scripted in-memory backend for engine tests.

// Each test binary uses a different slice of this module.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use pool_contracts::{PoolBackend, PoolError};
use pool_types::{PoolRecord, PoolStatus};

pub fn pool(guid: u64, name: &str) -> PoolRecord {
    PoolRecord {
        guid,
        name: name.to_string(),
        status: PoolStatus::Online,
        properties: None,
    }
}

#[derive(Default)]
pub struct MockState {
    pub active: Vec<PoolRecord>,
    pub importable: Vec<PoolRecord>,
    pub fail_list_active: Option<PoolError>,
    pub fail_find_importable: Option<PoolError>,
    pub fail_import: Option<PoolError>,
    pub fail_export: Option<PoolError>,
    /// Artificial enumeration latency, for exclusivity tests.
    pub enumerate_delay: Duration,
}

/// Backend whose world is a mutable in-memory pair of pool lists.
/// Successful import/export moves the record between the lists, so
/// subsequent scans observe the mutation like they would with a real
/// volume manager.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
    pub active_calls: AtomicUsize,
    pub importable_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(active: Vec<PoolRecord>, importable: Vec<PoolRecord>) -> Self {
        Self {
            state: Mutex::new(MockState {
                active,
                importable,
                ..MockState::default()
            }),
            ..Self::default()
        }
    }

    pub fn with_state(&self, f: impl FnOnce(&mut MockState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }

    pub fn active_call_count(&self) -> usize {
        self.active_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolBackend for MockBackend {
    async fn list_active(&self) -> Result<Vec<PoolRecord>, PoolError> {
        self.active_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &state.fail_list_active {
                Some(e) => (state.enumerate_delay, Err(e.clone())),
                None => (state.enumerate_delay, Ok(state.active.clone())),
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn find_importable(
        &self,
        _search_paths: &[PathBuf],
    ) -> Result<Vec<PoolRecord>, PoolError> {
        self.importable_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &state.fail_find_importable {
                Some(e) => (state.enumerate_delay, Err(e.clone())),
                None => (state.enumerate_delay, Ok(state.importable.clone())),
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn import_pool(&self, record: &PoolRecord) -> Result<(), PoolError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(e) = &state.fail_import {
            return Err(e.clone());
        }
        let index = state
            .importable
            .iter()
            .position(|p| p.guid == record.guid)
            .ok_or_else(|| PoolError::not_found(format!("no such pool '{}'", record.name)))?;
        let moved = state.importable.remove(index);
        state.active.push(moved);
        Ok(())
    }

    async fn export_pool(&self, record: &PoolRecord) -> Result<(), PoolError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(e) = &state.fail_export {
            return Err(e.clone());
        }
        let index = state
            .active
            .iter()
            .position(|p| p.guid == record.guid)
            .ok_or_else(|| PoolError::not_found(format!("no such pool '{}'", record.name)))?;
        let moved = state.active.remove(index);
        state.importable.push(moved);
        Ok(())
    }
}
