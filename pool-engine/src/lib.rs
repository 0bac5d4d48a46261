// SPDX-License-Identifier: GPL-3.0-only

//! Pool discovery and reconciliation core
//!
//! Two scan workers, one per pool domain (active and importable), each own
//! an ordered [`PoolSet`] and repeatedly re-derive it from the backend. A
//! scan only runs when requested (trigger or notify flag) and never
//! concurrently with itself. The [`Reconciler`] wires the two workers
//! together: any state-changing event on one domain re-arms the other, so
//! the pair converges without a shared transaction; correctness relies on
//! idempotent re-scans, not on atomic cross-domain updates.
//!
//! Everything downstream of the workers (menu, notifications) consumes the
//! merged event stream returned by [`Engine::spawn`].

pub mod engine;
pub mod event;
pub mod reconciler;
pub mod set;
pub mod worker;

pub use engine::{Engine, EngineOptions, NotifyHandle};
pub use event::{Domain, PoolEvent, PoolEventKind};
pub use reconciler::Reconciler;
pub use set::{PoolSet, UpdateOutcome};
pub use worker::ScanWorker;
