// SPDX-License-Identifier: GPL-3.0-only

//! Contracts between the reconciliation engine and storage backends.

pub mod backend;
pub mod error;

pub use backend::PoolBackend;
pub use error::{PoolError, PoolErrorKind};
