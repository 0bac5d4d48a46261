// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolErrorKind {
    InvalidInput,
    NotFound,
    PermissionDenied,
    Busy,
    Unavailable,
    Internal,
}

/// A backend failure carrying a human-readable message.
///
/// Backend failures are never fatal to the engine: the worker that hit one
/// reports it through its event stream and the next scan cycle retries.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct PoolError {
    pub kind: PoolErrorKind,
    pub message: String,
}

impl PoolError {
    pub fn new(kind: PoolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(PoolErrorKind::NotFound, message)
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::new(PoolErrorKind::Busy, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(PoolErrorKind::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(PoolErrorKind::Internal, message)
    }
}
