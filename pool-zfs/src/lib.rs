// SPDX-License-Identifier: GPL-3.0-only

//! zpool CLI backend
//!
//! Drives the `zpool` tool directly: `zpool list` for active pools,
//! `zpool import` in listing mode for importable ones, and the import and
//! export subcommands for mutations. Output parsing is tolerant: lines a
//! newer zpool adds that we do not understand are skipped, never fatal.

mod backend;
mod parse;

pub use backend::ZpoolBackend;
