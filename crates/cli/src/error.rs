// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the `floorsync` command line.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("queue is in use: {}\n  hint: another floorsync process holds the lock", .0.display())]
    QueueInUse(PathBuf),

    #[error("invalid payload: {0}\n  hint: the payload must be a JSON object, e.g. '{{\"id\":\"o1\"}}'")]
    InvalidPayload(String),

    #[error("refusing to discard {0} pending operations\n  hint: pass --yes to confirm")]
    ConfirmationRequired(usize),

    #[error(transparent)]
    Core(#[from] floor_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
