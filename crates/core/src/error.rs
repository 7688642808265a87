// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for floor-core operations.

use thiserror::Error;

/// All possible errors that can occur in floor-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown operation kind: '{0}'\n  hint: valid kinds are: create_order, add_item, update_item, close_order, update_table")]
    UnknownKind(String),

    #[error("max attempts must be at least 1, got {0}")]
    InvalidMaxAttempts(u32),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted queue record at line {line}: {reason}")]
    CorruptedRecord { line: usize, reason: String },
}

/// A specialized Result type for floor-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
