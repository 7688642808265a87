// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue of pending write operations.
//!
//! The queue keeps its contents in memory and, when opened on a path, mirrors
//! them to a JSONL file: one [`PendingOp`] record per line. Appends are
//! written and fsynced immediately. Removals and attempt bumps rewrite the
//! whole file through a temporary sibling that is renamed into place, so a
//! crash leaves either the old or the new contents.
//!
//! Mutations update memory first and then persist. A persistence error is
//! returned to the caller, but the in-memory queue already reflects the
//! change.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::op::{OpId, OpKind, PendingOp, DEFAULT_MAX_ATTEMPTS};

/// Ordered queue of pending ops, optionally backed by a JSONL file.
#[derive(Debug)]
pub struct OfflineQueue {
    /// Backing file, if durable.
    path: Option<PathBuf>,
    /// Ops in insertion order.
    ops: Vec<PendingOp>,
    /// Retry budget for ops enqueued without one.
    default_max_attempts: u32,
}

impl OfflineQueue {
    /// Create or open a durable queue at the given path.
    ///
    /// Existing records are restored verbatim, attempt counts included.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Ensure the file exists (create if not)
        OpenOptions::new().create(true).append(true).open(path)?;

        let ops = read_records(path)?;
        Ok(OfflineQueue {
            path: Some(path.to_path_buf()),
            ops,
            default_max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Read the ops stored at `path` without opening the queue for writing.
    ///
    /// A missing file reads as an empty queue; nothing is created.
    pub fn load_snapshot(path: &Path) -> Result<Vec<PendingOp>> {
        read_records(path)
    }

    /// Create a queue that lives only in memory.
    pub fn in_memory() -> Self {
        OfflineQueue {
            path: None,
            ops: Vec::new(),
            default_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the retry budget used when `enqueue` is not given one.
    pub fn with_default_max_attempts(mut self, max_attempts: u32) -> Self {
        self.default_max_attempts = max_attempts.max(1);
        self
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append a new op to the tail and return its id.
    ///
    /// Never touches the network. With a backing file, the record is
    /// persisted before this returns.
    pub fn enqueue(
        &mut self,
        kind: OpKind,
        payload: Value,
        max_attempts: Option<u32>,
    ) -> Result<OpId> {
        let max_attempts = match max_attempts {
            Some(0) => return Err(Error::InvalidMaxAttempts(0)),
            Some(n) => n,
            None => self.default_max_attempts,
        };
        let op = PendingOp::new(kind, payload, max_attempts);
        let id = op.id.clone();
        self.push(op)?;
        Ok(id)
    }

    /// Append an already-built op to the tail.
    pub fn push(&mut self, op: PendingOp) -> Result<()> {
        let line = serde_json::to_string(&op)?;
        self.ops.push(op);

        if let Some(path) = &self.path {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", line)?;
            file.sync_all()?;
        }
        Ok(())
    }

    /// Remove an op by id. Returns whether anything was removed.
    ///
    /// Unknown ids are a no-op, so calling this twice is harmless.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.ops.len();
        self.ops.retain(|op| op.id != id);
        if self.ops.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Increment the attempt counter of an op.
    ///
    /// Returns the new count, or `None` if the op is not queued.
    pub fn bump_attempt(&mut self, id: &str) -> Result<Option<u32>> {
        let Some(op) = self.ops.iter_mut().find(|op| op.id == id) else {
            return Ok(None);
        };
        op.attempt_count = op.attempt_count.saturating_add(1);
        let count = op.attempt_count;
        self.persist()?;
        Ok(Some(count))
    }

    /// Store the message of a failed attempt on an op.
    ///
    /// Returns whether the op was found.
    pub fn record_error(&mut self, id: &str, message: &str) -> Result<bool> {
        let Some(op) = self.ops.iter_mut().find(|op| op.id == id) else {
            return Ok(false);
        };
        op.last_error = Some(message.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Copy of the queue contents at call time, in order.
    pub fn snapshot(&self) -> Vec<PendingOp> {
        self.ops.clone()
    }

    /// Look up an op by id.
    pub fn get(&self, id: &str) -> Option<&PendingOp> {
        self.ops.iter().find(|op| op.id == id)
    }

    /// Check whether an op is still queued.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Oldest queued op, if any.
    pub fn front(&self) -> Option<&PendingOp> {
        self.ops.first()
    }

    /// Discard every queued op. Returns how many were dropped.
    pub fn clear(&mut self) -> Result<usize> {
        let dropped = self.ops.len();
        self.ops.clear();
        if let Some(path) = &self.path {
            // Truncate the file
            File::create(path)?.sync_all()?;
        }
        Ok(dropped)
    }

    /// Number of queued ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Rewrite the backing file from memory.
    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let tmp_path = temp_path(path);
        {
            let mut file = File::create(&tmp_path)?;
            for op in &self.ops {
                let json = serde_json::to_string(op)?;
                writeln!(file, "{}", json)?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load every record from a queue file.
///
/// A final line without a trailing newline that fails to parse is treated as
/// a torn append and dropped. Any other bad line is an error.
fn read_records(path: &Path) -> Result<Vec<PendingOp>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let complete = contents.ends_with('\n');
    let lines: Vec<&str> = contents.lines().collect();
    let last = lines.len();
    let mut ops = Vec::with_capacity(last);

    for (index, line) in lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<PendingOp>(line) {
            Ok(op) => ops.push(op),
            Err(e) if index + 1 == last && !complete => {
                tracing::warn!(
                    "dropping torn record at end of {}: {}",
                    path.display(),
                    e
                );
            }
            Err(e) => {
                return Err(Error::CorruptedRecord {
                    line: index + 1,
                    reason: e.to_string(),
                })
            }
        }
    }

    Ok(ops)
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
