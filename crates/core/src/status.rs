// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only views of the sync state for display.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::op::PendingOp;

/// Projection of the engine state shown in badges and banners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Last known connectivity.
    pub online: bool,
    /// Whether a drain pass is running right now.
    pub syncing: bool,
    /// Number of queued ops.
    pub pending: usize,
    /// End of the most recent pass that reached the queue.
    pub last_sync_time: Option<DateTime<Utc>>,
}

/// One failed attempt, kept for observability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The op as it was when the attempt failed.
    pub op: PendingOp,
    /// Failure message.
    pub message: String,
    /// When the failure was observed.
    pub at: DateTime<Utc>,
}

/// Bounded log of recent failures. The oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct RecentErrors {
    entries: VecDeque<ErrorRecord>,
    capacity: usize,
}

impl RecentErrors {
    pub fn new(capacity: usize) -> Self {
        RecentErrors {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    pub fn push(&mut self, op: PendingOp, message: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ErrorRecord {
            op,
            message: message.into(),
            at: Utc::now(),
        });
    }

    /// Entries from oldest to newest.
    pub fn to_vec(&self) -> Vec<ErrorRecord> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
