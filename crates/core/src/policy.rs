// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pacing and retry policy for draining the queue.

use std::time::Duration;

use crate::op::DEFAULT_MAX_ATTEMPTS;

/// Timing and retry constants used by the drain loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Pause after a successful attempt before the next op.
    pub inter_op_delay: Duration,
    /// Backoff for attempt 0; doubled per attempt.
    pub base_backoff: Duration,
    /// Upper bound on any single backoff.
    pub max_backoff: Duration,
    /// Retry budget given to ops enqueued without one.
    pub default_max_attempts: u32,
    /// Period of the background drain timer.
    pub sync_interval: Duration,
    /// Capacity of the recent error log.
    pub recent_errors: usize,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        SyncPolicy {
            inter_op_delay: Duration::from_millis(500),
            base_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(30_000),
            default_max_attempts: DEFAULT_MAX_ATTEMPTS,
            sync_interval: Duration::from_secs(30),
            recent_errors: 50,
        }
    }
}

impl SyncPolicy {
    /// A policy with every delay set to zero. Intended for tests.
    pub fn immediate() -> Self {
        SyncPolicy {
            inter_op_delay: Duration::ZERO,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            ..SyncPolicy::default()
        }
    }

    /// Backoff after a failed attempt: `min(base * 2^attempts, max)`.
    ///
    /// Saturates instead of overflowing, so large attempt counts yield
    /// `max_backoff`.
    pub fn backoff(&self, attempts: u32) -> Duration {
        let base_ms = u64::try_from(self.base_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        let factor = 1u64.checked_shl(attempts).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
