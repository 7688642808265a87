// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The drain loop.
//!
//! A pass walks a snapshot of the queue, in order, one op at a time:
//!
//! 1. Ops removed since the snapshot (by `clear`) are skipped.
//! 2. Ops whose retry budget is already spent are abandoned.
//! 3. Otherwise the attempt counter is bumped and the executor runs.
//! 4. Success removes the op and paces the next one by the inter-op delay.
//! 5. A network failure ends the pass; everything not yet visited stays put.
//! 6. Any other failure backs off, then the pass moves on. An op that has
//!    just spent its last attempt is abandoned instead.
//!
//! Only one pass runs at a time. A request that arrives while a pass is
//! running returns [`PassOutcome::Busy`] without waiting. Ops enqueued during
//! a pass are left for the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use floor_core::{
    ErrorRecord, OfflineQueue, OpId, OpKind, PendingOp, RecentErrors, SyncPolicy, SyncStatus,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::connectivity::ConnectivityMonitor;
use crate::executor::ExecutorRegistry;

/// Counts for one completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Ops in the snapshot the pass started from.
    pub snapshot: usize,
    /// Executor invocations.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Ops dropped for exhausting their retry budget.
    pub abandoned: usize,
    /// The pass stopped early on a network failure.
    pub aborted: bool,
}

/// Result of asking for a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Another pass was already running.
    Busy,
    /// The engine is offline; nothing was attempted.
    Offline,
    /// A pass ran to the end of its snapshot or aborted.
    Completed(PassReport),
}

/// Notifications for callers that want more than the aggregate status.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// An op was dropped after exhausting its retry budget.
    Abandoned(PendingOp),
    /// A pass finished.
    PassFinished(PassReport),
    /// Connectivity changed.
    ConnectivityChanged(bool),
}

/// What to do after processing one op.
enum Step {
    Continue(Duration),
    Abort,
}

/// Owns the queue and runs single-flight drain passes over it.
pub struct Orchestrator {
    queue: Mutex<OfflineQueue>,
    registry: ExecutorRegistry,
    monitor: Arc<ConnectivityMonitor>,
    policy: SyncPolicy,
    syncing: AtomicBool,
    last_sync: Mutex<Option<DateTime<Utc>>>,
    recent_errors: Mutex<RecentErrors>,
    events: broadcast::Sender<SyncEvent>,
}

/// Clears the single-flight flag on every exit path.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Orchestrator {
    pub fn new(
        queue: OfflineQueue,
        registry: ExecutorRegistry,
        monitor: Arc<ConnectivityMonitor>,
        policy: SyncPolicy,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Orchestrator {
            queue: Mutex::new(queue.with_default_max_attempts(policy.default_max_attempts)),
            registry,
            monitor,
            recent_errors: Mutex::new(RecentErrors::new(policy.recent_errors)),
            policy,
            syncing: AtomicBool::new(false),
            last_sync: Mutex::new(None),
            events,
        }
    }

    fn queue(&self) -> MutexGuard<'_, OfflineQueue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    /// Append an op to the queue. Does not start a pass.
    pub fn enqueue(
        &self,
        kind: OpKind,
        payload: Value,
        max_attempts: Option<u32>,
    ) -> floor_core::Result<OpId> {
        let id = self.queue().enqueue(kind, payload, max_attempts)?;
        tracing::debug!("queued {} op {}", kind, id);
        Ok(id)
    }

    /// Drop every queued op. Returns how many were dropped.
    pub fn clear(&self) -> floor_core::Result<usize> {
        let dropped = self.queue().clear()?;
        tracing::info!("cleared {} pending ops", dropped);
        Ok(dropped)
    }

    /// Queue contents right now.
    pub fn snapshot(&self) -> Vec<PendingOp> {
        self.queue().snapshot()
    }

    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            online: self.monitor.is_online(),
            syncing: self.is_syncing(),
            pending: self.pending(),
            last_sync_time: self.last_sync_time(),
        }
    }

    /// Recent failures, oldest first.
    pub fn recent_errors(&self) -> Vec<ErrorRecord> {
        self.recent_errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .to_vec()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SyncEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Run one pass over the current queue.
    pub async fn drain(&self) -> PassOutcome {
        if !self.monitor.is_online() {
            tracing::debug!("offline, skipping pass");
            return PassOutcome::Offline;
        }

        // Every pass that takes the guard ends with `PassFinished`
        let Some(guard) = PassGuard::acquire(&self.syncing) else {
            tracing::debug!("pass already running, request ignored");
            return PassOutcome::Busy;
        };

        let snapshot = self.snapshot();
        let total = snapshot.len();
        let mut report = PassReport {
            snapshot: total,
            ..PassReport::default()
        };

        for (index, op) in snapshot.into_iter().enumerate() {
            let is_last = index + 1 == total;
            match self.process(op, &mut report).await {
                Step::Continue(delay) => {
                    if !is_last && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Step::Abort => {
                    report.aborted = true;
                    break;
                }
            }
        }

        *self.last_sync.lock().unwrap_or_else(|e| e.into_inner()) = Some(Utc::now());
        drop(guard);

        if total > 0 {
            tracing::info!(
                "sync pass: {} attempted, {} succeeded, {} failed, {} abandoned{}",
                report.attempted,
                report.succeeded,
                report.failed,
                report.abandoned,
                if report.aborted { " (aborted: offline)" } else { "" }
            );
        }
        self.emit(SyncEvent::PassFinished(report.clone()));
        PassOutcome::Completed(report)
    }

    async fn process(&self, op: PendingOp, report: &mut PassReport) -> Step {
        // The snapshot may be stale; read the live record
        let Some(current) = self.queue().get(&op.id).cloned() else {
            return Step::Continue(Duration::ZERO);
        };

        if current.is_exhausted() {
            self.abandon(current, report);
            return Step::Continue(Duration::ZERO);
        }

        let Some(attempt) = self.bump_attempt(&current.id) else {
            return Step::Continue(Duration::ZERO);
        };
        report.attempted += 1;
        tracing::debug!(
            "attempt {}/{} of {} op {}",
            attempt,
            current.max_attempts,
            current.kind,
            current.id
        );

        match self
            .registry
            .invoke(current.kind, current.payload.clone())
            .await
        {
            Ok(()) => {
                report.succeeded += 1;
                if let Err(e) = self.queue().remove(&current.id) {
                    tracing::warn!("failed to persist removal of op {}: {}", current.id, e);
                }
                Step::Continue(self.policy.inter_op_delay)
            }
            Err(err) => {
                report.failed += 1;
                let message = err.to_string();
                tracing::warn!(
                    "{} op {} failed (attempt {}/{}): {}",
                    current.kind,
                    current.id,
                    attempt,
                    current.max_attempts,
                    message
                );

                if let Err(e) = self.queue().record_error(&current.id, &message) {
                    tracing::warn!("failed to persist error of op {}: {}", current.id, e);
                }
                let failed = PendingOp {
                    attempt_count: attempt,
                    last_error: Some(message.clone()),
                    ..current
                };
                self.recent_errors
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(failed.clone(), message);

                if err.is_network() {
                    Step::Abort
                } else if failed.is_exhausted() {
                    self.abandon(failed, report);
                    Step::Continue(Duration::ZERO)
                } else {
                    Step::Continue(self.policy.backoff(attempt))
                }
            }
        }
    }

    fn bump_attempt(&self, id: &str) -> Option<u32> {
        let mut queue = self.queue();
        match queue.bump_attempt(id) {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("failed to persist attempt of op {}: {}", id, e);
                queue.get(id).map(|op| op.attempt_count)
            }
        }
    }

    /// Drop an op whose retry budget is spent.
    ///
    /// Only logged and broadcast; the error log is left alone.
    fn abandon(&self, op: PendingOp, report: &mut PassReport) {
        if let Err(e) = self.queue().remove(&op.id) {
            tracing::warn!("failed to persist removal of op {}: {}", op.id, e);
        }
        report.abandoned += 1;
        tracing::warn!(
            "abandoning {} op {} after {} attempts{}",
            op.kind,
            op.id,
            op.attempt_count,
            op.last_error
                .as_deref()
                .map(|e| format!(": {}", e))
                .unwrap_or_default()
        );
        self.emit(SyncEvent::Abandoned(op));
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("pending", &self.pending())
            .field("syncing", &self.is_syncing())
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
