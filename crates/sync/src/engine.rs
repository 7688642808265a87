// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine handle: wires triggers to the orchestrator.
//!
//! Three background tasks run between [`SyncEngine::start`] and
//! [`SyncEngine::stop`]:
//!
//! - a timer that requests a pass every `sync_interval`
//! - a listener that requests a pass on every offline to online transition
//! - a probe poller, when the monitor has a probe and polling is enabled
//!
//! All of them go through [`Orchestrator::drain`], whose single-flight flag
//! absorbs overlapping requests. Passes started in the background are
//! tracked, and [`SyncEngine::stop`] waits for them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use floor_core::{ErrorRecord, OfflineQueue, OpId, OpKind, PendingOp, SyncPolicy, SyncStatus};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::connectivity::ConnectivityMonitor;
use crate::executor::ExecutorRegistry;
use crate::orchestrator::{Orchestrator, PassOutcome, PassReport, SyncEvent};

/// Where a submitted write ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// Applied remotely right away.
    Applied,
    /// Queued for a later pass.
    Queued(OpId),
}

struct Running {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Shared handle to the sync engine.
pub struct SyncEngine {
    orchestrator: Arc<Orchestrator>,
    monitor: Arc<ConnectivityMonitor>,
    poll_interval: Option<Duration>,
    running: Mutex<Option<Running>>,
    drains: TaskTracker,
    /// Runtime for background passes requested from sync code.
    runtime: Mutex<Option<Handle>>,
}

impl SyncEngine {
    pub fn new(
        queue: OfflineQueue,
        registry: ExecutorRegistry,
        monitor: Arc<ConnectivityMonitor>,
        policy: SyncPolicy,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            queue,
            registry,
            Arc::clone(&monitor),
            policy,
        ));
        SyncEngine {
            orchestrator,
            monitor,
            poll_interval: None,
            running: Mutex::new(None),
            drains: TaskTracker::new(),
            runtime: Mutex::new(Handle::try_current().ok()),
        }
    }

    /// Poll the monitor's probe every `interval` while running.
    pub fn with_probe_polling(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Seed connectivity and start the background tasks.
    ///
    /// Does nothing if already running. Ops restored from disk are drained
    /// right away when online.
    pub async fn start(&self) {
        if self.is_running() {
            tracing::debug!("sync engine already running");
            return;
        }

        if let Ok(handle) = Handle::try_current() {
            *self.runtime.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        }
        let online = self.monitor.refresh().await;
        let cancel = CancellationToken::new();
        // Subscribe before spawning so no transition is missed
        let transitions = self.monitor.subscribe();
        let mut tasks = vec![
            tokio::spawn(connectivity_task(
                Arc::clone(&self.orchestrator),
                self.drains.clone(),
                transitions,
                cancel.clone(),
            )),
            tokio::spawn(timer_task(
                Arc::clone(&self.orchestrator),
                self.drains.clone(),
                cancel.clone(),
            )),
        ];
        if let Some(interval) = self.poll_interval.filter(|_| self.monitor.has_probe()) {
            let monitor = Arc::clone(&self.monitor);
            let token = cancel.clone();
            tasks.push(tokio::spawn(async move {
                monitor.poll(interval, token).await;
            }));
        }

        {
            let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
            if running.is_some() {
                // Lost a race with a concurrent start
                cancel.cancel();
                return;
            }
            *running = Some(Running { cancel, tasks });
        }

        tracing::info!(
            "sync engine started ({}, {} pending)",
            if online { "online" } else { "offline" },
            self.orchestrator.pending()
        );
        if online && self.orchestrator.pending() > 0 {
            self.request_drain();
        }
    }

    /// Stop the background tasks and wait for them to exit.
    ///
    /// Background passes already in flight run to completion before this
    /// returns.
    pub async fn stop(&self) {
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(running) = running {
            running.cancel.cancel();
            for task in running.tasks {
                if let Err(e) = task.await {
                    tracing::warn!("sync task ended abnormally: {}", e);
                }
            }
            tracing::info!("sync engine stopped");
        }

        if !self.drains.is_empty() {
            tracing::debug!("waiting for {} background pass(es)", self.drains.len());
        }
        self.drains.close();
        self.drains.wait().await;
        self.drains.reopen();
    }

    /// Queue an op; request a pass when online.
    pub fn enqueue(&self, kind: OpKind, payload: Value) -> floor_core::Result<OpId> {
        self.enqueue_inner(kind, payload, None)
    }

    /// Queue an op with its own retry budget; request a pass when online.
    pub fn enqueue_with_max_attempts(
        &self,
        kind: OpKind,
        payload: Value,
        max_attempts: u32,
    ) -> floor_core::Result<OpId> {
        self.enqueue_inner(kind, payload, Some(max_attempts))
    }

    fn enqueue_inner(
        &self,
        kind: OpKind,
        payload: Value,
        max_attempts: Option<u32>,
    ) -> floor_core::Result<OpId> {
        let id = self.orchestrator.enqueue(kind, payload, max_attempts)?;
        if self.monitor.is_online() {
            self.request_drain();
        }
        Ok(id)
    }

    /// Apply a write now if online, queue it otherwise.
    ///
    /// A failed direct attempt falls back to the queue. The fallback does
    /// not request a pass, so the op waits for the next trigger.
    pub async fn submit(&self, kind: OpKind, payload: Value) -> floor_core::Result<Submitted> {
        if self.monitor.is_online() {
            match self
                .orchestrator
                .registry()
                .invoke(kind, payload.clone())
                .await
            {
                Ok(()) => return Ok(Submitted::Applied),
                Err(e) => tracing::warn!("direct {} write failed, queueing: {}", kind, e),
            }
        }
        let id = self.orchestrator.enqueue(kind, payload, None)?;
        Ok(Submitted::Queued(id))
    }

    /// Re-check connectivity, then run a pass.
    ///
    /// If the re-check itself brings the engine online, the transition
    /// listener may start a pass first; that pass is awaited and reported
    /// instead of [`PassOutcome::Busy`].
    pub async fn sync_now(&self) -> PassOutcome {
        let mut events = self.orchestrator.subscribe();
        let was_online = self.monitor.is_online();
        let online = self.monitor.refresh().await;
        match self.orchestrator.drain().await {
            PassOutcome::Busy if online && !was_online => match next_pass(&mut events).await {
                Some(report) => PassOutcome::Completed(report),
                None => PassOutcome::Busy,
            },
            outcome => outcome,
        }
    }

    /// Drop every queued op. Returns how many were dropped.
    pub fn clear_queue(&self) -> floor_core::Result<usize> {
        self.orchestrator.clear()
    }

    pub fn status(&self) -> SyncStatus {
        self.orchestrator.status()
    }

    pub fn pending_ops(&self) -> Vec<PendingOp> {
        self.orchestrator.snapshot()
    }

    pub fn recent_errors(&self) -> Vec<ErrorRecord> {
        self.orchestrator.recent_errors()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.orchestrator.subscribe()
    }

    /// Start a pass in the background without waiting for it.
    ///
    /// Called from a plain thread, the pass runs on the runtime the engine
    /// was created or started on. With neither, the op stays queued for the
    /// next trigger.
    pub fn request_drain(&self) {
        let runtime = Handle::try_current()
            .ok()
            .or_else(|| self.runtime.lock().unwrap_or_else(|e| e.into_inner()).clone());
        let Some(handle) = runtime else {
            tracing::debug!("no runtime, pass left for the next trigger");
            return;
        };
        let orchestrator = Arc::clone(&self.orchestrator);
        self.drains.spawn_on(
            async move {
                orchestrator.drain().await;
            },
            &handle,
        );
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        let running = self.running.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(running) = running.take() {
            running.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("orchestrator", &self.orchestrator)
            .field("monitor", &self.monitor)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Drain once per offline to online transition.
async fn connectivity_task(
    orchestrator: Arc<Orchestrator>,
    drains: TaskTracker,
    mut transitions: broadcast::Receiver<bool>,
    cancel: CancellationToken,
) {
    loop {
        let online = tokio::select! {
            _ = cancel.cancelled() => return,
            received = transitions.recv() => match received {
                Ok(online) => online,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("missed {} connectivity transitions", skipped);
                    orchestrator.monitor().is_online()
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
        };
        orchestrator.emit(SyncEvent::ConnectivityChanged(online));
        if online {
            tracing::debug!("back online, draining queue");
            spawn_drain(&orchestrator, &drains);
        }
    }
}

/// Drain every `sync_interval`. The first tick comes after one interval.
async fn timer_task(
    orchestrator: Arc<Orchestrator>,
    drains: TaskTracker,
    cancel: CancellationToken,
) {
    let period = orchestrator.policy().sync_interval;
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }
        if orchestrator.monitor().is_online() {
            spawn_drain(&orchestrator, &drains);
        }
    }
}

fn spawn_drain(orchestrator: &Arc<Orchestrator>, drains: &TaskTracker) {
    let orchestrator = Arc::clone(orchestrator);
    drains.spawn(async move {
        orchestrator.drain().await;
    });
}

/// Wait for the next `PassFinished` event. `None` if events were missed or
/// the sender is gone.
async fn next_pass(events: &mut broadcast::Receiver<SyncEvent>) -> Option<PassReport> {
    loop {
        match events.recv().await {
            Ok(SyncEvent::PassFinished(report)) => return Some(report),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
