// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitoring.
//!
//! The monitor owns the engine's online flag. State reaches it in one of two
//! ways: the embedding platform pushes it with [`ConnectivityMonitor::set_online`],
//! or the monitor asks a [`ConnectivityProbe`]. A probe that errors is read as
//! offline.
//!
//! Every observed transition is broadcast exactly once to subscribers with
//! the new value. Repeating the current state is not a transition.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Future returned by a probe check.
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = io::Result<bool>> + Send + 'a>>;

/// Source of truth for "can we reach the backend right now".
pub trait ConnectivityProbe: Send + Sync {
    /// Check connectivity once.
    fn check(&self) -> ProbeFuture<'_>;
}

/// Probe that opens (and immediately drops) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Probe `addr` (`host:port`), giving up after `timeout`.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        TcpProbe {
            addr: addr.into(),
            timeout,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl ConnectivityProbe for TcpProbe {
    fn check(&self) -> ProbeFuture<'_> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
                Ok(Ok(_stream)) => Ok(true),
                Ok(Err(e)) => Err(e),
                Err(_) => Ok(false),
            }
        })
    }
}

/// Tracks online/offline state and notifies on transitions.
pub struct ConnectivityMonitor {
    probe: Option<Arc<dyn ConnectivityProbe>>,
    online: AtomicBool,
    transitions: broadcast::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Monitor backed by a probe. Starts offline until the first check.
    pub fn with_probe(probe: impl ConnectivityProbe + 'static) -> Self {
        Self::build(Some(Arc::new(probe)), false)
    }

    /// Monitor whose state is only ever pushed by the platform.
    pub fn manual(initial: bool) -> Self {
        Self::build(None, initial)
    }

    fn build(probe: Option<Arc<dyn ConnectivityProbe>>, initial: bool) -> Self {
        let (transitions, _) = broadcast::channel(16);
        ConnectivityMonitor {
            probe,
            online: AtomicBool::new(initial),
            transitions,
        }
    }

    /// Last known state. Never blocks.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Ask the probe once, without recording the result.
    ///
    /// Without a probe this is the last pushed state.
    pub async fn current_status(&self) -> bool {
        let Some(probe) = &self.probe else {
            return self.is_online();
        };
        match probe.check().await {
            Ok(online) => online,
            Err(e) => {
                tracing::debug!("connectivity probe failed, treating as offline: {}", e);
                false
            }
        }
    }

    /// Check the probe and record the result. Returns the new state.
    pub async fn refresh(&self) -> bool {
        let online = self.current_status().await;
        self.set_online(online);
        online
    }

    /// Record a new state. Returns true if this was a transition.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::AcqRel);
        if previous == online {
            return false;
        }
        tracing::info!(
            "connectivity changed: {}",
            if online { "online" } else { "offline" }
        );
        // No subscribers is fine
        let _ = self.transitions.send(online);
        true
    }

    /// Receive every future transition.
    pub fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.transitions.subscribe()
    }

    /// Whether this monitor has a probe to poll.
    pub fn has_probe(&self) -> bool {
        self.probe.is_some()
    }

    /// Refresh on a fixed interval until cancelled.
    pub async fn poll(&self, interval: Duration, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(interval) => {}
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = self.refresh() => {}
            }
        }
    }
}

impl std::fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityMonitor")
            .field("online", &self.is_online())
            .field("probe", &self.probe.as_ref().map(|_| "<probe>"))
            .finish()
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
