// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod enqueue;
pub mod list;
pub mod run;
pub mod status;
pub mod sync;

use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use floor_core::{OfflineQueue, PendingOp};
use floor_sync::{
    table_executors, ConnectivityMonitor, SyncEngine, TableClient, TcpProbe, WebSocketTableClient,
};

use crate::config::Config;
use crate::error::{Error, Result};

/// Take the exclusive lock that guards the queue file.
///
/// The lock is held until the returned file is dropped.
pub fn acquire_lock(lock_path: &Path) -> Result<fs::File> {
    use fs2::FileExt;

    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::QueueInUse(lock_path.to_path_buf()))?;
    Ok(file)
}

/// Open the durable queue named by the config.
pub fn open_queue(config: &Config) -> Result<OfflineQueue> {
    let queue = OfflineQueue::open(&config.queue_path)?;
    Ok(queue.with_default_max_attempts(config.sync.max_attempts))
}

/// Read the queued ops without opening the queue; a missing file is empty.
pub fn read_queue(config: &Config) -> Result<Vec<PendingOp>> {
    Ok(OfflineQueue::load_snapshot(&config.queue_path)?)
}

/// Probe-backed connectivity monitor for the configured backend.
pub fn build_monitor(config: &Config) -> Result<ConnectivityMonitor> {
    let probe = TcpProbe::new(config.probe_addr()?, config.probe_timeout());
    Ok(ConnectivityMonitor::with_probe(probe))
}

/// Wire an engine to the configured backend.
pub fn build_engine(config: &Config, queue: OfflineQueue) -> Result<SyncEngine> {
    let client: Arc<dyn TableClient> = Arc::new(WebSocketTableClient::new(
        config.backend.url.clone(),
        config.request_timeout(),
    ));
    let monitor = Arc::new(build_monitor(config)?);
    Ok(
        SyncEngine::new(queue, table_executors(client), monitor, config.policy())
            .with_probe_polling(config.poll_interval()),
    )
}

/// Drive `future` to completion on a fresh runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;
    Ok(rt.block_on(future))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
