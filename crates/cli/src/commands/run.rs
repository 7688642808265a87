// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use floor_sync::{SyncEngine, SyncEvent};
use tokio::sync::broadcast::error::RecvError;

use super::{acquire_lock, block_on, build_engine, open_queue};
use crate::config::Config;
use crate::error::Result;

pub fn run(config: &Config) -> Result<()> {
    let _lock = acquire_lock(&config.lock_path())?;
    let engine = build_engine(config, open_queue(config)?)?;
    tracing::info!(
        "syncing {} against {} (Ctrl-C to stop)",
        config.queue_path.display(),
        config.backend.url
    );
    block_on(run_until_interrupted(&engine))?;
    Ok(())
}

async fn run_until_interrupted(engine: &SyncEngine) {
    let mut events = engine.subscribe();
    engine.start().await;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::warn!("cannot listen for Ctrl-C: {}", e);
                }
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = describe(&event) {
                        println!("{} {}", Utc::now().format("%H:%M:%S"), line);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("missed {} sync events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    engine.stop().await;
}

/// Operator-facing line for an event. Empty passes are not worth a line.
pub fn describe(event: &SyncEvent) -> Option<String> {
    match event {
        SyncEvent::ConnectivityChanged(true) => Some("online".to_string()),
        SyncEvent::ConnectivityChanged(false) => Some("offline".to_string()),
        SyncEvent::Abandoned(op) => Some(format!(
            "dropped {} {} after {} attempts",
            op.kind, op.id, op.attempt_count
        )),
        SyncEvent::PassFinished(report) if report.snapshot > 0 => Some(format!(
            "pass: {} succeeded, {} failed, {} abandoned{}",
            report.succeeded,
            report.failed,
            report.abandoned,
            if report.aborted { ", aborted" } else { "" }
        )),
        SyncEvent::PassFinished(_) => None,
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
