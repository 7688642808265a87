// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use floor_core::{PendingOp, SyncStatus};
use serde::Serialize;

use super::{block_on, build_monitor, read_queue};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;

/// What `floorsync status` reports.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub status: SyncStatus,
    pub queue_path: String,
    pub backend: String,
    pub probe_addr: String,
    pub oldest: Option<PendingOp>,
}

pub fn run(config: &Config, output: OutputFormat) -> Result<()> {
    let ops = read_queue(config)?;
    let monitor = build_monitor(config)?;
    let online = block_on(monitor.refresh())?;

    let report = StatusReport {
        status: SyncStatus {
            online,
            syncing: false,
            pending: ops.len(),
            last_sync_time: None,
        },
        queue_path: config.queue_path.display().to_string(),
        backend: config.backend.url.clone(),
        probe_addr: config.probe_addr()?,
        oldest: ops.into_iter().next(),
    };
    println!("{}", render(&report, output)?);
    Ok(())
}

pub fn render(report: &StatusReport, output: OutputFormat) -> Result<String> {
    if output == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    let mut lines = vec![
        format!("Queue: {}", report.queue_path),
        format!("Pending: {}", report.status.pending),
        format!(
            "Backend: {} ({}, probed {})",
            report.backend,
            if report.status.online {
                "reachable"
            } else {
                "unreachable"
            },
            report.probe_addr
        ),
    ];
    if let Some(op) = &report.oldest {
        lines.push(format!(
            "Oldest: {} {} queued {}, attempts {}/{}",
            op.kind,
            op.id,
            op.created_at.format("%Y-%m-%d %H:%M:%S"),
            op.attempt_count,
            op.max_attempts
        ));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
