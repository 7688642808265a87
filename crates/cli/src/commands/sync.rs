// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use floor_core::ErrorRecord;
use floor_sync::PassOutcome;
use serde_json::json;

use super::{acquire_lock, block_on, build_engine, open_queue};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;

pub fn run(config: &Config, output: OutputFormat) -> Result<()> {
    let _lock = acquire_lock(&config.lock_path())?;
    let engine = build_engine(config, open_queue(config)?)?;

    let outcome = block_on(engine.sync_now())?;
    let pending = engine.status().pending;
    let errors = engine.recent_errors();

    println!("{}", render(&outcome, pending, &errors, output)?);
    Ok(())
}

pub fn render(
    outcome: &PassOutcome,
    pending: usize,
    errors: &[ErrorRecord],
    output: OutputFormat,
) -> Result<String> {
    if output == OutputFormat::Json {
        let value = match outcome {
            PassOutcome::Busy => json!({ "outcome": "busy", "pending": pending }),
            PassOutcome::Offline => json!({ "outcome": "offline", "pending": pending }),
            PassOutcome::Completed(report) => json!({
                "outcome": "completed",
                "report": report,
                "pending": pending,
                "errors": errors,
            }),
        };
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut lines = Vec::new();
    match outcome {
        PassOutcome::Busy => lines.push("sync already in progress".to_string()),
        PassOutcome::Offline => {
            lines.push(format!("offline: backend unreachable, {} pending", pending))
        }
        PassOutcome::Completed(report) => {
            lines.push(format!(
                "synced: {} attempted, {} succeeded, {} failed, {} abandoned; {} pending",
                report.attempted, report.succeeded, report.failed, report.abandoned, pending
            ));
            if report.aborted {
                lines.push("aborted: lost connection to backend".to_string());
            }
            for record in errors {
                lines.push(format!(
                    "  {} {}: {}",
                    record.op.kind, record.op.id, record.message
                ));
            }
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
