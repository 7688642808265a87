// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use floor_core::PendingOp;

use super::read_queue;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;

pub fn run(config: &Config, output: OutputFormat) -> Result<()> {
    let ops = read_queue(config)?;
    println!("{}", render(&ops, output)?);
    Ok(())
}

pub fn render(ops: &[PendingOp], output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(ops)?),
        OutputFormat::Text => {
            if ops.is_empty() {
                return Ok("no pending operations".to_string());
            }
            Ok(ops.iter().map(format_op).collect::<Vec<_>>().join("\n"))
        }
    }
}

/// One line per op: id, kind, attempts used, queue time, last error.
pub fn format_op(op: &PendingOp) -> String {
    let mut line = format!(
        "{}  {:<12}  {}/{}  {}",
        op.id,
        op.kind.as_str(),
        op.attempt_count,
        op.max_attempts,
        op.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(err) = &op.last_error {
        line.push_str("  last error: ");
        line.push_str(err);
    }
    line
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
