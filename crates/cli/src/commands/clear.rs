// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{acquire_lock, open_queue};
use crate::config::Config;
use crate::error::{Error, Result};

pub fn run(config: &Config, yes: bool) -> Result<()> {
    let _lock = acquire_lock(&config.lock_path())?;
    let mut queue = open_queue(config)?;

    if queue.is_empty() {
        println!("no pending operations");
        return Ok(());
    }
    if !yes {
        return Err(Error::ConfirmationRequired(queue.len()));
    }

    let dropped = queue.clear()?;
    tracing::info!("discarded {} pending operations", dropped);
    println!("discarded {} pending operations", dropped);
    Ok(())
}
