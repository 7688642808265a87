// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! floorsync - command line front end for the floor app's offline sync engine.
//!
//! Operators and tests use it to inspect and drive the durable write queue
//! the app replays against the backend.
//!
//! # Main Components
//!
//! - [`Config`] - `floorsync.toml`: queue location, backend, timing, probe
//! - [`Cli`] - the `floorsync` command line
//! - [`Error`] - Error types for all commands
//!
//! The engine itself lives in `floor-sync`; the data model and queue in
//! `floor-core`.

mod commands;

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

use std::path::PathBuf;

pub use cli::{Cli, Command, OutputFormat};
pub use config::{Config, CONFIG_FILE_NAME};
pub use error::{Error, Result};

/// Load the configuration named on the command line.
///
/// An explicit `--config` must exist; the default path may be absent.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) if !path.exists() => Err(Error::Config(format!(
            "config file not found: {}",
            path.display()
        ))),
        Some(path) => Config::load(&path),
        None => Config::load(&PathBuf::from(CONFIG_FILE_NAME)),
    }
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config)?;
    execute(&config, cli.command)
}

/// Execute a command against an already loaded configuration.
pub fn execute(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Enqueue {
            kind,
            payload,
            max_attempts,
        } => commands::enqueue::run(config, &kind, &payload, max_attempts),
        Command::Status { output } => commands::status::run(config, output),
        Command::List { output } => commands::list::run(config, output),
        Command::Sync { output } => commands::sync::run(config, output),
        Command::Clear { yes } => commands::clear::run(config, yes),
        Command::Run => commands::run::run(config),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
