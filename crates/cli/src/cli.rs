// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  floorsync enqueue create_order '{\"id\":\"o1\",\"table_id\":4}'
  floorsync status              Show queue and backend reachability
  floorsync sync                Run one sync pass now
  floorsync run                 Keep syncing until Ctrl-C";

#[derive(Parser, Debug)]
#[command(name = "floorsync", version)]
#[command(about = "Offline write queue and sync engine for the floor app")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Path to the config file (default: ./floorsync.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append a write to the durable queue
    #[command(after_help = "Examples:\n  \
        floorsync enqueue add_item '{\"order_id\":\"o1\",\"menu_item_id\":\"m7\",\"qty\":2}'\n  \
        floorsync enqueue close_order '{\"id\":\"o1\"}' --max-attempts 5")]
    Enqueue {
        /// Operation kind (create_order, add_item, update_item, close_order, update_table)
        kind: String,

        /// Payload as a JSON object
        payload: String,

        /// Retry budget for this operation (default from config)
        #[arg(long)]
        max_attempts: Option<u32>,
    },

    /// Show queue length, backend reachability and the oldest operation
    Status {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// List pending operations, oldest first
    List {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Run one sync pass and print the result
    Sync {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Discard every pending operation
    Clear {
        /// Confirm discarding the queue
        #[arg(long)]
        yes: bool,
    },

    /// Keep syncing in the foreground until interrupted
    Run,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
