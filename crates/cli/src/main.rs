// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use floorsync::logging::setup_logging;
use floorsync::Cli;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.log_file.as_deref());
    if let Err(e) = floorsync::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
