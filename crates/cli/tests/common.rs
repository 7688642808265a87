// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn floorsync() -> Command {
    cargo_bin_cmd!("floorsync")
}

/// A temp directory with a `floorsync.toml` pointing at `backend_url`.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    /// Backend on the discard port, where nothing listens.
    pub fn offline() -> Self {
        Self::with_backend("ws://127.0.0.1:9")
    }

    pub fn with_backend(url: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let config = format!(
            "queue_path = \"queue/pending.jsonl\"\n\n\
             [backend]\nurl = \"{}\"\nrequest_timeout_ms = 2000\n\n\
             [sync]\ninter_op_delay_ms = 0\nbase_backoff_ms = 0\nmax_backoff_ms = 0\n\n\
             [connectivity]\nprobe_timeout_ms = 500\n",
            url
        );
        std::fs::write(temp.path().join("floorsync.toml"), config).unwrap();
        Workspace { temp }
    }

    /// `floorsync` running inside the workspace.
    pub fn cmd(&self) -> Command {
        let mut cmd = floorsync();
        cmd.current_dir(self.temp.path());
        cmd
    }

    pub fn queue_path(&self) -> PathBuf {
        self.temp.path().join("queue").join("pending.jsonl")
    }

    /// Enqueue an op and return its id.
    pub fn enqueue(&self, kind: &str, payload: &str) -> String {
        let output = self
            .cmd()
            .args(["enqueue", kind, payload])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "enqueue failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Parsed `list -o json`.
    pub fn pending(&self) -> Vec<serde_json::Value> {
        let output = self.cmd().args(["list", "-o", "json"]).output().unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    }
}
