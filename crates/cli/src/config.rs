// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Configuration is read from `floorsync.toml` (or the path given with
//! `--config`). A missing file means defaults everywhere; a present file may
//! set any subset of keys:
//! - `queue_path`: where the durable queue lives
//! - `[backend]`: WebSocket URL and per-request timeout
//! - `[sync]`: timer period, delays, retry budget, error log size
//! - `[connectivity]`: probe address, poll period, probe timeout

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use floor_core::{SyncPolicy, DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "floorsync.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the JSONL queue file.
    #[serde(default = "default_queue_path")]
    pub queue_path: PathBuf,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// WebSocket URL (`ws://` or `wss://`).
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Max time to wait for a response to one request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Drain loop timing and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_inter_op_delay_ms")]
    pub inter_op_delay_ms: u64,
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Retry budget for ops enqueued without one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Capacity of the recent error log.
    #[serde(default = "default_recent_errors")]
    pub recent_errors: usize,
}

/// Reachability probe settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// `host:port` to probe. Defaults to the backend URL's host and port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_addr: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_queue_path() -> PathBuf {
    PathBuf::from(".floorsync/queue.jsonl")
}

fn default_backend_url() -> String {
    "ws://127.0.0.1:7890".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_interval_secs() -> u64 {
    30
}

fn default_inter_op_delay_ms() -> u64 {
    500
}

fn default_base_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_recent_errors() -> usize {
    50
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: default_backend_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_secs: default_interval_secs(),
            inter_op_delay_ms: default_inter_op_delay_ms(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_attempts: default_max_attempts(),
            recent_errors: default_recent_errors(),
        }
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            probe_addr: None,
            poll_interval_ms: default_poll_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            queue_path: default_queue_path(),
            backend: BackendConfig::default(),
            sync: SyncConfig::default(),
            connectivity: ConnectivityConfig::default(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from `path`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        Self::parse(&content)
    }

    /// Parses and validates configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sync.max_attempts == 0 {
            return Err(Error::Config("sync.max_attempts must be at least 1".into()));
        }
        if self.sync.interval_secs == 0 {
            return Err(Error::Config("sync.interval_secs must be at least 1".into()));
        }
        let url = &self.backend.url;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "invalid backend URL '{}': must be ws:// or wss://",
                url
            )));
        }
        self.probe_addr()?;
        Ok(())
    }

    /// Timing and retry policy for the drain loop.
    pub fn policy(&self) -> SyncPolicy {
        SyncPolicy {
            inter_op_delay: Duration::from_millis(self.sync.inter_op_delay_ms),
            base_backoff: Duration::from_millis(self.sync.base_backoff_ms),
            max_backoff: Duration::from_millis(self.sync.max_backoff_ms),
            default_max_attempts: self.sync.max_attempts,
            sync_interval: Duration::from_secs(self.sync.interval_secs),
            recent_errors: self.sync.recent_errors,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.request_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.connectivity.poll_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity.probe_timeout_ms)
    }

    /// The `host:port` the connectivity probe dials.
    pub fn probe_addr(&self) -> Result<String> {
        match &self.connectivity.probe_addr {
            Some(addr) => Ok(addr.clone()),
            None => authority(&self.backend.url),
        }
    }

    /// Lock file guarding the queue against concurrent processes.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.queue_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }
}

/// `host:port` of a WebSocket URL, with the scheme's default port filled in.
fn authority(url: &str) -> Result<String> {
    let (rest, default_port) = if let Some(rest) = url.strip_prefix("wss://") {
        (rest, 443)
    } else if let Some(rest) = url.strip_prefix("ws://") {
        (rest, 80)
    } else {
        return Err(Error::Config(format!("cannot derive probe address from '{}'", url)));
    };
    let host_port = rest.split(['/', '?', '#']).next().unwrap_or_default();
    // Drop userinfo
    let host_port = host_port.rsplit('@').next().unwrap_or_default();
    if host_port.is_empty() {
        return Err(Error::Config(format!("backend URL '{}' has no host", url)));
    }
    let has_port = match host_port.rfind(':') {
        // IPv6 literals contain colons; a port follows the closing bracket
        Some(idx) => !host_port[idx..].contains(']'),
        None => false,
    };
    if has_port {
        Ok(host_port.to_string())
    } else {
        Ok(format!("{}:{}", host_port, default_port))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
