// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline sync engine for the floor app.
//!
//! Writes made while the device is offline are queued and replayed against
//! the backend once connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  SyncEngine  │────►│ Orchestrator │────►│  Executors   │
//! │  (triggers)  │     │ (drain loop) │     │  (registry)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │                    │                    │
//!        ▼                    ▼                    ▼
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Connectivity │     │    Queue     │     │ TableClient  │
//! │   Monitor    │     │   (JSONL)    │     │ (WebSocket)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! # Features
//!
//! - Single-flight drain passes over a FIFO snapshot of the queue
//! - Exponential backoff for rejected writes, abort on network loss
//! - Drain on reconnect, on a timer, and on demand
//! - Injectable probe, executors and table client for testing

pub mod connectivity;
pub mod engine;
pub mod executor;
pub mod orchestrator;
pub mod tables;
pub mod transport;

pub use connectivity::{ConnectivityMonitor, ConnectivityProbe, ProbeFuture, TcpProbe};
pub use engine::{Submitted, SyncEngine};
pub use executor::{ExecError, ExecFuture, ExecResult, Executor, ExecutorRegistry};
pub use orchestrator::{Orchestrator, PassOutcome, PassReport, SyncEvent};
pub use tables::{table_executors, TableExecutor};
pub use transport::{TableClient, TableFuture, TransportError, WebSocketTableClient};

#[cfg(test)]
mod test_helpers;
