// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! floor-core: Shared library for the floorsync engine
//!
//! This crate provides the pending operation model, the durable offline
//! queue, the retry policy, and the backend wire messages used by the sync
//! engine and the `floorsync` CLI.

pub mod error;
pub mod op;
pub mod policy;
pub mod protocol;
pub mod queue;
pub mod status;

pub use error::{Error, Result};
pub use op::{OpId, OpKind, PendingOp, DEFAULT_MAX_ATTEMPTS};
pub use policy::SyncPolicy;
pub use queue::OfflineQueue;
pub use status::{ErrorRecord, RecentErrors, SyncStatus};
