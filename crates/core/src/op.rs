// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending write operations.
//!
//! Every write the floor application makes while it cannot reach the backend
//! is captured as a [`PendingOp`]. An op carries the kind of write, the
//! caller's opaque payload, and its retry bookkeeping. Apart from the attempt
//! counter and the last error message, an op is never mutated after it has
//! been queued.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Opaque identifier assigned to an op at enqueue time.
pub type OpId = String;

/// Default retry budget for an op when the caller supplies none.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The kind of remote write an op performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Open a new order ticket.
    CreateOrder,
    /// Add a line item to an order.
    AddItem,
    /// Change an existing line item (quantity, notes, ...).
    UpdateItem,
    /// Close an order at checkout.
    CloseOrder,
    /// Change a table on the floor map (status, seats, ...).
    UpdateTable,
}

impl OpKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [OpKind; 5] = [
        OpKind::CreateOrder,
        OpKind::AddItem,
        OpKind::UpdateItem,
        OpKind::CloseOrder,
        OpKind::UpdateTable,
    ];

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::CreateOrder => "create_order",
            OpKind::AddItem => "add_item",
            OpKind::UpdateItem => "update_item",
            OpKind::CloseOrder => "close_order",
            OpKind::UpdateTable => "update_table",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept kebab-case too, since that is how the CLI spells things.
        let normalized = s.trim().to_lowercase().replace('-', "_");
        OpKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// One queued write waiting to be applied remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOp {
    /// Unique identifier (UUID v4).
    pub id: OpId,
    /// Which remote write to perform.
    pub kind: OpKind,
    /// Caller-supplied data; never inspected by the queue or orchestrator.
    pub payload: Value,
    /// When the op was queued.
    pub created_at: DateTime<Utc>,
    /// Attempts made so far. Incremented immediately before each attempt.
    pub attempt_count: u32,
    /// Attempts allowed before the op is abandoned.
    pub max_attempts: u32,
    /// Message from the most recent failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl PendingOp {
    /// Creates a fresh op with a new id and no attempts.
    pub fn new(kind: OpKind, payload: Value, max_attempts: u32) -> Self {
        PendingOp {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            payload,
            created_at: Utc::now(),
            attempt_count: 0,
            max_attempts,
            last_error: None,
        }
    }

    /// Returns true once the retry budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.attempt_count >= self.max_attempts
    }

    /// Attempts left before abandonment.
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempt_count)
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
