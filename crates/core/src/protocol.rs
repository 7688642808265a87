// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire messages for the backend table protocol.
//!
//! The protocol is request/response over JSON text frames:
//! - Client sends one [`BackendRequest`] per table write or read
//! - Backend answers with a [`BackendResponse`] echoing the request id

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a request does to its table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TableAction {
    /// Insert a new row.
    Insert { row: Value },
    /// Update the row with the given primary key.
    Update { key: String, changes: Value },
    /// Read the row with the given primary key.
    Fetch { key: String },
}

/// Message sent from client to backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendRequest {
    /// Client-chosen id echoed in the response.
    pub id: u64,
    /// Target table.
    pub table: String,
    #[serde(flatten)]
    pub action: TableAction,
}

/// Message sent from backend to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendResponse {
    /// The request was applied. Carries the affected or fetched row, if any.
    Ok {
        id: u64,
        #[serde(default)]
        row: Option<Value>,
    },
    /// The backend rejected the request.
    Error { id: u64, message: String },
}

impl BackendRequest {
    /// Creates an Insert request.
    pub fn insert(id: u64, table: impl Into<String>, row: Value) -> Self {
        BackendRequest {
            id,
            table: table.into(),
            action: TableAction::Insert { row },
        }
    }

    /// Creates an Update request.
    pub fn update(id: u64, table: impl Into<String>, key: impl Into<String>, changes: Value) -> Self {
        BackendRequest {
            id,
            table: table.into(),
            action: TableAction::Update {
                key: key.into(),
                changes,
            },
        }
    }

    /// Creates a Fetch request.
    pub fn fetch(id: u64, table: impl Into<String>, key: impl Into<String>) -> Self {
        BackendRequest {
            id,
            table: table.into(),
            action: TableAction::Fetch { key: key.into() },
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl BackendResponse {
    /// Creates an Ok response.
    pub fn ok(id: u64, row: Option<Value>) -> Self {
        BackendResponse::Ok { id, row }
    }

    /// Creates an Error response.
    pub fn error(id: u64, message: impl Into<String>) -> Self {
        BackendResponse::Error {
            id,
            message: message.into(),
        }
    }

    /// The request id this response answers.
    pub fn request_id(&self) -> u64 {
        match self {
            BackendResponse::Ok { id, .. } | BackendResponse::Error { id, .. } => *id,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
