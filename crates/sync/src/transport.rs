// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend table access.
//!
//! Provides a trait-based table client that enables:
//! - A WebSocket connection to the hosted backend for production
//! - Mock clients for unit testing
//!
//! Socket-level failures and timeouts surface as [`ExecError::Network`]; a
//! rejection by the backend, or a reply that does not decode, surfaces as
//! [`ExecError::Application`].

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use floor_core::protocol::{BackendRequest, BackendResponse, TableAction};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::executor::{ExecError, ExecResult};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// No response within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The backend answered with something that is not a response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Whether the socket is unusable after this error.
    pub fn breaks_connection(&self) -> bool {
        !matches!(
            self,
            TransportError::SerializationError(_) | TransportError::InvalidResponse(_)
        )
    }
}

impl From<TransportError> for ExecError {
    fn from(e: TransportError) -> Self {
        if e.breaks_connection() {
            ExecError::Network(e.to_string())
        } else {
            ExecError::Application(e.to_string())
        }
    }
}

/// Future returned by a table call. Resolves to the row the backend returned.
pub type TableFuture<'a> = Pin<Box<dyn Future<Output = ExecResult<Option<Value>>> + Send + 'a>>;

/// Access to the backend's remote tables.
pub trait TableClient: Send + Sync {
    /// Perform one action against `table`.
    fn call(&self, table: &str, action: TableAction) -> TableFuture<'_>;

    /// Insert a row.
    fn insert(&self, table: &str, row: Value) -> TableFuture<'_> {
        self.call(table, TableAction::Insert { row })
    }

    /// Update the row with primary key `key`.
    fn update(&self, table: &str, key: &str, changes: Value) -> TableFuture<'_> {
        self.call(
            table,
            TableAction::Update {
                key: key.to_string(),
                changes,
            },
        )
    }

    /// Read the row with primary key `key`.
    fn fetch(&self, table: &str, key: &str) -> TableFuture<'_> {
        self.call(
            table,
            TableAction::Fetch {
                key: key.to_string(),
            },
        )
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Internal WebSocket connection wrapper.
struct WebSocketConnection {
    sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
    stream: futures_util::stream::SplitStream<WsStream>,
}

/// Table client speaking the JSON request/response protocol over WebSocket.
///
/// Connects lazily on the first call and reconnects on the next call after
/// any transport failure. Calls are serialized on the single connection.
pub struct WebSocketTableClient {
    url: String,
    timeout: Duration,
    ws: Mutex<Option<WebSocketConnection>>,
    next_id: AtomicU64,
}

impl WebSocketTableClient {
    /// Create a client for `url`, with `timeout` bounding each call.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        WebSocketTableClient {
            url: url.into(),
            timeout,
            ws: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if a connection is currently open.
    pub async fn is_connected(&self) -> bool {
        self.ws.lock().await.is_some()
    }

    /// Close the connection, if open.
    pub async fn disconnect(&self) {
        if let Some(mut ws) = self.ws.lock().await.take() {
            use futures_util::SinkExt;
            let _ = ws.sink.close().await;
        }
    }

    async fn round_trip(
        &self,
        slot: &mut Option<WebSocketConnection>,
        request: &BackendRequest,
    ) -> Result<BackendResponse, TransportError> {
        use futures_util::{SinkExt, StreamExt};
        use tokio_tungstenite::tungstenite::Message;

        if slot.is_none() {
            let (ws_stream, _) = tokio_tungstenite::connect_async(self.url.as_str())
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            let (sink, stream) = ws_stream.split();
            *slot = Some(WebSocketConnection { sink, stream });
            tracing::debug!("connected to backend at {}", self.url);
        }
        let ws = slot.as_mut().ok_or(TransportError::ConnectionClosed)?;

        let json = request
            .to_json()
            .map_err(|e| TransportError::SerializationError(e.to_string()))?;
        ws.sink
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        loop {
            match ws.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    let response = BackendResponse::from_json(&text)
                        .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
                    if response.request_id() == request.id {
                        return Ok(response);
                    }
                    // Stale answer to an earlier, timed-out request
                    tracing::debug!("ignoring response for request {}", response.request_id());
                }
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::ConnectionClosed),
                Some(Ok(_)) => {
                    // Ignore ping/pong and binary frames
                    continue;
                }
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
            }
        }
    }
}

impl TableClient for WebSocketTableClient {
    fn call(&self, table: &str, action: TableAction) -> TableFuture<'_> {
        let request = BackendRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            table: table.to_string(),
            action,
        };
        Box::pin(async move {
            let mut slot = self.ws.lock().await;
            let result = match tokio::time::timeout(self.timeout, self.round_trip(&mut slot, &request)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(self.timeout)),
            };

            match result {
                Ok(BackendResponse::Ok { row, .. }) => Ok(row),
                Ok(BackendResponse::Error { message, .. }) => Err(ExecError::Application(message)),
                Err(e) => {
                    if e.breaks_connection() {
                        // Clear it so the next call reconnects
                        *slot = None;
                    }
                    Err(e.into())
                }
            }
        })
    }
}

impl std::fmt::Debug for WebSocketTableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTableClient")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
