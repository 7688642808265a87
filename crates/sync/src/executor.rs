// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Executor registry: one remote write per operation kind.
//!
//! Executors report failures as a typed [`ExecError`], so the drain loop
//! decides between "abort the pass" and "back off and move on" from the
//! variant alone.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use floor_core::OpKind;
use serde_json::Value;

/// Failure of a single remote write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    /// Transport or timeout failure. The backend may be unreachable.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered and rejected the write.
    #[error("{0}")]
    Application(String),

    /// No executor is registered for this kind.
    #[error("unknown operation kind: {0} (no executor registered)")]
    UnknownKind(OpKind),
}

impl ExecError {
    /// Creates a Network error.
    pub fn network(msg: impl Into<String>) -> Self {
        ExecError::Network(msg.into())
    }

    /// Creates an Application error.
    pub fn application(msg: impl Into<String>) -> Self {
        ExecError::Application(msg.into())
    }

    /// True for failures that mean the backend could not be reached.
    pub fn is_network(&self) -> bool {
        matches!(self, ExecError::Network(_))
    }
}

/// Result type for executor calls.
pub type ExecResult<T> = Result<T, ExecError>;

/// Future returned by an executor.
pub type ExecFuture<'a> = Pin<Box<dyn Future<Output = ExecResult<()>> + Send + 'a>>;

/// Performs the remote write for one operation kind.
pub trait Executor: Send + Sync {
    /// Apply `payload` remotely.
    fn execute(&self, payload: Value) -> ExecFuture<'_>;
}

impl<F, Fut> Executor for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = ExecResult<()>> + Send + 'static,
{
    fn execute(&self, payload: Value) -> ExecFuture<'_> {
        Box::pin(self(payload))
    }
}

/// Dispatch table from kind to executor.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<OpKind, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the executor for `kind`.
    pub fn register(&mut self, kind: OpKind, executor: impl Executor + 'static) -> &mut Self {
        self.executors.insert(kind, Arc::new(executor));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, kind: OpKind, executor: impl Executor + 'static) -> Self {
        self.register(kind, executor);
        self
    }

    /// Whether `kind` has an executor.
    pub fn contains(&self, kind: OpKind) -> bool {
        self.executors.contains_key(&kind)
    }

    /// Registered kinds, in [`OpKind::ALL`] order.
    pub fn kinds(&self) -> Vec<OpKind> {
        OpKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    /// Run the executor for `kind`.
    pub async fn invoke(&self, kind: OpKind, payload: Value) -> ExecResult<()> {
        let executor = self
            .executors
            .get(&kind)
            .ok_or(ExecError::UnknownKind(kind))?;
        executor.execute(payload).await
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
