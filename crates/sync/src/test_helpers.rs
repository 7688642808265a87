// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use floor_core::protocol::TableAction;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::connectivity::{ConnectivityProbe, ProbeFuture};
use crate::executor::{ExecError, ExecFuture, ExecResult, Executor};
use crate::transport::{TableClient, TableFuture};

/// Probe whose answer is set by the test.
#[derive(Clone)]
pub struct FlagProbe {
    state: Arc<Mutex<Result<bool, String>>>,
}

impl FlagProbe {
    pub fn new(online: bool) -> Self {
        FlagProbe {
            state: Arc::new(Mutex::new(Ok(online))),
        }
    }

    pub fn set(&self, online: bool) {
        *self.state.lock().unwrap() = Ok(online);
    }

    pub fn fail_with(&self, message: &str) {
        *self.state.lock().unwrap() = Err(message.to_string());
    }
}

impl ConnectivityProbe for FlagProbe {
    fn check(&self) -> ProbeFuture<'_> {
        let state = self.state.lock().unwrap().clone();
        Box::pin(async move { state.map_err(io::Error::other) })
    }
}

/// Executor that records payloads and replays scripted results.
///
/// Unscripted calls succeed. With a gate, each call waits for a permit
/// before returning, so tests can hold a pass open.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    calls: Arc<Mutex<Vec<Value>>>,
    script: Arc<Mutex<VecDeque<ExecResult<()>>>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor whose calls block until [`release`](Self::release).
    pub fn gated() -> Self {
        ScriptedExecutor {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Queue the results of the next calls, in order.
    pub fn script(&self, results: impl IntoIterator<Item = ExecResult<()>>) -> &Self {
        self.script.lock().unwrap().extend(results);
        self
    }

    /// Let `n` blocked or future calls complete.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until at least `n` calls have started.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, payload: Value) -> ExecFuture<'_> {
        self.calls.lock().unwrap().push(payload);
        Box::pin(async move {
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
        })
    }
}

type Calls = Arc<Mutex<Vec<(String, TableAction)>>>;

/// In-memory table client: records calls, serves fetches from seeded rows.
#[derive(Clone, Default)]
pub struct MockTableClient {
    calls: Calls,
    rows: Arc<Mutex<HashMap<(String, String), Value>>>,
    failure: Arc<Mutex<Option<ExecError>>>,
}

impl MockTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_row(&self, table: &str, key: &str, row: Value) {
        self.rows
            .lock()
            .unwrap()
            .insert((table.to_string(), key.to_string()), row);
    }

    /// Make every following call fail with `err`.
    pub fn fail_with(&self, err: ExecError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<(String, TableAction)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TableClient for MockTableClient {
    fn call(&self, table: &str, action: TableAction) -> TableFuture<'_> {
        self.calls
            .lock()
            .unwrap()
            .push((table.to_string(), action.clone()));
        let failure = self.failure.lock().unwrap().clone();
        let row = match &action {
            TableAction::Fetch { key } => self
                .rows
                .lock()
                .unwrap()
                .get(&(table.to_string(), key.clone()))
                .cloned(),
            _ => None,
        };
        Box::pin(async move {
            match failure {
                Some(err) => Err(err),
                None => Ok(row),
            }
        })
    }
}
