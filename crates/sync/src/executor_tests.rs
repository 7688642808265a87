// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the executor registry.

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::ScriptedExecutor;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    network = { ExecError::network("connection reset"), true },
    application = { ExecError::application("duplicate key"), false },
    unknown = { ExecError::UnknownKind(OpKind::AddItem), false },
)]
fn classification(err: ExecError, is_network: bool) {
    assert_eq!(err.is_network(), is_network);
}

#[test]
fn unknown_kind_is_distinguishable() {
    let err = ExecError::UnknownKind(OpKind::UpdateTable);
    assert!(err.to_string().contains("unknown operation kind"));
    assert!(err.to_string().contains("update_table"));
}

#[tokio::test]
async fn invoke_dispatches_by_kind() {
    let orders = ScriptedExecutor::new();
    let items = ScriptedExecutor::new();
    let registry = ExecutorRegistry::new()
        .with(OpKind::CreateOrder, orders.clone())
        .with(OpKind::AddItem, items.clone());

    registry
        .invoke(OpKind::AddItem, json!({"menu_item_id": "m-1"}))
        .await
        .unwrap();

    assert!(orders.calls().is_empty());
    assert_eq!(items.calls(), vec![json!({"menu_item_id": "m-1"})]);
}

#[tokio::test]
async fn invoke_unregistered_kind_fails() {
    let registry = ExecutorRegistry::new().with(OpKind::CreateOrder, ScriptedExecutor::new());

    let err = registry
        .invoke(OpKind::CloseOrder, json!({"id": "o-1"}))
        .await
        .unwrap_err();
    assert_eq!(err, ExecError::UnknownKind(OpKind::CloseOrder));
}

#[tokio::test]
async fn closures_are_executors() {
    let mut registry = ExecutorRegistry::new();
    registry.register(OpKind::UpdateTable, |payload: Value| async move {
        if payload.get("id").is_some() {
            Ok(())
        } else {
            Err(ExecError::application("missing id"))
        }
    });

    assert!(registry
        .invoke(OpKind::UpdateTable, json!({"id": "t-1"}))
        .await
        .is_ok());
    assert_eq!(
        registry.invoke(OpKind::UpdateTable, json!({})).await,
        Err(ExecError::application("missing id"))
    );
}

#[test]
fn kinds_lists_registered_in_order() {
    let registry = ExecutorRegistry::new()
        .with(OpKind::UpdateTable, ScriptedExecutor::new())
        .with(OpKind::CreateOrder, ScriptedExecutor::new());

    assert_eq!(
        registry.kinds(),
        vec![OpKind::CreateOrder, OpKind::UpdateTable]
    );
    assert!(!registry.contains(OpKind::AddItem));
}

#[tokio::test]
async fn register_replaces_existing() {
    let first = ScriptedExecutor::new();
    let second = ScriptedExecutor::new();
    let mut registry = ExecutorRegistry::new();
    registry.register(OpKind::AddItem, first.clone());
    registry.register(OpKind::AddItem, second.clone());

    registry.invoke(OpKind::AddItem, json!(1)).await.unwrap();
    assert!(first.calls().is_empty());
    assert_eq!(second.calls().len(), 1);
}
