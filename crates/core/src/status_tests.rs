// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::op::OpKind;
use serde_json::json;

fn op(n: u32) -> PendingOp {
    PendingOp::new(OpKind::UpdateItem, json!({ "id": format!("i-{}", n) }), 3)
}

#[test]
fn recent_errors_keeps_order() {
    let mut log = RecentErrors::new(10);
    log.push(op(1), "first");
    log.push(op(2), "second");

    let entries = log.to_vec();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "first");
    assert_eq!(entries[1].message, "second");
}

#[test]
fn recent_errors_evicts_oldest() {
    let mut log = RecentErrors::new(3);
    for n in 0..5 {
        log.push(op(n), format!("failure {}", n));
    }

    let messages: Vec<_> = log.to_vec().into_iter().map(|e| e.message).collect();
    assert_eq!(messages, vec!["failure 2", "failure 3", "failure 4"]);
}

#[test]
fn recent_errors_zero_capacity_records_nothing() {
    let mut log = RecentErrors::new(0);
    log.push(op(1), "dropped");
    assert!(log.is_empty());
}

#[test]
fn status_serializes_for_display() {
    let status = SyncStatus {
        online: true,
        syncing: false,
        pending: 4,
        last_sync_time: None,
    };
    let value = serde_json::to_value(&status).unwrap();
    assert_eq!(value["online"], true);
    assert_eq!(value["pending"], 4);
    assert!(value["last_sync_time"].is_null());
}
