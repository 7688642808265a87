// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn queue_in_use_names_the_lock() {
    let err = Error::QueueInUse(PathBuf::from("/tmp/q.jsonl.lock"));
    let msg = err.to_string();
    assert!(msg.starts_with("queue is in use: /tmp/q.jsonl.lock"));
    assert!(msg.contains("hint:"));
}

#[test]
fn confirmation_required_mentions_flag() {
    let msg = Error::ConfirmationRequired(4).to_string();
    assert!(msg.contains("4 pending operations"));
    assert!(msg.contains("--yes"));
}

#[test]
fn invalid_payload_shows_example() {
    let msg = Error::InvalidPayload("expected value at line 1".into()).to_string();
    assert!(msg.contains(r#"'{"id":"o1"}'"#));
}

#[test]
fn core_errors_pass_through() {
    let core: floor_core::Error = "bogus".parse::<floor_core::OpKind>().unwrap_err();
    let err = Error::from(core);
    assert!(err.to_string().starts_with("unknown operation kind: 'bogus'"));
}

#[test]
fn json_errors_convert() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(Error::from(json_err), Error::Json(_)));
}
