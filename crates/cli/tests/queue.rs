// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

#[test]
fn enqueue_prints_id_and_persists() {
    let ws = Workspace::offline();

    let id = ws.enqueue("create_order", r#"{"id":"o1","table_id":4}"#);

    assert_eq!(id.len(), 36);
    assert!(ws.queue_path().exists());
    let pending = ws.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], id.as_str());
    assert_eq!(pending[0]["kind"], "create_order");
    assert_eq!(pending[0]["attempt_count"], 0);
    assert_eq!(pending[0]["max_attempts"], 3);
}

#[test]
fn enqueue_honors_max_attempts() {
    let ws = Workspace::offline();

    ws.cmd()
        .args(["enqueue", "close_order", r#"{"id":"o1"}"#, "--max-attempts", "7"])
        .assert()
        .success();

    assert_eq!(ws.pending()[0]["max_attempts"], 7);
}

#[test]
fn enqueue_rejects_zero_max_attempts() {
    let ws = Workspace::offline();

    ws.cmd()
        .args(["enqueue", "close_order", r#"{"id":"o1"}"#, "--max-attempts", "0"])
        .assert()
        .failure();
}

#[test]
fn enqueue_unknown_kind_lists_valid_kinds() {
    let ws = Workspace::offline();

    ws.cmd()
        .args(["enqueue", "refund_order", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown operation kind: 'refund_order'"))
        .stderr(predicate::str::contains("create_order"));
}

#[test]
fn enqueue_rejects_non_object_payload() {
    let ws = Workspace::offline();

    ws.cmd()
        .args(["enqueue", "add_item", "[1,2,3]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid payload"));
}

#[test]
fn list_text_shows_fifo_order() {
    let ws = Workspace::offline();
    let first = ws.enqueue("create_order", r#"{"id":"o1"}"#);
    let second = ws.enqueue("add_item", r#"{"order_id":"o1","price":4.5}"#);

    let output = ws.cmd().arg("list").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&first));
    assert!(lines[1].starts_with(&second));
}

#[test]
fn list_empty_queue() {
    Workspace::offline()
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("no pending operations"));
}

#[test]
fn status_reports_offline_backend() {
    let ws = Workspace::offline();
    let id = ws.enqueue("update_table", r#"{"id":"t4","status":"seated"}"#);

    let output = ws.cmd().args(["status", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(status["online"], false);
    assert_eq!(status["pending"], 1);
    assert_eq!(status["oldest"]["id"], id.as_str());
    assert_eq!(status["probe_addr"], "127.0.0.1:9");
}

#[test]
fn status_text() {
    Workspace::offline()
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: 0"))
        .stdout(predicate::str::contains("unreachable"));
}

#[test]
fn list_and_status_do_not_create_the_queue() {
    let ws = Workspace::offline();

    ws.cmd().arg("list").assert().success();
    ws.cmd().arg("status").assert().success();

    assert!(!ws.queue_path().exists());
    assert!(!ws.temp.path().join("queue").exists());
}

#[test]
fn clear_refuses_without_yes() {
    let ws = Workspace::offline();
    for n in 0..4 {
        ws.enqueue("add_item", &format!(r#"{{"order_id":"o1","n":{}}}"#, n));
    }

    ws.cmd()
        .arg("clear")
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to discard 4 pending operations"));
    assert_eq!(ws.pending().len(), 4);

    ws.cmd()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("discarded 4 pending operations"));
    assert!(ws.pending().is_empty());
}

#[test]
fn locked_queue_is_reported_in_use() {
    use fs2::FileExt;

    let ws = Workspace::offline();
    let lock_path = ws.temp.path().join("queue").join("pending.jsonl.lock");
    std::fs::create_dir_all(lock_path.parent().unwrap()).unwrap();
    let lock = std::fs::File::create(&lock_path).unwrap();
    lock.lock_exclusive().unwrap();

    ws.cmd()
        .args(["enqueue", "create_order", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("queue is in use"));

    lock.unlock().unwrap();
    ws.cmd()
        .args(["enqueue", "create_order", "{}"])
        .assert()
        .success();
}

#[test]
fn explicit_config_must_exist() {
    let ws = Workspace::offline();

    ws.cmd()
        .args(["--config", "missing.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn invalid_config_is_reported() {
    let ws = Workspace::offline();
    std::fs::write(
        ws.temp.path().join("floorsync.toml"),
        "[backend]\nurl = \"http://example.com\"\n",
    )
    .unwrap();

    ws.cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be ws:// or wss://"));
}
