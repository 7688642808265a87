// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    unknown_kind = { Error::UnknownKind("refund".into()), "refund" },
    unknown_kind_hint = { Error::UnknownKind("x".into()), "valid kinds" },
    invalid_max_attempts = { Error::InvalidMaxAttempts(0), "at least 1" },
    corrupted = { Error::CorruptedRecord { line: 4, reason: "bad".into() }, "line 4" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
