// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use floor_core::OpKind;
use serde_json::Value;

use super::{acquire_lock, open_queue};
use crate::config::Config;
use crate::error::{Error, Result};

pub fn run(config: &Config, kind: &str, payload: &str, max_attempts: Option<u32>) -> Result<()> {
    let kind: OpKind = kind.parse()?;
    let payload = parse_payload(payload)?;

    let _lock = acquire_lock(&config.lock_path())?;
    let mut queue = open_queue(config)?;
    let id = queue.enqueue(kind, payload, max_attempts)?;
    tracing::debug!("queued {} op {} ({} pending)", kind, id, queue.len());

    println!("{}", id);
    Ok(())
}

/// Parse a payload argument; only JSON objects are accepted.
pub fn parse_payload(raw: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::InvalidPayload(e.to_string()))?;
    if !value.is_object() {
        return Err(Error::InvalidPayload(format!(
            "expected an object, got {}",
            json_type(&value)
        )));
    }
    Ok(value)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
