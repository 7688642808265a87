// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Executors that write queued ops to the backend's tables.
//!
//! | kind           | table         | write                               |
//! |----------------|---------------|-------------------------------------|
//! | `create_order` | `orders`      | insert the payload                  |
//! | `add_item`     | `order_items` | insert, resolving a missing `price` |
//! | `update_item`  | `order_items` | update row `id`                     |
//! | `close_order`  | `orders`      | update row `id`, marking it closed  |
//! | `update_table` | `tables`      | update row `id`                     |

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use floor_core::OpKind;
use serde_json::{Map, Value};

use crate::executor::{ExecError, ExecFuture, ExecResult, Executor, ExecutorRegistry};
use crate::transport::TableClient;

pub const ORDERS: &str = "orders";
pub const ORDER_ITEMS: &str = "order_items";
pub const MENU_ITEMS: &str = "menu_items";
pub const TABLES: &str = "tables";

/// Registry with a table executor for every kind.
pub fn table_executors(client: Arc<dyn TableClient>) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();
    for kind in OpKind::ALL {
        registry.register(kind, TableExecutor::new(kind, Arc::clone(&client)));
    }
    registry
}

/// Executor performing the single table write for one kind.
pub struct TableExecutor {
    kind: OpKind,
    client: Arc<dyn TableClient>,
}

impl TableExecutor {
    pub fn new(kind: OpKind, client: Arc<dyn TableClient>) -> Self {
        TableExecutor { kind, client }
    }

    async fn apply(&self, payload: Value) -> ExecResult<()> {
        let client = self.client.as_ref();
        match self.kind {
            OpKind::CreateOrder => {
                client.insert(ORDERS, object(payload)?.into()).await?;
            }
            OpKind::AddItem => {
                let mut row = object(payload)?;
                if !row.contains_key("price") {
                    let price = resolve_price(client, &row).await?;
                    row.insert("price".to_string(), price);
                }
                client.insert(ORDER_ITEMS, row.into()).await?;
            }
            OpKind::UpdateItem => {
                let (key, changes) = split_key(payload)?;
                client.update(ORDER_ITEMS, &key, changes.into()).await?;
            }
            OpKind::CloseOrder => {
                let (key, mut changes) = split_key(payload)?;
                changes
                    .entry("status")
                    .or_insert_with(|| Value::from("closed"));
                changes.entry("closed_at").or_insert_with(|| {
                    Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
                });
                client.update(ORDERS, &key, changes.into()).await?;
            }
            OpKind::UpdateTable => {
                let (key, changes) = split_key(payload)?;
                client.update(TABLES, &key, changes.into()).await?;
            }
        }
        Ok(())
    }
}

impl Executor for TableExecutor {
    fn execute(&self, payload: Value) -> ExecFuture<'_> {
        Box::pin(self.apply(payload))
    }
}

/// Look up the current price of the item's menu entry.
async fn resolve_price(client: &dyn TableClient, row: &Map<String, Value>) -> ExecResult<Value> {
    let menu_item_id = row
        .get("menu_item_id")
        .and_then(Value::as_str)
        .ok_or_else(|| ExecError::application("add_item payload needs a price or a menu_item_id"))?;

    let menu_item = client
        .fetch(MENU_ITEMS, menu_item_id)
        .await?
        .ok_or_else(|| ExecError::application(format!("menu item {} not found", menu_item_id)))?;

    menu_item
        .get("price")
        .filter(|price| !price.is_null())
        .cloned()
        .ok_or_else(|| ExecError::application(format!("menu item {} has no price", menu_item_id)))
}

fn object(payload: Value) -> ExecResult<Map<String, Value>> {
    match payload {
        Value::Object(map) => Ok(map),
        other => Err(ExecError::application(format!(
            "payload must be an object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Split the `id` field off an update payload.
fn split_key(payload: Value) -> ExecResult<(String, Map<String, Value>)> {
    let mut map = object(payload)?;
    match map.remove("id") {
        Some(Value::String(key)) if !key.is_empty() => Ok((key, map)),
        _ => Err(ExecError::application("payload needs a string id")),
    }
}

fn kind_of(value: &Value) -> &'static str {
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
#[path = "tables_tests.rs"]
mod tests;
