//! Decoding of Debezium change events for the tables the probe writes to.
//!
//! Messages are expected in the standard envelope,
//! `{"payload": {"before": {..}, "after": {..}, "op": "c", ..}}`, with the row columns
//! under `before`/`after`. Timestamp columns are epoch nanoseconds.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use chrono::{TimeZone, Utc};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProbeError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Users,
    Orders,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserRow {
    pub id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderRow {
    pub id: i32,
    pub user_id: Option<i32>,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub order_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    User(UserRow),
    Order(OrderRow),
    /// No `after` image: a delete, or an update captured without the new row.
    Removed { entity: Entity, before: Value },
    /// The message has no `payload` key.
    Invalid,
}

impl FromStr for Entity {
    type Err = ProbeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Entity::Users),
            "orders" => Ok(Entity::Orders),
            other => Err(ProbeError::UnknownEntity(other.to_string())),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Users => f.write_str("User"),
            Entity::Orders => f.write_str("Order"),
        }
    }
}

/// Renders epoch nanoseconds as UTC `yyyy-MM-dd HH:mm:ss`, or `null` when absent.
#[must_use]
pub fn format_timestamp(nanos: Option<i64>) -> String {
    nanos.map_or_else(
        || "null".to_string(),
        |nanos| Utc.timestamp_nanos(nanos).format(TIMESTAMP_FORMAT).to_string(),
    )
}

fn or_null<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "null".to_string(), ToString::to_string)
}

impl fmt::Display for UserRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={}, name={}, email={}, createdAt={}",
            self.id,
            or_null(self.name.as_ref()),
            or_null(self.email.as_ref()),
            format_timestamp(self.created_at)
        )
    }
}

impl fmt::Display for OrderRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={}, userId={}, productName={}, quantity={}, orderDate={}",
            self.id,
            or_null(self.user_id.as_ref()),
            or_null(self.product_name.as_ref()),
            or_null(self.quantity.as_ref()),
            format_timestamp(self.order_date)
        )
    }
}

/// # Errors
/// Errors when `message` is not JSON or its `after` image does not fit the entity's row
pub fn decode(entity: Entity, message: &str) -> Result<ChangeEvent, ProbeError> {
    let root: Value = serde_json::from_str(message)?;
    let payload = match root.get("payload") {
        Some(payload) => payload,
        None => return Ok(ChangeEvent::Invalid),
    };

    match payload.get("after") {
        Some(after) if !after.is_null() => Ok(match entity {
            Entity::Users => ChangeEvent::User(UserRow::deserialize(after)?),
            Entity::Orders => ChangeEvent::Order(OrderRow::deserialize(after)?),
        }),
        _ => Ok(ChangeEvent::Removed {
            entity,
            before: payload.get("before").cloned().unwrap_or(Value::Null),
        }),
    }
}

/// Decodes one message and logs what it describes. Failures are logged, never returned.
pub fn process(entity: Entity, message: &str) {
    match decode(entity, message) {
        Ok(ChangeEvent::User(user)) => {
            info!("User processing...");
            info!("User: {}", user);
        }
        Ok(ChangeEvent::Order(order)) => {
            info!("Order processing...");
            info!("Order: {}", order);
        }
        Ok(ChangeEvent::Removed { entity, before }) => {
            info!("Received delete or update event for {}: {}", entity, before);
        }
        Ok(ChangeEvent::Invalid) => warn!("Payload missing, message invalid"),
        Err(e) => error!("Error processing message: {}", e.describe()),
    }
}

/// Processes every non-blank line of `reader` as one message and returns how many there
/// were.
///
/// # Errors
/// Errors only when reading fails; bad messages are logged and skipped
pub fn watch<B: BufRead>(entity: Entity, reader: B) -> Result<usize, ProbeError> {
    let mut processed = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        process(entity, &line);
        processed += 1;
    }
    Ok(processed)
}
