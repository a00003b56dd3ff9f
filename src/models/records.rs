//! Typed views over the loosely-typed list items the Afdian API returns.
//!
//! Every field is optional on the wire. The parsers here decide, field by
//! field, what a missing or wrong-typed value becomes, so the rest of the
//! crate never has to poke at `serde_json::Value`.

use serde_json::{Map, Value};

use crate::error::RecordError;

/// A backer's identity as listed by the sponsor endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    pub id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileRecord {
    /// Parse a sponsor-listing item shaped like
    /// `{"user": {"user_id": "...", "name": "...", "avatar": "..."}}`.
    pub fn from_value(item: &Value) -> Result<Self, RecordError> {
        let item = item.as_object().ok_or(RecordError::NotAnObject)?;
        let user = item.get("user").and_then(Value::as_object);

        let id = user
            .and_then(|u| non_empty_str(u, "user_id"))
            .ok_or(RecordError::MissingId)?;

        Ok(Self {
            id,
            display_name: user.and_then(|u| non_empty_str(u, "name")),
            avatar_url: user.and_then(|u| non_empty_str(u, "avatar")),
        })
    }
}

/// One payment event as listed by the order endpoint, carrying a possibly
/// stale copy of the backer's display data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionRecord {
    pub profile_id: Option<String>,
    pub display_name_fallback: Option<String>,
    pub avatar_fallback: Option<String>,
    /// Unix seconds, 0 when absent or unparseable
    pub paid_at: i64,
    /// Unix seconds, 0 when absent or unparseable
    pub created_at: i64,
}

impl TransactionRecord {
    /// Parse an order-listing item. Only a non-object item is an error;
    /// every individual field falls back on its own.
    pub fn from_value(item: &Value) -> Result<Self, RecordError> {
        let item = item.as_object().ok_or(RecordError::NotAnObject)?;

        Ok(Self {
            profile_id: non_empty_str(item, "user_id"),
            display_name_fallback: non_empty_str(item, "user_name"),
            avatar_fallback: non_empty_str(item, "avatar"),
            paid_at: loose_timestamp(item.get("last_pay_time")),
            created_at: loose_timestamp(item.get("create_time")),
        })
    }

    /// The first non-zero of paid-at then created-at, or 0.
    pub fn effective_timestamp(&self) -> i64 {
        if self.paid_at != 0 {
            self.paid_at
        } else {
            self.created_at
        }
    }
}

/// A string field that is present, a string, and not blank. Numeric ids are
/// accepted and stringified since the API is not consistent about them.
fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Timestamps arrive as integers, floats, or numeric strings. Anything else
/// is treated as 0.
fn loose_timestamp(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}
