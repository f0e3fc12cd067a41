//! Conversions shared by the SQLite repositories.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// Current UTC time as stored in every timestamp column
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current UTC date as stored in date columns
pub(crate) fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Decode a JSON object column, `{}` when missing or malformed
pub(crate) fn json_object(text: Option<String>) -> Value {
    decode(text).unwrap_or_else(|| json!({}))
}

/// Decode a JSON list column, `[]` when missing or malformed
pub(crate) fn json_list(text: Option<String>) -> Value {
    decode(text).unwrap_or_else(|| json!([]))
}

fn decode(text: Option<String>) -> Option<Value> {
    text.filter(|t| !t.trim().is_empty())
        .and_then(|t| serde_json::from_str(&t).ok())
}

/// Encode a JSON value for a TEXT column
pub(crate) fn encode(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}
