use chrono::{DateTime, Utc};
use serde_json::Value;

/// Registration forms have shipped this data at the top level, under
/// `profile`, and under `answers`, depending on the intake era. Every lookup
/// probes all three, in that order, before moving to the next candidate key.
fn lookup<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    record
        .get(key)
        .or_else(|| record.get("profile").and_then(|p| p.get(key)))
        .or_else(|| record.get("answers").and_then(|a| a.get(key)))
        .filter(|v| !v.is_null())
}

/// First non-empty trimmed string found for any of `keys`, probing
/// top-level / `profile` / `answers` per key in caller-supplied order.
pub fn resolve_string(record: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = lookup(record, key).and_then(Value::as_str) {
            let trimmed = v.trim();

            if !trimmed.is_empty() {
                return Some(trimmed.to_owned());
            }
        }
    }

    None
}

/// True for the literal boolean `true` or the strings `"true"` / `"yes"`;
/// anything else, including absence, is false.
pub fn resolve_early_bird(record: &Value) -> bool {
    match lookup(record, "isEarlyBird") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true" || s == "yes",
        _ => false,
    }
}

/// `registeredAt` if it holds a valid timestamp, else `createdAt` under the
/// same validity check, else absent. Top level only; these fields never
/// lived under `profile` or `answers`.
pub fn resolve_registered_at(record: &Value) -> Option<DateTime<Utc>> {
    record
        .get("registeredAt")
        .and_then(as_timestamp)
        .or_else(|| record.get("createdAt").and_then(as_timestamp))
}

/// Decode a timestamp-typed value (RFC 3339 string on the wire).
pub fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
