use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{error::Result, path::DocPath};

/// Single field mutation inside a [`Patch`].
#[derive(Debug, Clone)]
pub enum FieldOp {
    /// Replace the field wholesale. Map-valued fields are not deep merged.
    Set(Value),
    /// Numeric add; a missing or non-numeric field counts as 0.
    Increment(i64),
    /// Commit-time timestamp, RFC 3339.
    ServerTimestamp,
}

/// Ordered set of top-level field mutations, applied with merge semantics:
/// fields not named by the patch are left untouched. Later ops on the same
/// field apply after earlier ones, so set-then-increment composes.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    fields: Vec<(String, FieldOp)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn set<V: Serialize>(mut self, field: impl Into<String>, value: V) -> Result<Self> {
        self.fields
            .push((field.into(), FieldOp::Set(serde_json::to_value(value)?)));

        Ok(self)
    }

    pub fn increment(mut self, field: impl Into<String>, by: i64) -> Self {
        self.fields.push((field.into(), FieldOp::Increment(by)));
        self
    }

    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), FieldOp::ServerTimestamp));
        self
    }

    /// Apply onto `data`, upgrading non-objects (and missing docs) to an
    /// empty object first.
    pub fn apply_to(&self, data: &mut Value, now: DateTime<Utc>) {
        if !data.is_object() {
            *data = Value::Object(Map::new());
        }

        let Some(object) = data.as_object_mut() else {
            return;
        };

        for (field, op) in &self.fields {
            match op {
                FieldOp::Set(value) => {
                    object.insert(field.to_owned(), value.clone());
                }
                FieldOp::Increment(by) => {
                    let current = object.get(field).and_then(Value::as_i64).unwrap_or(0);
                    object.insert(field.to_owned(), Value::from(current + by));
                }
                FieldOp::ServerTimestamp => {
                    object.insert(
                        field.to_owned(),
                        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
                    );
                }
            }
        }
    }
}

/// A staged document mutation.
#[derive(Debug, Clone)]
pub struct Write {
    pub path: DocPath,
    pub patch: Patch,
}

impl Write {
    pub fn new(path: DocPath, patch: Patch) -> Self {
        Self { path, patch }
    }
}

/// Point-in-time view of a single document. `version == 0` means the
/// document does not exist.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: DocPath,
    pub version: u64,
    pub data: Option<Value>,
}

impl Snapshot {
    pub fn missing(path: DocPath) -> Self {
        Self {
            path,
            version: 0,
            data: None,
        }
    }

    pub fn exists(&self) -> bool {
        self.version > 0
    }

    pub fn to_data<D: DeserializeOwned>(&self) -> Result<Option<D>> {
        match &self.data {
            Some(data) => Ok(Some(serde_json::from_value(data.clone())?)),
            None => Ok(None),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(name))
    }
}
