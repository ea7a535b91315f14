#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::Value;
use tally::{DocumentChange, OverviewStats, Processor};
use tally_store::{DocPath, MemoryStore, Patch, Store};

pub const EVENT: &str = "nlc-2026";

pub fn store() -> Store {
    MemoryStore::in_memory()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn doc(path: &str) -> DocPath {
    DocPath::parse(path).unwrap()
}

/// Merge a raw JSON object into the store, one top-level field at a time,
/// the way the upstream registration and check-in flows write their
/// documents.
pub async fn seed(store: &Store, path: &str, value: &Value) {
    let mut patch = Patch::new();

    for (field, v) in value.as_object().expect("seed value must be an object") {
        patch = patch.set(field, v).unwrap();
    }

    store.apply(doc(path), patch).await.unwrap();
}

pub async fn fire_created(processor: &Processor, path: &str, data: Value) {
    processor
        .handle(DocumentChange::Created {
            path: doc(path),
            data,
        })
        .await
        .unwrap();
}

pub async fn fire_updated(processor: &Processor, path: &str, before: Value, after: Value) {
    processor
        .handle(DocumentChange::Updated {
            path: doc(path),
            before,
            after,
        })
        .await
        .unwrap();
}

pub async fn overview(store: &Store) -> OverviewStats {
    store
        .get(&doc(&format!("events/{EVENT}/stats/overview")))
        .await
        .unwrap()
        .to_data()
        .unwrap()
        .unwrap_or_default()
}
