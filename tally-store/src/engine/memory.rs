use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;

use crate::{
    document::{Snapshot, Write},
    engine::Engine,
    error::{Result, StoreError},
    path::{CollectionPath, DocPath},
    store::Store,
};

pub type MemoryStore = Store;

/// In-memory engine. Every committed write bumps the document's version,
/// which is what the transaction read-set validation keys off.
#[derive(Debug, Clone, Default)]
pub struct Memory(Arc<RwLock<HashMap<DocPath, (u64, Value)>>>);

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore {
    pub fn in_memory() -> Self {
        Store::new(Memory::new())
    }
}

#[async_trait]
impl Engine for Memory {
    async fn get(&self, path: &DocPath) -> Result<Snapshot> {
        let docs = self.0.read();

        Ok(match docs.get(path) {
            Some((version, data)) => Snapshot {
                path: path.clone(),
                version: *version,
                data: Some(data.clone()),
            },
            None => Snapshot::missing(path.clone()),
        })
    }

    async fn commit(&self, reads: &[(DocPath, u64)], writes: Vec<Write>) -> Result<()> {
        let mut docs = self.0.write();

        for (path, version) in reads {
            let current = docs.get(path).map(|(v, _)| *v).unwrap_or(0);

            if current != *version {
                return Err(StoreError::Conflict(path.clone()));
            }
        }

        let now = Utc::now();

        for write in writes {
            let (version, data) = docs.entry(write.path).or_insert((0, Value::Null));
            write.patch.apply_to(data, now);
            *version += 1;
        }

        Ok(())
    }

    async fn apply(&self, writes: Vec<Write>) -> Result<()> {
        self.commit(&[], writes).await
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Snapshot>> {
        let docs = self.0.read();

        let mut snapshots: Vec<Snapshot> = docs
            .iter()
            .filter(|(path, _)| collection.contains(path))
            .map(|(path, (version, data))| Snapshot {
                path: path.clone(),
                version: *version,
                data: Some(data.clone()),
            })
            .collect();

        snapshots.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(snapshots)
    }
}
