use std::future::Future;

use chrono::Utc;

use crate::{
    document::{Patch, Snapshot, Write},
    engine::Engine,
    error::{Result, StoreError},
    path::{CollectionPath, DocPath},
};

/// Maximum optimistic-concurrency attempts before a transaction gives up.
pub const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct Store {
    engine: Box<dyn Engine>,
}

impl Store {
    pub fn new<E: Engine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    pub async fn get(&self, path: &DocPath) -> Result<Snapshot> {
        self.engine.get(path).await
    }

    pub async fn list(&self, collection: &CollectionPath) -> Result<Vec<Snapshot>> {
        self.engine.list(collection).await
    }

    /// Merge `patch` into the document without transactional read-set
    /// validation. This is the atomic-increment path for plain counters.
    pub async fn apply(&self, path: DocPath, patch: Patch) -> Result<()> {
        self.engine.apply(vec![Write::new(path, patch)]).await
    }

    /// Run `body` as one optimistic transaction: all reads observe a
    /// consistent committed state, all staged writes commit atomically, and
    /// the whole body re-runs when a concurrent commit invalidates the read
    /// set. The body must therefore stay free of side effects beyond its
    /// reads and writes.
    pub async fn run_transaction<T, F, Fut>(&self, body: F) -> Result<T>
    where
        F: Fn(Transaction) -> Fut,
        Fut: Future<Output = Result<(Transaction, T)>>,
    {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let tx = Transaction {
                engine: self.engine.clone(),
                reads: Vec::new(),
                writes: Vec::new(),
            };

            let (tx, value) = body(tx).await?;

            match self.engine.commit(&tx.reads, tx.writes).await {
                Ok(()) => return Ok(value),
                Err(StoreError::Conflict(path)) => {
                    tracing::debug!(%path, attempt, "transaction conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::TooManyAttempts(MAX_TRANSACTION_ATTEMPTS))
    }
}

/// Read set + staged write set of one transaction attempt.
///
/// Reads record the document version they observed; commit validates those
/// versions. Staged writes are overlaid onto subsequent reads of the same
/// document, giving read-your-writes inside the body.
pub struct Transaction {
    engine: Box<dyn Engine>,
    reads: Vec<(DocPath, u64)>,
    writes: Vec<Write>,
}

impl Transaction {
    pub async fn get(&mut self, path: &DocPath) -> Result<Snapshot> {
        let mut snapshot = self.engine.get(path).await?;
        self.reads.push((path.clone(), snapshot.version));

        let staged: Vec<&Write> = self.writes.iter().filter(|w| w.path == *path).collect();

        if !staged.is_empty() {
            let mut data = snapshot.data.take().unwrap_or(serde_json::Value::Null);
            let now = Utc::now();

            for write in staged {
                write.patch.apply_to(&mut data, now);
            }

            snapshot.data = Some(data);
        }

        Ok(snapshot)
    }

    pub fn set(&mut self, path: DocPath, patch: Patch) {
        self.writes.push(Write::new(path, patch));
    }
}
