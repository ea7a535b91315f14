use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::{
    document::{Snapshot, Write},
    error::Result,
    path::{CollectionPath, DocPath},
};

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::*;

#[async_trait]
pub trait Engine: DynClone + Send + Sync {
    async fn get(&self, path: &DocPath) -> Result<Snapshot>;

    /// Commit `writes` atomically, failing with [`StoreError::Conflict`] if
    /// any document named in `reads` has moved past its recorded version.
    ///
    /// [`StoreError::Conflict`]: crate::StoreError::Conflict
    async fn commit(&self, reads: &[(DocPath, u64)], writes: Vec<Write>) -> Result<()>;

    /// Blind merge without a read set. This is the atomic-increment path:
    /// it never conflicts and never retries.
    async fn apply(&self, writes: Vec<Write>) -> Result<()>;

    /// Full scan of a collection, ordered by document id. Reconciliation
    /// only; never called on the per-event hot path.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Snapshot>>;
}

dyn_clone::clone_trait_object!(Engine);
