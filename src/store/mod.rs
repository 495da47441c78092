//! Persistent cache store for resolved documents.
//!
//! The resolver talks to the store through the [`DocumentStore`] trait so the
//! backend stays swappable. [`MemoryStore`] is the in-process default; a
//! durable backend only has to implement the same six operations.

mod memory;
mod record;


pub use memory::MemoryStore;
pub use record::{DocumentRecord, RecordSummary, StoreStats};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::key::AccessKey;

/// Largest page a listing may request.
pub const MAX_LIST_LIMIT: usize = 500;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIST_LIMIT: usize = 50;

// == Document Store Trait ==
/// Keyed persistence for resolved DANFE documents.
///
/// Implementations must keep at most one record per access key and must make
/// the check-and-insert in [`upsert_on_miss`](DocumentStore::upsert_on_miss)
/// atomic with respect to concurrent callers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point lookup by access key.
    async fn find_by_key(&self, key: &AccessKey) -> Result<Option<DocumentRecord>, StoreError>;

    /// Inserts a fresh record for `key`, failing with
    /// [`StoreError::DuplicateKey`] when one already exists.
    ///
    /// Never overwrites: the first writer wins and later writers are told so.
    async fn upsert_on_miss(
        &self,
        key: &AccessKey,
        payload: Value,
    ) -> Result<DocumentRecord, StoreError>;

    /// Lists up to `limit` records, most recently updated first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<RecordSummary>, StoreError>;

    /// Removes the record for `key`. Returns whether one existed.
    async fn delete_by_key(&self, key: &AccessKey) -> Result<bool, StoreError>;

    /// Removes every record and returns how many were dropped.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Aggregate counters over the whole store.
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}
