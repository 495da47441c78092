//! In-Memory Store Backend
//!
//! HashMap keyed by access key behind a tokio RwLock. Holding the single
//! write lock across the check-and-insert makes `upsert_on_miss` atomic,
//! which is what keeps at most one record per key under concurrent
//! resolutions.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::key::AccessKey;
use crate::store::{DocumentRecord, DocumentStore, RecordSummary, StoreStats};

// == Memory Store ==
/// Default [`DocumentStore`] backend holding every record in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Records keyed by access key
    records: RwLock<HashMap<AccessKey, DocumentRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_key(&self, key: &AccessKey) -> Result<Option<DocumentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn upsert_on_miss(
        &self,
        key: &AccessKey,
        payload: Value,
    ) -> Result<DocumentRecord, StoreError> {
        let mut records = self.records.write().await;

        if records.contains_key(key) {
            return Err(StoreError::DuplicateKey(key.to_string()));
        }

        let record = DocumentRecord::new(key.clone(), payload);
        records.insert(key.clone(), record.clone());
        Ok(record)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<RecordSummary>, StoreError> {
        let records = self.records.read().await;

        let mut summaries: Vec<RecordSummary> =
            records.values().map(DocumentRecord::summary).collect();
        summaries.sort_by(|a, b| b.last_updated_at.cmp(&a.last_updated_at));
        summaries.truncate(limit);

        Ok(summaries)
    }

    async fn delete_by_key(&self, key: &AccessKey) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.remove(key).is_some())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let records = self.records.read().await;

        let most_recent = records.values().max_by_key(|r| r.last_updated_at);
        let oldest = records.values().min_by_key(|r| r.first_seen_at);

        Ok(StoreStats {
            total: records.len() as u64,
            most_recent_key: most_recent.map(|r| r.access_key.clone()),
            oldest_key: oldest.map(|r| r.access_key.clone()),
            last_update: most_recent.map(|r| r.last_updated_at),
        })
    }
}
