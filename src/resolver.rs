//! Cache-First Resolver
//!
//! Single entry point for document lookups: validate the key, consult the
//! store, fall back to the remote source on a miss and persist what came
//! back. Concurrent misses for the same key are reconciled through the
//! store's duplicate-key rejection, so exactly one fetch result is ever
//! persisted per key. The miss path runs on a detached task, so a caller
//! that disconnects mid-resolution abandons the result, not the work.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ResolveError, StoreError};
use crate::key::AccessKey;
use crate::remote::DocumentSource;
use crate::store::DocumentStore;

// == Resolution Outcome ==
/// Where a resolved payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Served from the local store
    Cache,
    /// Fetched from the MCP server during this request
    Remote,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The store already held the document
    Hit { payload: Value },
    /// The document was fetched remotely and persisted
    Resolved { payload: Value },
}

impl Resolution {
    /// Which side produced the payload.
    pub fn source(&self) -> Source {
        match self {
            Resolution::Hit { .. } => Source::Cache,
            Resolution::Resolved { .. } => Source::Remote,
        }
    }

    /// Borrows the document payload.
    pub fn payload(&self) -> &Value {
        match self {
            Resolution::Hit { payload } | Resolution::Resolved { payload } => payload,
        }
    }

    /// Consumes the resolution and returns the payload.
    pub fn into_payload(self) -> Value {
        match self {
            Resolution::Hit { payload } | Resolution::Resolved { payload } => payload,
        }
    }
}

// == Resolver ==
/// Ties the store and the remote source together behind one operation.
pub struct Resolver {
    /// Persistent cache of resolved documents
    store: Arc<dyn DocumentStore>,
    /// Remote fallback consulted on a miss
    source: Arc<dyn DocumentSource>,
}

impl Resolver {
    /// Creates a resolver over the given store and source.
    pub fn new(store: Arc<dyn DocumentStore>, source: Arc<dyn DocumentSource>) -> Self {
        Self { store, source }
    }

    /// Resolves a raw access key to a document.
    ///
    /// Validation happens first, so malformed keys never reach the store or
    /// the network. On a cache miss, the fetched payload is persisted before
    /// the call returns; when a concurrent resolution wins the insert, the
    /// winner's record is served instead of the locally fetched payload.
    ///
    /// The fetch and the store write run on a detached task. Dropping the
    /// returned future, as axum does when a client disconnects, forfeits the
    /// result but the document is still fetched and cached.
    ///
    /// # Arguments
    /// * `raw_key` - Unvalidated access key as received from the caller
    ///
    /// # Returns
    /// * `Ok(Resolution)` with the payload and its origin
    /// * `Err(ResolveError)` for invalid keys, remote failures and store failures
    pub async fn resolve_document(&self, raw_key: &str) -> Result<Resolution, ResolveError> {
        let key = AccessKey::parse(raw_key)?;

        if let Some(record) = self.store.find_by_key(&key).await? {
            debug!(key = %key, "document served from cache");
            return Ok(Resolution::Hit {
                payload: record.payload,
            });
        }

        // Detached task: an abandoned caller cannot abort the fetch or the
        // pending store write, only the delivery of the result is lost.
        let task = tokio::spawn(Self::resolve_miss(
            Arc::clone(&self.store),
            Arc::clone(&self.source),
            key,
        ));

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                Err(StoreError::Internal(format!("resolution task failed: {err}")).into())
            }
        }
    }

    /// Remote fetch and persist for a key the store does not hold.
    async fn resolve_miss(
        store: Arc<dyn DocumentStore>,
        source: Arc<dyn DocumentSource>,
        key: AccessKey,
    ) -> Result<Resolution, ResolveError> {
        let payload = source.resolve(&key).await?;

        match store.upsert_on_miss(&key, payload).await {
            Ok(record) => {
                info!(key = %key, "document resolved remotely and cached");
                Ok(Resolution::Resolved {
                    payload: record.payload,
                })
            }
            Err(StoreError::DuplicateKey(_)) => {
                // A concurrent resolution persisted the key first. Its record
                // is canonical, so re-read and serve that one.
                match store.find_by_key(&key).await? {
                    Some(record) => {
                        debug!(key = %key, "lost insert race, serving persisted record");
                        Ok(Resolution::Hit {
                            payload: record.payload,
                        })
                    }
                    None => Err(StoreError::Internal(
                        "record vanished during duplicate-key recovery".to_string(),
                    )
                    .into()),
                }
            }
            Err(err) => {
                warn!(key = %key, error = %err, "failed to persist resolved document");
                Err(err.into())
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;

    use crate::error::{GatewayError, RpcError};
    use crate::store::{DocumentRecord, MemoryStore, RecordSummary, StoreStats};

    fn valid_key() -> String {
        "1".repeat(44)
    }

    // == Scripted Source ==
    enum SourceBehavior {
        Payload(Value),
        NotFound,
        FetchError,
    }

    struct ScriptedSource {
        behavior: SourceBehavior,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(behavior: SourceBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentSource for ScriptedSource {
        async fn resolve(&self, _key: &AccessKey) -> Result<Value, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                SourceBehavior::Payload(value) => Ok(value.clone()),
                SourceBehavior::NotFound => Err(GatewayError::NotFound),
                SourceBehavior::FetchError => Err(GatewayError::FetchFailed {
                    cause: RpcError::Transport("connection refused".to_string()),
                }),
            }
        }
    }

    // == Slow Source ==
    // Holds every fetch open long enough for all racing tasks to miss the
    // cache before the first insert lands.
    struct SlowSource {
        payload: Value,
    }

    #[async_trait]
    impl DocumentSource for SlowSource {
        async fn resolve(&self, _key: &AccessKey) -> Result<Value, GatewayError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(self.payload.clone())
        }
    }

    // == Broken Store ==
    // Lookups miss, inserts fail.
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn find_by_key(
            &self,
            _key: &AccessKey,
        ) -> Result<Option<DocumentRecord>, StoreError> {
            Ok(None)
        }

        async fn upsert_on_miss(
            &self,
            _key: &AccessKey,
            _payload: Value,
        ) -> Result<DocumentRecord, StoreError> {
            Err(StoreError::Internal("disk full".to_string()))
        }

        async fn list_recent(&self, _limit: usize) -> Result<Vec<RecordSummary>, StoreError> {
            Ok(Vec::new())
        }

        async fn delete_by_key(&self, _key: &AccessKey) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn delete_all(&self) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn stats(&self) -> Result<StoreStats, StoreError> {
            Ok(StoreStats {
                total: 0,
                most_recent_key: None,
                oldest_key: None,
                last_update: None,
            })
        }
    }

    // == Contested Store ==
    // Simulates losing the insert race: the first lookup misses, the insert
    // is rejected as a duplicate and later lookups see the winner's record.
    struct ContestedStore {
        winner: DocumentRecord,
        lookups: AtomicUsize,
    }

    impl ContestedStore {
        fn new(winner: DocumentRecord) -> Self {
            Self {
                winner,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for ContestedStore {
        async fn find_by_key(
            &self,
            _key: &AccessKey,
        ) -> Result<Option<DocumentRecord>, StoreError> {
            if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(None)
            } else {
                Ok(Some(self.winner.clone()))
            }
        }

        async fn upsert_on_miss(
            &self,
            key: &AccessKey,
            _payload: Value,
        ) -> Result<DocumentRecord, StoreError> {
            Err(StoreError::DuplicateKey(key.to_string()))
        }

        async fn list_recent(&self, _limit: usize) -> Result<Vec<RecordSummary>, StoreError> {
            Ok(vec![self.winner.summary()])
        }

        async fn delete_by_key(&self, _key: &AccessKey) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn delete_all(&self) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn stats(&self) -> Result<StoreStats, StoreError> {
            Ok(StoreStats {
                total: 1,
                most_recent_key: Some(self.winner.access_key.clone()),
                oldest_key: Some(self.winner.access_key.clone()),
                last_update: Some(self.winner.last_updated_at),
            })
        }
    }

    #[tokio::test]
    async fn test_invalid_key_skips_store_and_network() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(ScriptedSource::new(SourceBehavior::Payload(json!({}))));
        let resolver = Resolver::new(store.clone(), source.clone());

        let result = resolver.resolve_document("12345").await;

        assert!(matches!(result, Err(ResolveError::Validation(_))));
        assert_eq!(source.call_count(), 0);
        assert_eq!(store.stats().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_miss_resolves_remotely_then_hits_cache() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(ScriptedSource::new(SourceBehavior::Payload(
            json!({"valor": 100}),
        )));
        let resolver = Resolver::new(store.clone(), source.clone());

        let first = resolver.resolve_document(&valid_key()).await.unwrap();
        assert_eq!(first.source(), Source::Remote);
        assert_eq!(first.payload(), &json!({"valor": 100}));

        let second = resolver.resolve_document(&valid_key()).await.unwrap();
        assert_eq!(second.source(), Source::Cache);
        assert_eq!(second.payload(), &json!({"valor": 100}));

        // The second resolution never went back to the network
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(ScriptedSource::new(SourceBehavior::NotFound));
        let resolver = Resolver::new(store.clone(), source);

        let result = resolver.resolve_document(&valid_key()).await;

        assert!(matches!(
            result,
            Err(ResolveError::Gateway(GatewayError::NotFound))
        ));
        assert_eq!(store.stats().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_store_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(ScriptedSource::new(SourceBehavior::FetchError));
        let resolver = Resolver::new(store.clone(), source);

        let result = resolver.resolve_document(&valid_key()).await;

        assert!(matches!(
            result,
            Err(ResolveError::Gateway(GatewayError::FetchFailed { .. }))
        ));
        assert_eq!(store.stats().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_store_failure_after_fetch_surfaces() {
        let source = Arc::new(ScriptedSource::new(SourceBehavior::Payload(
            json!({"valor": 100}),
        )));
        let resolver = Resolver::new(Arc::new(BrokenStore), source);

        let result = resolver.resolve_document(&valid_key()).await;

        assert!(matches!(
            result,
            Err(ResolveError::Store(StoreError::Internal(_)))
        ));
    }

    #[tokio::test]
    async fn test_lost_insert_race_serves_winner_record() {
        let key = AccessKey::parse(&valid_key()).unwrap();
        let winner = DocumentRecord::new(key, json!({"valor": 100}));
        let store = Arc::new(ContestedStore::new(winner));
        let source = Arc::new(ScriptedSource::new(SourceBehavior::Payload(
            json!({"valor": 999}),
        )));
        let resolver = Resolver::new(store, source);

        let resolution = resolver.resolve_document(&valid_key()).await.unwrap();

        // The persisted record wins over the freshly fetched payload
        assert_eq!(resolution.source(), Source::Cache);
        assert_eq!(resolution.payload(), &json!({"valor": 100}));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_persist_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(SlowSource {
            payload: json!({"valor": 100}),
        });
        let resolver = Arc::new(Resolver::new(store.clone(), source));
        let barrier = Arc::new(Barrier::new(8));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                resolver.resolve_document(&"1".repeat(44)).await.unwrap()
            }));
        }

        let mut resolved = 0;
        let mut hits = 0;
        for handle in handles {
            let resolution = handle.await.unwrap();
            assert_eq!(resolution.payload(), &json!({"valor": 100}));
            match resolution.source() {
                Source::Remote => resolved += 1,
                Source::Cache => hits += 1,
            }
        }

        assert_eq!(resolved, 1);
        assert_eq!(hits, 7);
        assert_eq!(store.stats().await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_abandoned_resolution_still_persists() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(SlowSource {
            payload: json!({"valor": 100}),
        });
        let resolver = Resolver::new(store.clone(), source);

        // Dropping the future mid-fetch is what a disconnected caller does
        let abandoned = tokio::time::timeout(
            Duration::from_millis(5),
            resolver.resolve_document(&"1".repeat(44)),
        )
        .await;
        assert!(abandoned.is_err());

        // The detached miss path completes and warms the cache anyway
        tokio::time::sleep(Duration::from_millis(100)).await;

        let key = AccessKey::parse(&"1".repeat(44)).unwrap();
        let record = store.find_by_key(&key).await.unwrap().unwrap();
        assert_eq!(record.payload, json!({"valor": 100}));
        assert_eq!(store.stats().await.unwrap().total, 1);
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Source::Cache).unwrap(), json!("cache"));
        assert_eq!(
            serde_json::to_value(Source::Remote).unwrap(),
            json!("remote")
        );
    }

    #[test]
    fn test_into_payload_consumes_both_variants() {
        let hit = Resolution::Hit {
            payload: json!({"a": 1}),
        };
        let resolved = Resolution::Resolved {
            payload: json!({"b": 2}),
        };

        assert_eq!(hit.into_payload(), json!({"a": 1}));
        assert_eq!(resolved.into_payload(), json!({"b": 2}));
    }
}
