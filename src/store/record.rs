//! Stored document records and store statistics.
//!
//! Wire field names follow the persisted document format (`chaveAcesso`,
//! `dados`, `consultadoEm`, `atualizadoEm`), so records serialized by this
//! module are interchangeable with documents written by other consumers of
//! the same store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::key::AccessKey;

// == Document Record ==
/// A cached DANFE document keyed by its access key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// The 44 digit access key identifying the document
    #[serde(rename = "chaveAcesso")]
    pub access_key: AccessKey,
    /// Normalized document payload exactly as returned by the remote server
    #[serde(rename = "dados")]
    pub payload: Value,
    /// When the document was first resolved
    #[serde(rename = "consultadoEm")]
    pub first_seen_at: DateTime<Utc>,
    /// When the record was last written
    #[serde(rename = "atualizadoEm")]
    pub last_updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Creates a fresh record with both timestamps set to now.
    pub fn new(access_key: AccessKey, payload: Value) -> Self {
        let now = Utc::now();
        Self {
            access_key,
            payload,
            first_seen_at: now,
            last_updated_at: now,
        }
    }

    /// Returns a payload-free view of this record for listings.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            access_key: self.access_key.clone(),
            first_seen_at: self.first_seen_at,
            last_updated_at: self.last_updated_at,
        }
    }
}

// == Record Summary ==
/// Listing view of a record. Omits the payload, which can be large.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    #[serde(rename = "chaveAcesso")]
    pub access_key: AccessKey,
    #[serde(rename = "consultadoEm")]
    pub first_seen_at: DateTime<Utc>,
    #[serde(rename = "atualizadoEm")]
    pub last_updated_at: DateTime<Utc>,
}

// == Store Statistics ==
/// Aggregate counters over the whole store.
///
/// The marker fields are `None` while the store is empty and are skipped
/// during serialization in that case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    /// Number of records currently stored
    pub total: u64,
    /// Access key of the most recently updated record
    #[serde(rename = "maisRecente", skip_serializing_if = "Option::is_none")]
    pub most_recent_key: Option<AccessKey>,
    /// Access key of the record resolved longest ago
    #[serde(rename = "maisAntigo", skip_serializing_if = "Option::is_none")]
    pub oldest_key: Option<AccessKey>,
    /// Timestamp of the most recent write
    #[serde(rename = "ultimaAtualizacao", skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}
