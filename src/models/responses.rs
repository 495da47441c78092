//! Response DTOs for the resolver API
//!
//! Defines the structure of outgoing HTTP response bodies. Every body
//! carries a `success` flag so agent clients can branch without inspecting
//! status codes.

use serde::Serialize;
use serde_json::Value;

use crate::resolver::{Resolution, Source};
use crate::store::{RecordSummary, StoreStats};

/// Response body for the document lookup (POST /api/danfe/buscar)
#[derive(Debug, Clone, Serialize)]
pub struct BuscarResponse {
    /// Whether a document was produced
    pub success: bool,
    /// The document payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human readable outcome description
    pub message: String,
    /// Where the document came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl BuscarResponse {
    /// Builds the success body for a resolution outcome.
    pub fn from_resolution(resolution: Resolution) -> Self {
        let source = resolution.source();
        let message = match source {
            Source::Cache => "DANFE encontrada no cache local",
            Source::Remote => "DANFE encontrada no servidor e salva no cache",
        };

        Self {
            success: true,
            data: Some(resolution.into_payload()),
            message: message.to_string(),
            source: Some(source),
        }
    }

    /// Builds a failure body with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            source: None,
        }
    }
}

/// Response body for the history listing (GET /api/danfe/historico)
#[derive(Debug, Clone, Serialize)]
pub struct HistoricoResponse {
    pub success: bool,
    /// Number of summaries returned
    pub total: usize,
    /// Payload-free record summaries, newest first
    pub danfes: Vec<RecordSummary>,
}

impl HistoricoResponse {
    /// Creates a new HistoricoResponse from a listing
    pub fn new(danfes: Vec<RecordSummary>) -> Self {
        Self {
            success: true,
            total: danfes.len(),
            danfes,
        }
    }
}

/// Response body for the stats endpoint (GET /api/danfe/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    /// Aggregate store counters
    pub data: StoreStats,
}

impl StatsResponse {
    /// Creates a new StatsResponse
    pub fn new(data: StoreStats) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Response body for the single-record delete (DELETE /api/danfe/:chave)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    /// Success message
    pub message: String,
    /// The key whose record was removed
    #[serde(rename = "chaveAcesso")]
    pub chave_acesso: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(chave_acesso: impl Into<String>) -> Self {
        let chave_acesso = chave_acesso.into();
        Self {
            success: true,
            message: format!("DANFE {} removida do cache", chave_acesso),
            chave_acesso,
        }
    }
}

/// Response body for the full wipe (DELETE /api/danfe)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    /// Number of records removed
    pub removed: u64,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new(removed: u64) -> Self {
        Self {
            success: true,
            removed,
        }
    }
}

/// Response body for the MCP status probe (GET /api/mcp/status)
#[derive(Debug, Clone, Serialize)]
pub struct McpStatusResponse {
    /// Either "online" or "offline"
    pub status: String,
    /// Endpoint that was probed
    pub url: String,
    /// Probe failure description when offline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl McpStatusResponse {
    /// Status body for a reachable server
    pub fn online(url: impl Into<String>) -> Self {
        Self {
            status: "online".to_string(),
            url: url.into(),
            error: None,
        }
    }

    /// Status body for an unreachable server
    pub fn offline(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: "offline".to_string(),
            url: url.into(),
            error: Some(error.into()),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
