//! API Handlers
//!
//! HTTP request handlers for each resolver endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ApiError, ApiResult, GatewayError, ResolveError, RpcError};
use crate::key::AccessKey;
use crate::models::{
    BuscarRequest, BuscarResponse, ClearResponse, DeleteResponse, HealthResponse, HistoricoQuery,
    HistoricoResponse, McpStatusResponse, StatsResponse,
};
use crate::remote::{DocumentSource, McpGateway, RpcClient};
use crate::resolver::Resolver;
use crate::store::{DocumentStore, MemoryStore};

/// Application state shared across all handlers.
///
/// Holds the resolver plus direct handles on the store and the RPC client
/// for the maintenance and status endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Cache-first document resolver
    pub resolver: Arc<Resolver>,
    /// Persistent record store
    pub store: Arc<dyn DocumentStore>,
    /// RPC transport, used directly by the status probe
    pub rpc: Arc<RpcClient>,
}

impl AppState {
    /// Creates a new AppState from already-built components.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        source: Arc<dyn DocumentSource>,
        rpc: Arc<RpcClient>,
    ) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(store.clone(), source)),
            store,
            rpc,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Wires the memory store, the RPC client and the MCP gateway together.
    pub fn from_config(config: &Config) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let rpc = Arc::new(RpcClient::new(config));
        let gateway = Arc::new(McpGateway::new(rpc.clone(), config.strict_register));
        Self::new(store, gateway, rpc)
    }
}

/// Handler for POST /api/danfe/buscar
///
/// Resolves an access key to a document, serving from the cache when
/// possible. Failures come back in the same `{success, message}` shape as
/// successes so agent clients can branch on one contract.
pub async fn buscar_handler(
    State(state): State<AppState>,
    Json(req): Json<BuscarRequest>,
) -> (StatusCode, Json<BuscarResponse>) {
    match state.resolver.resolve_document(&req.chave_acesso).await {
        Ok(resolution) => (
            StatusCode::OK,
            Json(BuscarResponse::from_resolution(resolution)),
        ),
        Err(err) => {
            let status = resolve_status(&err);
            if status.is_server_error() {
                warn!(error = %err, "document lookup failed");
            }
            (status, Json(BuscarResponse::failure(err.to_string())))
        }
    }
}

/// Maps resolution failures onto HTTP status codes.
fn resolve_status(err: &ResolveError) -> StatusCode {
    match err {
        ResolveError::Validation(_) => StatusCode::BAD_REQUEST,
        ResolveError::Gateway(GatewayError::NotFound) => StatusCode::NOT_FOUND,
        ResolveError::Gateway(_) => StatusCode::BAD_GATEWAY,
        ResolveError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handler for GET /api/danfe/historico
///
/// Lists recently resolved documents without their payloads.
pub async fn historico_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoricoQuery>,
) -> ApiResult<Json<HistoricoResponse>> {
    let limit = query.effective_limit().map_err(ApiError::BadRequest)?;
    let danfes = state.store.list_recent(limit).await?;

    Ok(Json(HistoricoResponse::new(danfes)))
}

/// Handler for GET /api/danfe/stats
///
/// Returns aggregate counters over the stored documents.
pub async fn stats_handler(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.store.stats().await?;

    Ok(Json(StatsResponse::new(stats)))
}

/// Handler for DELETE /api/danfe/:chave
///
/// Removes a single record from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(chave): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let key = AccessKey::parse(&chave).map_err(|err| ApiError::BadRequest(err.to_string()))?;

    if state.store.delete_by_key(&key).await? {
        info!(key = %key, "record removed from cache");
        Ok(Json(DeleteResponse::new(key.as_str())))
    } else {
        Err(ApiError::NotFound(format!("DANFE {key} não está no cache")))
    }
}

/// Handler for DELETE /api/danfe
///
/// Removes every record from the cache.
pub async fn clear_handler(State(state): State<AppState>) -> ApiResult<Json<ClearResponse>> {
    let removed = state.store.delete_all().await?;
    info!(removed, "cache cleared");

    Ok(Json(ClearResponse::new(removed)))
}

/// Handler for GET /api/mcp/status
///
/// Probes the MCP server with a `tools/list` call.
pub async fn mcp_status_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<McpStatusResponse>) {
    let url = state.rpc.endpoint().to_string();

    match state.rpc.call("tools/list", Value::Null).await {
        // A protocol-level error still proves the server answers RPC
        Ok(_) | Err(RpcError::Protocol { .. }) => {
            (StatusCode::OK, Json(McpStatusResponse::online(url)))
        }
        Err(err) => {
            warn!(error = %err, "MCP status probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(McpStatusResponse::offline(url, err.to_string())),
            )
        }
    }
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
