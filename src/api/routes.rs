//! API Routes
//!
//! Configures the Axum router with all resolver endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    buscar_handler, clear_handler, delete_handler, health_handler, historico_handler,
    mcp_status_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /api/danfe/buscar` - Resolve a DANFE by access key
/// - `GET /api/danfe/historico` - List recently resolved documents
/// - `GET /api/danfe/stats` - Store statistics
/// - `DELETE /api/danfe/:chave` - Remove one cached record
/// - `DELETE /api/danfe` - Remove every cached record
/// - `GET /api/mcp/status` - Probe the MCP server
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/api/danfe/buscar", post(buscar_handler))
        .route("/api/danfe/historico", get(historico_handler))
        .route("/api/danfe/stats", get(stats_handler))
        .route("/api/danfe/:chave", delete(delete_handler))
        .route("/api/danfe", delete(clear_handler))
        .route("/api/mcp/status", get(mcp_status_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
