//! API Module
//!
//! HTTP handlers and routing for the resolver REST API.
//!
//! # Endpoints
//! - `POST /api/danfe/buscar` - Resolve a DANFE by access key
//! - `GET /api/danfe/historico` - List recently resolved documents
//! - `GET /api/danfe/stats` - Store statistics
//! - `DELETE /api/danfe/:chave` - Remove one cached record
//! - `DELETE /api/danfe` - Remove every cached record
//! - `GET /api/mcp/status` - Probe the MCP server
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
