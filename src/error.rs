//! Error types for the DANFE resolver
//!
//! Provides unified error handling using thiserror. Each layer owns its own
//! error enum and the resolver ties them together, so callers can match on
//! exactly the failures their layer can produce.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Validation Error Enum ==
/// Rejections produced by access key validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Key does not have exactly 44 characters
    #[error("A chave de acesso deve ter exatamente 44 dígitos (recebido: {length})")]
    WrongLength { length: usize },

    /// Key has 44 characters but at least one is not an ASCII digit
    #[error("A chave de acesso deve conter apenas números")]
    NonNumeric,
}

// == RPC Error Enum ==
/// Failures of a single JSON-RPC call.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Connection, DNS or response-decoding failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// The call did not complete within the configured deadline
    #[error("RPC call timed out after {0}s")]
    Timeout(u64),

    /// The server answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Protocol { code: i64, message: String },
}

// == Gateway Error Enum ==
/// Failures of the two-step document retrieval against the MCP server.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The registration step failed and strict mode is on
    #[error("document registration was rejected by the MCP server: {0}")]
    RegisterFailed(RpcError),

    /// The fetch step failed
    #[error("failed to fetch document from the MCP server: {cause}")]
    FetchFailed { cause: RpcError },

    /// The server completed the call but holds no document for the key
    #[error("DANFE não encontrada no servidor")]
    NotFound,
}

// == Store Error Enum ==
/// Failures of the persistent document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record for this access key already exists
    #[error("a record already exists for access key {0}")]
    DuplicateKey(String),

    /// Backend failure unrelated to the request
    #[error("store failure: {0}")]
    Internal(String),
}

// == Resolve Error Enum ==
/// Anything that can go wrong while resolving a document end to end.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// == API Error Enum ==
/// HTTP-facing error with a JSON body in the `{success, error}` shape.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
