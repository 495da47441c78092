//! JSON-RPC 2.0 Transport
//!
//! Thin client for the MCP server. Builds the request envelope, allocates
//! monotonically increasing ids and maps every failure mode onto
//! [`RpcError`]. Callers receive the `result` member already unwrapped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::RpcError;

/// Header carrying the MCP API key.
const API_KEY_HEADER: &str = "X-API-Key";

// == Wire Envelopes ==
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

// == RPC Client ==
/// JSON-RPC client bound to a single MCP endpoint.
///
/// Cheap to share behind an `Arc`; the id counter is process wide so
/// concurrent calls never reuse an id.
#[derive(Debug)]
pub struct RpcClient {
    /// Underlying HTTP client with pooled connections
    http: reqwest::Client,
    /// Endpoint URL, stored without a trailing slash
    endpoint: String,
    /// Optional API key sent on every call
    api_key: Option<String>,
    /// Next request id
    next_id: AtomicU64,
    /// Per-call deadline
    timeout: Duration,
}

impl RpcClient {
    /// Builds a client from the server configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.mcp_server_url.trim_end_matches('/').to_string(),
            api_key: config.mcp_api_key.clone(),
            next_id: AtomicU64::new(1),
            timeout: Duration::from_secs(config.rpc_timeout_secs),
        }
    }

    /// Returns the endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Performs a single JSON-RPC call.
    ///
    /// Pass `Value::Null` as `params` to omit the member entirely.
    ///
    /// # Arguments
    /// * `method` - JSON-RPC method name, for example `tools/call`
    /// * `params` - Parameters object, or `Value::Null` for none
    ///
    /// # Returns
    /// * `Ok(Value)` with the `result` member (`{}` when the server sent none)
    /// * `Err(RpcError)` for transport failures, timeouts and error envelopes
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let envelope = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let mut request = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json, text/event-stream");
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request
            .json(&envelope)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| self.classify(err))?;

        let parsed: RpcResponse = match serde_json::from_slice(&bytes) {
            Ok(parsed) => parsed,
            Err(err) if status.is_success() => {
                return Err(RpcError::Transport(format!(
                    "unparseable RPC response: {err}"
                )));
            }
            Err(_) => {
                return Err(RpcError::Transport(format!(
                    "HTTP {status} from RPC endpoint"
                )));
            }
        };

        // A JSON-RPC error object wins over the HTTP status: the server
        // spoke the protocol and rejected the call.
        if let Some(error) = parsed.error {
            return Err(RpcError::Protocol {
                code: error.code,
                message: error.message,
            });
        }

        if !status.is_success() {
            return Err(RpcError::Transport(format!(
                "HTTP {status} from RPC endpoint"
            )));
        }

        Ok(normalize_result(parsed.result))
    }

    fn classify(&self, err: reqwest::Error) -> RpcError {
        if err.is_timeout() {
            RpcError::Timeout(self.timeout.as_secs())
        } else {
            RpcError::Transport(err.to_string())
        }
    }
}

/// Collapses an absent or `null` result into an empty object so callers
/// always see a `Value`.
fn normalize_result(result: Option<Value>) -> Value {
    match result {
        None | Some(Value::Null) => json!({}),
        Some(value) => value,
    }
}
