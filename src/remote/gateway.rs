//! Remote Document Gateway
//!
//! Retrieves a DANFE from the MCP server with the two-step tool sequence:
//! register the key with `add_danfe`, then fetch the document with
//! `get_danfe_xml`. The [`DocumentSource`] trait is the seam the resolver
//! depends on, so tests can swap the whole remote side out.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{GatewayError, RpcError};
use crate::key::AccessKey;
use crate::remote::rpc::RpcClient;

/// Tool that registers an access key with the MCP server.
const REGISTER_TOOL: &str = "add_danfe";

/// Tool that returns the document for a registered key.
const FETCH_TOOL: &str = "get_danfe_xml";

// == Document Source Trait ==
/// Anything that can produce the document payload for an access key.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches the document payload for `key` from the remote side.
    async fn resolve(&self, key: &AccessKey) -> Result<Value, GatewayError>;
}

// == MCP Gateway ==
/// [`DocumentSource`] backed by a live MCP server.
#[derive(Debug)]
pub struct McpGateway {
    /// Shared RPC transport
    client: Arc<RpcClient>,
    /// Whether a failed registration aborts the resolution
    strict_register: bool,
}

impl McpGateway {
    /// Creates a gateway over an existing RPC client.
    pub fn new(client: Arc<RpcClient>, strict_register: bool) -> Self {
        Self {
            client,
            strict_register,
        }
    }

    async fn call_tool(&self, tool: &str, key: &AccessKey) -> Result<Value, RpcError> {
        self.client
            .call(
                "tools/call",
                json!({
                    "name": tool,
                    "arguments": { "chaveAcesso": key.as_str() }
                }),
            )
            .await
    }
}

#[async_trait]
impl DocumentSource for McpGateway {
    /// Runs the register-then-fetch sequence for `key`.
    ///
    /// The registration step is advisory unless strict mode is on: the MCP
    /// server registers keys idempotently, so a failure here usually means
    /// the key was already known and the fetch can still succeed.
    async fn resolve(&self, key: &AccessKey) -> Result<Value, GatewayError> {
        match self.call_tool(REGISTER_TOOL, key).await {
            Ok(_) => debug!(key = %key, "document registered with the MCP server"),
            Err(err) if self.strict_register => return Err(GatewayError::RegisterFailed(err)),
            Err(err) => {
                warn!(key = %key, error = %err, "register call failed, attempting fetch anyway")
            }
        }

        let result = self
            .call_tool(FETCH_TOOL, key)
            .await
            .map_err(|cause| GatewayError::FetchFailed { cause })?;

        if is_not_found(&result) {
            return Err(GatewayError::NotFound);
        }

        Ok(result)
    }
}

/// Decides whether a tool result means the server holds no document.
///
/// Covers the MCP error marker (`isError: true`) as well as the empty
/// shapes a server may answer with: `null`, `{}`, an empty array or an
/// empty `content` list.
fn is_not_found(result: &Value) -> bool {
    if result.get("isError").and_then(Value::as_bool) == Some(true) {
        return true;
    }

    match result {
        Value::Null => true,
        Value::Object(map) => match map.get("content") {
            Some(Value::Array(items)) => items.is_empty(),
            _ => map.is_empty(),
        },
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
