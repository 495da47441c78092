//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the MCP document server
    pub mcp_server_url: String,
    /// Optional API key sent as `X-API-Key` on every RPC call
    pub mcp_api_key: Option<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Per-call timeout for RPC requests in seconds
    pub rpc_timeout_secs: u64,
    /// Treat a failed registration call as fatal instead of falling through to the fetch
    pub strict_register: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MCP_SERVER_URL` - MCP server base URL (default: http://127.0.0.1:8000)
    /// - `MCP_API_KEY` - API key for the MCP server (default: unset)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `RPC_TIMEOUT_SECS` - RPC call timeout in seconds (default: 30)
    /// - `STRICT_REGISTER` - Fail resolution when registration fails (default: false)
    pub fn from_env() -> Self {
        Self {
            mcp_server_url: env::var("MCP_SERVER_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "http://127.0.0.1:8000".to_string()),
            mcp_api_key: env::var("MCP_API_KEY").ok().filter(|v| !v.is_empty()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            rpc_timeout_secs: env::var("RPC_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            strict_register: env::var("STRICT_REGISTER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mcp_server_url: "http://127.0.0.1:8000".to_string(),
            mcp_api_key: None,
            server_port: 3000,
            rpc_timeout_secs: 30,
            strict_register: false,
        }
    }
}
