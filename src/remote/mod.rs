//! Remote document retrieval.
//!
//! [`RpcClient`] speaks JSON-RPC 2.0 to the MCP server and [`McpGateway`]
//! layers the DANFE tool sequence on top of it. The resolver only sees the
//! [`DocumentSource`] trait.

mod gateway;
mod rpc;

pub use gateway::{DocumentSource, McpGateway};
pub use rpc::RpcClient;
