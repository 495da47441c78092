//! DANFE Resolver - cache-first document lookup server
//!
//! Validates 44 digit access keys, serves documents from a persistent cache
//! and falls back to an MCP document server over JSON-RPC on a miss.

pub mod api;
pub mod config;
pub mod error;
pub mod key;
pub mod models;
pub mod remote;
pub mod resolver;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use resolver::{Resolution, Resolver, Source};
