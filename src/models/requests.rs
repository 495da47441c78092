//! Request DTOs for the resolver API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::store::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// Request body for the document lookup (POST /api/danfe/buscar)
///
/// # Fields
/// - `chave_acesso`: The 44 digit access key, validated by the resolver
#[derive(Debug, Clone, Deserialize)]
pub struct BuscarRequest {
    /// The access key as sent by the client
    #[serde(rename = "chaveAcesso")]
    pub chave_acesso: String,
}

/// Query string for the history listing (GET /api/danfe/historico)
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricoQuery {
    /// Requested page size
    #[serde(default)]
    pub limit: Option<usize>,
}

impl HistoricoQuery {
    /// Resolves the page size to use for the listing.
    ///
    /// Returns an error message when the requested limit falls outside
    /// the accepted range of 1 to 500.
    pub fn effective_limit(&self) -> Result<usize, String> {
        match self.limit {
            None => Ok(DEFAULT_LIST_LIMIT),
            Some(limit) if (1..=MAX_LIST_LIMIT).contains(&limit) => Ok(limit),
            Some(_) => Err(format!("O limite deve estar entre 1 e {MAX_LIST_LIMIT}")),
        }
    }
}
