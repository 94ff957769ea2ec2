//! Universal error types for Chainfolio.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Chainfolio data operations.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Price oracle error: {0}")]
    Oracle(String),

    #[error("RPC error (chain {chain_id}): {message}")]
    Rpc { chain_id: u64, message: String },

    #[error("Timed out after {after:?}: {what}")]
    Timeout { what: String, after: Duration },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl FolioError {
    /// Machine-readable error code for JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            FolioError::Oracle(_) => "ORACLE_UNAVAILABLE",
            FolioError::Rpc { .. } => "RPC_ERROR",
            FolioError::Timeout { .. } => "TIMEOUT",
            FolioError::InvalidAddress(_) => "INVALID_ADDRESS",
            FolioError::InvalidQuery(_) => "INVALID_QUERY",
            FolioError::Config(_) => "CONFIG_ERROR",
            FolioError::Fixture(_) => "FIXTURE_ERROR",
            FolioError::Network(_) => "NETWORK_ERROR",
        }
    }

    /// Whether the failure came from an upstream service rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            FolioError::Oracle(_)
                | FolioError::Rpc { .. }
                | FolioError::Timeout { .. }
                | FolioError::Network(_)
        )
    }
}

pub type FolioResult<T> = Result<T, FolioError>;
