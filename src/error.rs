//! Error types for the contract and its host state.

use thiserror::Error;

/// Errors raised by the host key-value state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("State unavailable: {0}")]
    Unavailable(String),
}

/// Main error type for contract operations.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Invalid composite key part: {0}")]
    InvalidKeyPart(String),

    #[error("Malformed composite key: {0:?}")]
    MalformedKey(String),

    #[error("Index scan failed on {index}: {source}")]
    IndexScan {
        index: String,
        #[source]
        source: StoreError,
    },

    #[error("Invalid smart contract function name: {0}")]
    UnknownOperation(String),

    #[error("Incorrect number of arguments for {operation}. Expecting {expected}, got {got}")]
    ArityMismatch {
        operation: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<serde_json::Error> for ContractError {
    fn from(e: serde_json::Error) -> Self {
        ContractError::Serialization(e.to_string())
    }
}

/// Result type for contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Result type for host state operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
