//! Signing error types.

use thiserror::Error;

/// Errors raised while building or signing a transaction.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid hex in field '{field}': {value}")]
    InvalidHex { field: &'static str, value: String },

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("unsupported transaction: {0}")]
    Unsupported(String),

    #[error("signing failed: {0}")]
    Signature(String),

    #[error("invalid chain parameters: {0}")]
    InvalidChain(#[from] serde_json::Error),
}
