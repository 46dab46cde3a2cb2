//! Client-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while issuing or awaiting an RPC call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// WebSocket connection/send/receive error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// The connection closed before the call completed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The call stayed unresolved for longer than the pending-request horizon.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// A request id was registered twice on one connection.
    #[error("Duplicate request id {0}")]
    DuplicateId(u64),

    /// Payload could not be (de)serialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Returns `true` if the failure came from the socket rather than the node.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::WebSocket(_) | Self::ConnectionClosed)
    }

    /// Returns `true` if this is a node-side error response.
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// The node's error object, if the call was rejected by the node.
    pub fn rpc_error(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Rpc(err) => Some(err),
            _ => None,
        }
    }
}
