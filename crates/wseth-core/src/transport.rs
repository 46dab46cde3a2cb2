//! The `RpcTransport` trait: the call surface shared by wseth clients.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// Lifecycle of a persistent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Socket handshake in progress; calls are queued.
    Connecting,
    /// Calls are transmitted immediately.
    Open,
    /// Terminal. Calls fail with [`ClientError::ConnectionClosed`].
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// The async call surface every wseth client implements.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Issue `method` with positional `params` and return the raw result.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ClientError>;

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Return the transport's identifier (URL or name).
    fn url(&self) -> &str;

    /// Convenience: call a method and deserialize the result.
    async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ClientError>
    where
        Self: Sized,
    {
        let result = self.request(method, params).await?;
        serde_json::from_value(result).map_err(ClientError::Deserialization)
    }
}
