//! wseth-core: foundation types for the wseth WebSocket JSON-RPC client.
//!
//! # Overview
//!
//! - [`RpcTransport`]: the async call surface clients implement
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] / [`Inbound`]: wire types
//! - [`CorrelationTable`] / [`RequestIds`]: matching responses to calls
//! - [`ClientError`]: structured error type
//! - [`hex`]: quantity and hash helpers

pub mod correlation;
pub mod error;
pub mod hex;
pub mod request;
pub mod transport;

pub use correlation::{CorrelationTable, RequestIds};
pub use error::ClientError;
pub use request::{
    flatten_params, Inbound, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam,
    SubscriptionNotification,
};
pub use transport::{ConnectionState, RpcTransport};
