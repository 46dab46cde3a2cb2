//! wseth-ws: WebSocket JSON-RPC client for Ethereum nodes.
//!
//! # Features
//! - Request multiplexing over a single connection, correlated by id
//! - Calls made before the socket opens are queued, then sent in order
//! - Subscriptions (`eth_subscribe` / `eth_unsubscribe`) re-emitted under
//!   their logical channel name
//! - Per-call confirmation tracking: `TxHash`, then a receipt (or a timeout)
//!   driven by `newHeads`
//! - Transaction signing through a pluggable [`TransactionSigner`](wseth_signer::TransactionSigner)
//!
//! # Quick start
//! ```rust,no_run
//! use wseth_ws::{ClientConfig, WsEthClient};
//!
//! # async fn run() -> Result<(), wseth_core::ClientError> {
//! let client = WsEthClient::connect("wss://eth.example.org", ClientConfig::default()).await?;
//! client.subscribe("newHeads", |_| {});
//!
//! let (response, events) = client
//!     .call("eth_sendRawTransaction", "0xf86c...", None)
//!     .split();
//! let hash = response.await?;
//! let receipt = events.receipt().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod socket;
pub mod subscriptions;
pub mod tracker;

pub use client::{
    CallResponse, ChannelEvents, ClientConfig, ConnectionEvent, RpcCall, TxEvents, WsEthClient,
    NEW_HEADS,
};
pub use socket::{Frame, Socket, SocketEvent, SocketPeer};
pub use subscriptions::{EventRouter, SubscriptionId};
pub use tracker::{ConfirmationTracker, TxError, TxEvent, TxReceipt, DEFAULT_CONFIRMATION_BLOCKS};
