//! WebSocket JSON-RPC client with subscriptions and confirmation tracking.

use std::collections::VecDeque;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, Stream};
use futures::{FutureExt, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time;

use wseth_core::correlation::{CorrelationTable, RequestIds};
use wseth_core::error::ClientError;
use wseth_core::hex::parse_hex_u64;
use wseth_core::request::{flatten_params, Inbound, JsonRpcRequest, SubscriptionNotification};
use wseth_core::transport::{ConnectionState, RpcTransport};
use wseth_signer::{ChainParams, LocalSigner, SignerError, TransactionSigner, TxData};

use crate::socket::{Frame, Socket, SocketEvent};
use crate::subscriptions::{EventRouter, SubscriptionId};
use crate::tracker::{
    ConfirmationTracker, ReceiptPoll, TxError, TxEvent, TxReceipt, DEFAULT_CONFIRMATION_BLOCKS,
};

/// Channel whose pushes drive confirmation tracking.
pub const NEW_HEADS: &str = "newHeads";

/// Configuration for the WebSocket client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Blocks to wait for a receipt before reporting a timeout.
    pub confirmation_blocks: u64,
    /// Calls still unanswered after this long are rejected with
    /// [`ClientError::Timeout`]; emitters that never saw a hash are dropped.
    pub request_horizon: Duration,
    /// How often the horizon is enforced.
    pub sweep_interval: Duration,
    /// Buffer of the connection event broadcast.
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            confirmation_blocks: DEFAULT_CONFIRMATION_BLOCKS,
            request_horizon: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(30),
            event_capacity: 256,
        }
    }
}

/// Connection-level events.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Open,
    Close { reason: Option<String> },
    /// An `eth_subscribe` call failed.
    SubError { channel: String, error: String },
    /// A subscription push, re-emitted under its logical channel name.
    Notification { channel: String, payload: Value },
}

type SubscribeCallback = Box<dyn FnOnce(Result<SubscriptionId, ClientError>) + Send>;

/// Command sent from callers to the connection task.
enum Command {
    Call {
        method: String,
        params: Vec<Value>,
        reply: oneshot::Sender<Result<Value, ClientError>>,
        events: mpsc::UnboundedSender<TxEvent>,
    },
    Subscribe {
        channel: String,
        params: Vec<Value>,
        callback: SubscribeCallback,
    },
    Unsubscribe {
        id: SubscriptionId,
        reply: oneshot::Sender<Result<bool, ClientError>>,
    },
    Close,
}

/// What to do when a pending request completes.
enum Continuation {
    Caller(oneshot::Sender<Result<Value, ClientError>>),
    Subscribe {
        channel: String,
        callback: SubscribeCallback,
    },
    Unsubscribe {
        id: SubscriptionId,
        reply: oneshot::Sender<Result<bool, ClientError>>,
    },
    Receipt(ReceiptPoll),
}

/// The terminal outcome of one call.
pub struct CallResponse {
    rx: oneshot::Receiver<Result<Value, ClientError>>,
}

impl Future for CallResponse {
    type Output = Result<Value, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|r| r.unwrap_or_else(|_| Err(ClientError::ConnectionClosed)))
    }
}

/// Lifecycle events of one call: `TxHash`, then at most one `Receipt`.
///
/// Receipts are only polled for while this stream is alive; dropping it
/// stops tracking.
pub struct TxEvents {
    rx: mpsc::UnboundedReceiver<TxEvent>,
}

impl TxEvents {
    pub async fn recv(&mut self) -> Option<TxEvent> {
        self.rx.recv().await
    }

    /// Wait for the terminal receipt event, skipping `TxHash`.
    pub async fn receipt(mut self) -> Result<TxReceipt, TxError> {
        while let Some(event) = self.rx.recv().await {
            if let TxEvent::Receipt(outcome) = event {
                return outcome;
            }
        }
        Err(TxError::ConnectionClosed)
    }

    /// Stop tracking without dropping the handle.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl Stream for TxEvents {
    type Item = TxEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<TxEvent>> {
        self.rx.poll_recv(cx)
    }
}

/// Handle returned by [`WsEthClient::call`].
///
/// Await it for the RPC result, or [`split`](RpcCall::split) it to also
/// follow the transaction's confirmation.
pub struct RpcCall {
    response: CallResponse,
    events: TxEvents,
}

impl RpcCall {
    pub fn split(self) -> (CallResponse, TxEvents) {
        (self.response, self.events)
    }
}

impl IntoFuture for RpcCall {
    type Output = Result<Value, ClientError>;
    type IntoFuture = CallResponse;

    fn into_future(self) -> CallResponse {
        self.response
    }
}

/// Payloads pushed on a single logical channel.
pub struct ChannelEvents {
    channel: String,
    rx: broadcast::Receiver<ConnectionEvent>,
}

impl ChannelEvents {
    /// Next payload, or `None` once the connection is closed.
    pub async fn recv(&mut self) -> Option<Value> {
        loop {
            match self.rx.recv().await {
                Ok(ConnectionEvent::Notification { channel, payload }) if channel == self.channel => {
                    return Some(payload)
                }
                Ok(ConnectionEvent::Close { .. }) => return None,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(channel = %self.channel, skipped, "channel receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

/// WebSocket JSON-RPC client.
///
/// A background task owns the socket, the table of pending calls, the
/// subscription routes and the confirmation tracker. The handle only sends
/// commands to it, so none of that state is shared or locked.
pub struct WsEthClient {
    url: String,
    cmd_tx: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<ConnectionEvent>,
    chain: Option<ChainParams>,
    signer: Arc<dyn TransactionSigner>,
}

impl WsEthClient {
    /// Dial `url` and start the background task. Returns while the socket
    /// is still connecting; calls made before it opens are queued.
    pub async fn connect(
        url: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let url = url.into();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ClientError::WebSocket(format!(
                "expected a ws:// or wss:// URL, got {url}"
            )));
        }
        let socket = Socket::connect(url.clone());
        Ok(Self::with_socket(url, socket, config))
    }

    /// Run the client over an already established socket.
    pub fn with_socket(url: impl Into<String>, socket: Socket, config: ClientConfig) -> Self {
        let url = url.into();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let Socket {
            frames,
            events: socket_events,
        } = socket;

        let connection = Connection {
            url: url.clone(),
            tracker: ConfirmationTracker::new(config.confirmation_blocks),
            config,
            state: state_tx,
            ids: RequestIds::new(),
            pending: CorrelationTable::new(),
            router: EventRouter::new(),
            deferred: VecDeque::new(),
            events: events.clone(),
            frames,
            acks: FuturesUnordered::new(),
        };
        tokio::spawn(connection.run(cmd_rx, socket_events));

        Self {
            url,
            cmd_tx,
            state: state_rx,
            events,
            chain: None,
            signer: Arc::new(LocalSigner),
        }
    }

    /// Replace the signing collaborator.
    pub fn with_signer(mut self, signer: Arc<dyn TransactionSigner>) -> Self {
        self.signer = signer;
        self
    }

    /// Issue `method`.
    ///
    /// `params` may be an array (spread into the envelope) or a single
    /// value. `default_block` is appended last, and only when truthy.
    pub fn call(
        &self,
        method: impl Into<String>,
        params: impl Into<Value>,
        default_block: Option<Value>,
    ) -> RpcCall {
        let (reply, rx) = oneshot::channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        // A closed task drops the reply sender, which surfaces as ConnectionClosed.
        let _ = self.cmd_tx.send(Command::Call {
            method: method.into(),
            params: flatten_params(params.into(), default_block),
            reply,
            events: events_tx,
        });
        RpcCall {
            response: CallResponse { rx },
            events: TxEvents { rx: events_rx },
        }
    }

    /// Subscribe to `channel` (e.g. `"newHeads"`). Pushes are re-emitted as
    /// [`ConnectionEvent::Notification`] under the same name.
    ///
    /// `callback` runs on the connection task; keep it short.
    pub fn subscribe<F>(&self, channel: impl Into<String>, callback: F) -> &Self
    where
        F: FnOnce(Result<SubscriptionId, ClientError>) + Send + 'static,
    {
        self.subscribe_with_params(channel, Vec::new(), callback)
    }

    /// Like [`subscribe`](Self::subscribe), with extra `eth_subscribe`
    /// params after the channel name (e.g. a logs filter).
    pub fn subscribe_with_params<F>(
        &self,
        channel: impl Into<String>,
        params: Vec<Value>,
        callback: F,
    ) -> &Self
    where
        F: FnOnce(Result<SubscriptionId, ClientError>) + Send + 'static,
    {
        let cmd = Command::Subscribe {
            channel: channel.into(),
            params,
            callback: Box::new(callback),
        };
        if let Err(mpsc::error::SendError(cmd)) = self.cmd_tx.send(cmd) {
            fail_command(cmd, ClientError::ConnectionClosed);
        }
        self
    }

    /// Subscribe and wait for the server-assigned id.
    pub async fn subscribe_channel(
        &self,
        channel: impl Into<String>,
    ) -> Result<SubscriptionId, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.subscribe(channel, move |outcome| {
            let _ = tx.send(outcome);
        });
        rx.await.unwrap_or_else(|_| Err(ClientError::ConnectionClosed))
    }

    /// Cancel a subscription with `eth_unsubscribe` and stop routing it.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, ClientError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Unsubscribe { id, reply });
        rx.await.unwrap_or_else(|_| Err(ClientError::ConnectionClosed))
    }

    /// All connection events.
    pub fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Pushes for one logical channel.
    pub fn channel(&self, name: impl Into<String>) -> ChannelEvents {
        ChannelEvents {
            channel: name.into(),
            rx: self.events.subscribe(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Wait until the socket opens. Fails if it closes first.
    pub async fn wait_open(&self) -> Result<(), ClientError> {
        let mut state = self.state.clone();
        let reached = state
            .wait_for(|s| *s != ConnectionState::Connecting)
            .await
            .map(|s| *s)
            .unwrap_or(ConnectionState::Closed);
        match reached {
            ConnectionState::Open => Ok(()),
            _ => Err(ClientError::ConnectionClosed),
        }
    }

    /// Set the default chain used by [`sign_transaction`](Self::sign_transaction).
    pub fn set_chain_params(&mut self, chain: Option<ChainParams>) -> Option<&ChainParams> {
        self.chain = chain;
        self.chain.as_ref()
    }

    pub fn chain_params(&self) -> Option<&ChainParams> {
        self.chain.as_ref()
    }

    /// Sign with the per-call chain, else the connection default.
    pub fn sign_transaction(
        &self,
        tx: &TxData,
        private_key_hex: &str,
        chain: Option<&ChainParams>,
    ) -> Result<String, SignerError> {
        self.signer
            .sign(tx, private_key_hex, chain.or(self.chain.as_ref()))
    }

    /// Sign `tx` and submit it with `eth_sendRawTransaction`.
    pub fn send_transaction(
        &self,
        tx: &TxData,
        private_key_hex: &str,
        chain: Option<&ChainParams>,
    ) -> Result<RpcCall, SignerError> {
        let raw = self.sign_transaction(tx, private_key_hex, chain)?;
        Ok(self.call("eth_sendRawTransaction", Value::String(raw), None))
    }

    /// Close the connection. Pending calls fail with `ConnectionClosed`.
    pub fn close(&self) {
        let _ = self.cmd_tx.send(Command::Close);
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for WsEthClient {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(Command::Close);
    }
}

#[async_trait]
impl RpcTransport for WsEthClient {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ClientError> {
        self.call(method, Value::Array(params), None).await
    }

    fn state(&self) -> ConnectionState {
        WsEthClient::state(self)
    }

    fn url(&self) -> &str {
        &self.url
    }
}

fn fail_command(cmd: Command, error: ClientError) {
    match cmd {
        Command::Call { reply, .. } => {
            let _ = reply.send(Err(error));
        }
        Command::Subscribe { callback, .. } => callback(Err(error)),
        Command::Unsubscribe { reply, .. } => {
            let _ = reply.send(Err(error));
        }
        Command::Close => {}
    }
}

/// State owned by the connection task.
struct Connection {
    url: String,
    config: ClientConfig,
    state: watch::Sender<ConnectionState>,
    ids: RequestIds,
    pending: CorrelationTable<Continuation>,
    router: EventRouter,
    tracker: ConfirmationTracker,
    /// Commands received before the socket opened, in arrival order.
    deferred: VecDeque<Command>,
    events: broadcast::Sender<ConnectionEvent>,
    frames: mpsc::UnboundedSender<Frame>,
    /// Write acknowledgements, tagged with the request id.
    acks: FuturesUnordered<BoxFuture<'static, (u64, Result<(), ClientError>)>>,
}

impl Connection {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut socket: mpsc::UnboundedReceiver<SocketEvent>,
    ) {
        let mut sweep = time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        sweep.tick().await;

        loop {
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        None | Some(Command::Close) => {
                            self.shutdown(None);
                            return;
                        }
                        Some(cmd) => self.handle_command(cmd),
                    }
                }
                event = socket.recv() => {
                    match event {
                        Some(SocketEvent::Open) => self.on_open(),
                        Some(SocketEvent::Message(text)) => self.on_message(&text),
                        Some(SocketEvent::Close(reason)) => {
                            self.shutdown(reason);
                            return;
                        }
                        None => {
                            self.shutdown(Some("socket task ended".into()));
                            return;
                        }
                    }
                }
                Some((id, outcome)) = self.acks.next(), if !self.acks.is_empty() => {
                    self.on_sent(id, outcome);
                }
                _ = sweep.tick() => self.sweep(),
            }
        }
    }

    fn current_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn handle_command(&mut self, cmd: Command) {
        match self.current_state() {
            ConnectionState::Connecting => {
                self.deferred.push_back(cmd);
                tracing::debug!(queued = self.deferred.len(), "connection not open, deferring");
            }
            ConnectionState::Open => self.execute(cmd),
            ConnectionState::Closed => fail_command(cmd, ClientError::ConnectionClosed),
        }
    }

    fn execute(&mut self, cmd: Command) {
        match cmd {
            Command::Call {
                method,
                params,
                reply,
                events,
            } => {
                if let Some(id) = self.transmit(&method, params, Continuation::Caller(reply)) {
                    self.tracker.register(id, events);
                }
            }
            Command::Subscribe {
                channel,
                params,
                callback,
            } => {
                let mut all = Vec::with_capacity(params.len() + 1);
                all.push(Value::String(channel.clone()));
                all.extend(params);
                self.transmit("eth_subscribe", all, Continuation::Subscribe { channel, callback });
            }
            Command::Unsubscribe { id, reply } => {
                let params = vec![Value::String(id.0.clone())];
                self.transmit("eth_unsubscribe", params, Continuation::Unsubscribe { id, reply });
            }
            Command::Close => {}
        }
    }

    /// Assign an id, register the continuation and hand the frame to the
    /// socket. Returns the id if the request is now pending.
    fn transmit(
        &mut self,
        method: &str,
        params: Vec<Value>,
        continuation: Continuation,
    ) -> Option<u64> {
        let id = self.ids.next_id();
        let text = match serde_json::to_string(&JsonRpcRequest::new(id, method, params)) {
            Ok(text) => text,
            Err(e) => {
                self.complete(continuation, Err(ClientError::Deserialization(e)));
                return None;
            }
        };
        if let Err(e) = self.pending.register(id, continuation) {
            tracing::error!(id, error = %e, "request id collision");
            return None;
        }

        let (sent, ack) = oneshot::channel();
        if self.frames.send(Frame { text, sent }).is_err() {
            if let Some(continuation) = self.pending.take(id) {
                self.complete(continuation, Err(ClientError::WebSocket("socket closed".into())));
            }
            return None;
        }
        tracing::trace!(id, method, "request sent");
        // A dropped ack means the socket is gone; its Close event fails the call.
        self.acks
            .push(async move { (id, ack.await.unwrap_or(Ok(()))) }.boxed());
        Some(id)
    }

    fn on_sent(&mut self, id: u64, outcome: Result<(), ClientError>) {
        if let Err(e) = outcome {
            if let Some(continuation) = self.pending.take(id) {
                tracing::warn!(id, error = %e, "send failed");
                // Never written, so there is no hash to wait for.
                self.tracker.on_response(id, None);
                self.complete(continuation, Err(e));
            }
        }
    }

    /// Apply write outcomes that are already known, so a failed write is
    /// reported as itself even when the socket's `Close` is seen first.
    fn drain_ready_acks(&mut self) {
        while let Some(Some((id, outcome))) = self.acks.next().now_or_never() {
            self.on_sent(id, outcome);
        }
    }

    fn on_open(&mut self) {
        if self.current_state() != ConnectionState::Connecting {
            return;
        }
        tracing::info!(url = %self.url, deferred = self.deferred.len(), "connection open");
        self.state.send_replace(ConnectionState::Open);
        let _ = self.events.send(ConnectionEvent::Open);
        while let Some(cmd) = self.deferred.pop_front() {
            self.execute(cmd);
        }
    }

    fn on_message(&mut self, text: &str) {
        let Some(inbound) = Inbound::parse(text) else {
            tracing::trace!(bytes = text.len(), "ignoring non-JSON-RPC frame");
            return;
        };
        match inbound {
            Inbound::Notification(notification) => self.on_notification(notification),
            Inbound::Response(response) => {
                if let Some(id) = response.id.as_number() {
                    let result = response.result.as_ref().filter(|_| response.error.is_none());
                    self.tracker.on_response(id, result);
                }
                if let Some((continuation, outcome)) = self.pending.resolve(response) {
                    self.complete(continuation, outcome.map_err(ClientError::Rpc));
                }
            }
        }
    }

    fn on_notification(&mut self, notification: SubscriptionNotification) {
        let id = SubscriptionId(notification.subscription);
        let Some(channel) = self.router.route(&id).map(str::to_owned) else {
            tracing::debug!(subscription = %id, "dropping push for unknown subscription");
            return;
        };
        if channel == NEW_HEADS {
            self.on_new_block(&notification.result);
        }
        let _ = self.events.send(ConnectionEvent::Notification {
            channel,
            payload: notification.result,
        });
    }

    fn on_new_block(&mut self, header: &Value) {
        let Some(number) = header
            .get("number")
            .and_then(Value::as_str)
            .and_then(parse_hex_u64)
        else {
            tracing::warn!("newHeads push without a block number");
            return;
        };
        for poll in self.tracker.on_new_block(number) {
            let params = vec![Value::String(poll.tx_hash.clone())];
            self.transmit("eth_getTransactionReceipt", params, Continuation::Receipt(poll));
        }
    }

    fn complete(&mut self, continuation: Continuation, outcome: Result<Value, ClientError>) {
        match continuation {
            Continuation::Caller(reply) => {
                let _ = reply.send(outcome);
            }
            Continuation::Subscribe { channel, callback } => {
                let outcome = outcome.and_then(|v| {
                    SubscriptionId::from_result(&v).ok_or_else(|| {
                        ClientError::Other(format!("eth_subscribe returned no subscription id: {v}"))
                    })
                });
                match outcome {
                    Ok(id) => {
                        tracing::info!(channel = %channel, subscription = %id, "subscribed");
                        self.router.register(id.clone(), channel);
                        callback(Ok(id));
                    }
                    Err(e) => {
                        tracing::warn!(channel = %channel, error = %e, "subscription failed");
                        let _ = self.events.send(ConnectionEvent::SubError {
                            channel,
                            error: e.to_string(),
                        });
                        callback(Err(e));
                    }
                }
            }
            Continuation::Unsubscribe { id, reply } => {
                let outcome = outcome.map(|v| v.as_bool().unwrap_or(false));
                if outcome.is_ok() {
                    self.router.remove(&id);
                    tracing::info!(subscription = %id, "unsubscribed");
                }
                let _ = reply.send(outcome);
            }
            Continuation::Receipt(poll) => self.tracker.on_receipt(poll, outcome),
        }
    }

    fn sweep(&mut self) {
        let horizon = self.config.request_horizon;
        let now = Instant::now();
        for (id, continuation) in self.pending.expire(horizon, now) {
            tracing::warn!(id, "request expired without a response");
            self.tracker.on_response(id, None);
            self.complete(
                continuation,
                Err(ClientError::Timeout {
                    ms: horizon.as_millis() as u64,
                }),
            );
        }
        let pruned = self.tracker.prune(horizon, now);
        if pruned > 0 {
            tracing::debug!(pruned, "pruned status emitters");
        }
    }

    fn shutdown(&mut self, reason: Option<String>) {
        if self.current_state() == ConnectionState::Closed {
            return;
        }
        tracing::info!(
            url = %self.url,
            reason = ?reason,
            pending = self.pending.len(),
            "connection closed"
        );
        self.state.send_replace(ConnectionState::Closed);

        self.drain_ready_acks();
        self.tracker.close();
        for (_, continuation) in self.pending.drain() {
            self.complete(continuation, Err(ClientError::ConnectionClosed));
        }
        for cmd in std::mem::take(&mut self.deferred) {
            fail_command(cmd, ClientError::ConnectionClosed);
        }
        self.router.clear();
        let _ = self.events.send(ConnectionEvent::Close { reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.confirmation_blocks, 50);
        assert_eq!(config.request_horizon, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn rejects_non_websocket_url() {
        let result = WsEthClient::connect("https://rpc.example.com", ClientConfig::default()).await;
        assert!(matches!(result, Err(ClientError::WebSocket(_))));
    }

    #[tokio::test]
    async fn sign_uses_connection_default_chain() {
        let (socket, _peer) = Socket::pair();
        let mut client = WsEthClient::with_socket("mem://", socket, ClientConfig::default());
        let tx: TxData = serde_json::from_value(json!({
            "nonce": 9,
            "gasPrice": "0x4a817c800",
            "gas": 21000,
            "to": "0x3535353535353535353535353535353535353535",
            "value": "0xde0b6b3a7640000",
        }))
        .unwrap();
        let key = "4646464646464646464646464646464646464646464646464646464646464646";

        let mainnet = client.sign_transaction(&tx, key, None).unwrap();
        client.set_chain_params(Some(ChainParams::custom(1337)));
        let devnet = client.sign_transaction(&tx, key, None).unwrap();
        let overridden = client
            .sign_transaction(&tx, key, Some(&ChainParams::default()))
            .unwrap();

        assert_ne!(mainnet, devnet);
        assert_eq!(mainnet, overridden);
        assert_eq!(client.chain_params().map(ChainParams::chain_id), Some(1337));
    }
}
