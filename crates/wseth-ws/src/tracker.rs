//! Transaction confirmation tracking.
//!
//! Every public call gets a status emitter keyed by its request id. When the
//! response carries a transaction hash the emitter starts tracking it; each
//! new block then yields a [`ReceiptPoll`] which the client turns into an
//! `eth_getTransactionReceipt` request. The poll outcome moves the emitter to
//! its terminal state: receipt found, request failed, or no receipt after
//! `timeout_blocks` blocks.
//!
//! The tracker does no I/O; the connection task feeds it responses, block
//! numbers and poll outcomes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

use wseth_core::hex::{is_tx_hash, parse_hex_u64};
use wseth_core::request::is_truthy;
use wseth_core::ClientError;

/// Blocks to wait for a receipt before giving up.
pub const DEFAULT_CONFIRMATION_BLOCKS: u64 = 50;

/// Terminal failures reported through [`TxEvent::Receipt`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// The call's result was not a 32-byte hash, so there is nothing to track.
    #[error("Tx Hash was not received!")]
    HashNotReceived,

    #[error("No receipt in {blocks} blocks for Tx: {tx_hash}")]
    NoReceipt { blocks: u64, tx_hash: String },

    #[error("eth_getTransactionReceipt error: {0}")]
    ReceiptRequest(String),

    #[error("malformed receipt: {0}")]
    MalformedReceipt(String),

    #[error("connection closed before the transaction was confirmed")]
    ConnectionClosed,
}

/// A mined transaction's receipt, with the number of blocks tracking took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    #[serde(default)]
    pub blocks_since: u64,
    /// Remaining receipt fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TxReceipt {
    /// `Some(true)` for status `0x1`, `Some(false)` for `0x0`; `None` for
    /// pre-Byzantium receipts that carry a state root instead.
    pub fn succeeded(&self) -> Option<bool> {
        self.status.as_deref().and_then(parse_hex_u64).map(|s| s == 1)
    }

    pub fn block_number_u64(&self) -> Option<u64> {
        self.block_number.as_deref().and_then(parse_hex_u64)
    }
}

/// Lifecycle events for a call that may submit a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TxEvent {
    /// The call's raw result (a hash, if all went well).
    TxHash(Value),
    /// Terminal outcome. Emitted at most once.
    Receipt(Result<TxReceipt, TxError>),
}

/// A receipt lookup the client should issue for one emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPoll {
    pub emitter: u64,
    pub tx_hash: String,
    pub block_number: u64,
}

struct StatusEmitter {
    tx_hash: Option<String>,
    start_block: Option<u64>,
    listener: mpsc::UnboundedSender<TxEvent>,
    created_at: Instant,
}

impl StatusEmitter {
    fn emit(&self, event: TxEvent) {
        let _ = self.listener.send(event);
    }

    fn has_listener(&self) -> bool {
        !self.listener.is_closed()
    }
}

/// Status emitters keyed by request id.
pub struct ConfirmationTracker {
    emitters: HashMap<u64, StatusEmitter>,
    timeout_blocks: u64,
}

impl Default for ConfirmationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRMATION_BLOCKS)
    }
}

impl ConfirmationTracker {
    pub fn new(timeout_blocks: u64) -> Self {
        Self {
            emitters: HashMap::new(),
            timeout_blocks,
        }
    }

    /// Attach an emitter to request `id`.
    pub fn register(&mut self, id: u64, listener: mpsc::UnboundedSender<TxEvent>) {
        self.emitters.insert(
            id,
            StatusEmitter {
                tx_hash: None,
                start_block: None,
                listener,
                created_at: Instant::now(),
            },
        );
    }

    /// Feed the response for request `id`. `result` is `None` when the node
    /// answered with an error.
    pub fn on_response(&mut self, id: u64, result: Option<&Value>) {
        let Some(emitter) = self.emitters.get_mut(&id) else {
            return;
        };
        if emitter.tx_hash.is_some() {
            // Duplicate response for a hash we already track.
            return;
        }
        if !emitter.has_listener() {
            self.emitters.remove(&id);
            return;
        }

        let result = result.cloned().unwrap_or(Value::Null);
        emitter.emit(TxEvent::TxHash(result.clone()));
        match result.as_str().filter(|s| is_tx_hash(s)) {
            Some(hash) => {
                tracing::debug!(id, tx_hash = hash, "tracking transaction");
                emitter.tx_hash = Some(hash.to_string());
            }
            None => {
                emitter.emit(TxEvent::Receipt(Err(TxError::HashNotReceived)));
                self.emitters.remove(&id);
            }
        }
    }

    /// A new block arrived. Returns one poll per emitter that is tracking a
    /// hash and still has a listener, in request-id order.
    pub fn on_new_block(&mut self, block_number: u64) -> Vec<ReceiptPoll> {
        self.emitters.retain(|_, e| e.has_listener());
        let mut polls: Vec<ReceiptPoll> = self
            .emitters
            .iter_mut()
            .filter_map(|(id, e)| {
                let tx_hash = e.tx_hash.clone()?;
                e.start_block.get_or_insert(block_number);
                Some(ReceiptPoll {
                    emitter: *id,
                    tx_hash,
                    block_number,
                })
            })
            .collect();
        polls.sort_by_key(|p| p.emitter);
        polls
    }

    /// Apply the outcome of a receipt poll.
    pub fn on_receipt(&mut self, poll: ReceiptPoll, outcome: Result<Value, ClientError>) {
        let Some(emitter) = self.emitters.get(&poll.emitter) else {
            tracing::trace!(id = poll.emitter, "receipt poll for finished emitter");
            return;
        };
        let start = emitter.start_block.unwrap_or(poll.block_number);
        let blocks_since = poll.block_number.saturating_sub(start);

        let terminal = match outcome {
            Err(e) => Err(TxError::ReceiptRequest(e.to_string())),
            // Nodes answer `null` for a pending tx; some use other falsy values.
            Ok(value) if !is_truthy(&value) && blocks_since >= self.timeout_blocks => {
                Err(TxError::NoReceipt {
                    blocks: self.timeout_blocks,
                    tx_hash: poll.tx_hash.clone(),
                })
            }
            Ok(value) if !is_truthy(&value) => {
                tracing::trace!(id = poll.emitter, blocks_since, "no receipt yet");
                return;
            }
            Ok(value) => match serde_json::from_value::<TxReceipt>(value) {
                Ok(mut receipt) => {
                    receipt.blocks_since = blocks_since;
                    Ok(receipt)
                }
                Err(e) => Err(TxError::MalformedReceipt(e.to_string())),
            },
        };

        if let Some(emitter) = self.emitters.remove(&poll.emitter) {
            match &terminal {
                Ok(_) => tracing::info!(tx_hash = %poll.tx_hash, blocks_since, "transaction confirmed"),
                Err(e) => tracing::warn!(tx_hash = %poll.tx_hash, error = %e, "transaction tracking failed"),
            }
            emitter.emit(TxEvent::Receipt(terminal));
        }
    }

    /// Drop emitters nobody listens to, and those that never received a
    /// hash within `horizon`. Returns how many were removed.
    pub fn prune(&mut self, horizon: Duration, now: Instant) -> usize {
        let before = self.emitters.len();
        self.emitters.retain(|_, e| {
            e.has_listener()
                && (e.tx_hash.is_some() || now.saturating_duration_since(e.created_at) < horizon)
        });
        before - self.emitters.len()
    }

    /// Tear down: every remaining listener learns the connection is gone.
    pub fn close(&mut self) {
        for (_, emitter) in self.emitters.drain() {
            emitter.emit(TxEvent::Receipt(Err(TxError::ConnectionClosed)));
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.emitters.contains_key(&id)
    }

    /// The hash tracked for `id`, once received.
    pub fn tx_hash(&self, id: u64) -> Option<&str> {
        self.emitters.get(&id).and_then(|e| e.tx_hash.as_deref())
    }

    pub fn start_block(&self, id: u64) -> Option<u64> {
        self.emitters.get(&id).and_then(|e| e.start_block)
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }
}
