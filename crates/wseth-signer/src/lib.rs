//! wseth-signer: the transaction-signing collaborator for wseth.
//!
//! Signing is a pure transform: transaction fields, a private key and an
//! optional chain descriptor go in, a `0x`-prefixed raw transaction comes
//! out. Nothing here talks to the network.
//!
//! # Quick start
//! ```rust,no_run
//! use wseth_signer::{ChainParams, Chain, LocalSigner, TransactionSigner, TxData};
//!
//! let tx: TxData = serde_json::from_str(r#"{"nonce": 0, "gas": 21000, "to": "0x3535353535353535353535353535353535353535"}"#).unwrap();
//! let raw = LocalSigner.sign(&tx, "46464646...", Some(&ChainParams::named(Chain::Sepolia)));
//! ```

pub mod chain;
pub mod error;
pub mod signer;
pub mod tx;

pub use chain::{Chain, ChainParams, CustomChain, Hardfork};
pub use error::SignerError;
pub use signer::{sign_transaction, signing_hash, LocalSigner, TransactionSigner};
pub use tx::{AccessListItem, Quantity, TxData, TxKind};
