//! secp256k1 transaction signing.

use k256::ecdsa::SigningKey;
use rlp::RlpStream;
use tiny_keccak::{Hasher, Keccak};

use crate::chain::ChainParams;
use crate::error::SignerError;
use crate::tx::{Quantity, TxData, TxKind};

/// The narrow signing interface the client delegates to.
///
/// Implementations are pure: the same input always produces the same raw
/// transaction, and no state is kept between calls.
pub trait TransactionSigner: Send + Sync {
    /// Sign `tx` with the hex-encoded private key and return the
    /// `0x`-prefixed raw transaction. `chain` defaults to mainnet.
    fn sign(
        &self,
        tx: &TxData,
        private_key_hex: &str,
        chain: Option<&ChainParams>,
    ) -> Result<String, SignerError>;
}

/// In-process signer backed by `k256`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSigner;

impl TransactionSigner for LocalSigner {
    fn sign(
        &self,
        tx: &TxData,
        private_key_hex: &str,
        chain: Option<&ChainParams>,
    ) -> Result<String, SignerError> {
        sign_transaction(tx, private_key_hex, chain)
    }
}

/// Sign a transaction and return the raw hex encoding.
pub fn sign_transaction(
    tx: &TxData,
    private_key_hex: &str,
    chain: Option<&ChainParams>,
) -> Result<String, SignerError> {
    let mainnet = ChainParams::default();
    let chain = chain.unwrap_or(&mainnet);
    let key = parse_private_key(private_key_hex)?;
    let unsigned = UnsignedTx::build(tx, chain)?;

    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&keccak256(&unsigned.encode(None)))
        .map_err(|e| SignerError::Signature(e.to_string()))?;
    let sig_bytes = signature.to_bytes();
    let recovery = u64::from(recovery_id.to_byte());

    let v = match unsigned.kind {
        TxKind::Legacy if unsigned.eip155 => unsigned
            .chain_id
            .checked_mul(2)
            .and_then(|n| n.checked_add(35 + recovery))
            .ok_or_else(|| SignerError::Unsupported("chain id too large for EIP-155".into()))?,
        TxKind::Legacy => 27 + recovery,
        TxKind::Eip2930 | TxKind::Eip1559 => recovery,
    };
    let raw = unsigned.encode(Some(&Signature {
        v,
        r: Quantity::from_be_slice(&sig_bytes[..32]),
        s: Quantity::from_be_slice(&sig_bytes[32..]),
    }));

    tracing::debug!(
        chain_id = unsigned.chain_id,
        kind = ?unsigned.kind,
        bytes = raw.len(),
        "signed transaction"
    );
    Ok(format!("0x{}", hex::encode(raw)))
}

/// Keccak-256 of the payload a signature commits to.
pub fn signing_hash(tx: &TxData, chain: &ChainParams) -> Result<[u8; 32], SignerError> {
    Ok(keccak256(&UnsignedTx::build(tx, chain)?.encode(None)))
}

struct Signature {
    v: u64,
    r: Quantity,
    s: Quantity,
}

/// Validated transaction fields, ready to encode in either form.
struct UnsignedTx {
    kind: TxKind,
    eip155: bool,
    chain_id: u64,
    nonce: Quantity,
    gas_price: Quantity,
    max_priority_fee_per_gas: Quantity,
    max_fee_per_gas: Quantity,
    gas_limit: Quantity,
    to: Vec<u8>,
    value: Quantity,
    data: Vec<u8>,
    access_list: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
}

impl UnsignedTx {
    fn build(tx: &TxData, chain: &ChainParams) -> Result<Self, SignerError> {
        if let Some(id) = tx.chain_id.as_ref().and_then(Quantity::to_u64) {
            if id != chain.chain_id() {
                return Err(SignerError::Unsupported(format!(
                    "transaction chainId {id} does not match chain {}",
                    chain.chain_id()
                )));
            }
        }

        let kind = tx.kind()?;
        let hardfork = chain.hardfork();
        match kind {
            TxKind::Legacy if tx.access_list.as_ref().is_some_and(|l| !l.is_empty()) => {
                return Err(SignerError::Unsupported(
                    "legacy transactions cannot carry an access list".into(),
                ));
            }
            TxKind::Eip2930 if !hardfork.supports_eip2930() => {
                return Err(SignerError::Unsupported(format!(
                    "EIP-2930 transactions need berlin or later, chain is on {hardfork:?}"
                )));
            }
            TxKind::Eip1559 if !hardfork.supports_eip1559() => {
                return Err(SignerError::Unsupported(format!(
                    "EIP-1559 transactions need london or later, chain is on {hardfork:?}"
                )));
            }
            _ => {}
        }

        Ok(Self {
            kind,
            eip155: kind == TxKind::Legacy && hardfork.supports_eip155(),
            chain_id: chain.chain_id(),
            nonce: quantity(&tx.nonce),
            gas_price: quantity(&tx.gas_price),
            max_priority_fee_per_gas: quantity(&tx.max_priority_fee_per_gas),
            max_fee_per_gas: quantity(&tx.max_fee_per_gas),
            gas_limit: quantity(&tx.gas_limit),
            to: tx.to_bytes()?,
            value: quantity(&tx.value),
            data: tx.data_bytes()?,
            access_list: tx.access_list_bytes()?,
        })
    }

    /// The signing preimage when `signature` is `None`, else the raw
    /// transaction.
    fn encode(&self, signature: Option<&Signature>) -> Vec<u8> {
        let mut stream = RlpStream::new();
        let prefix = match self.kind {
            TxKind::Legacy => {
                let tail = signature.is_some() || self.eip155;
                stream.begin_list(if tail { 9 } else { 6 });
                stream
                    .append(&self.nonce)
                    .append(&self.gas_price)
                    .append(&self.gas_limit)
                    .append(&self.to)
                    .append(&self.value)
                    .append(&self.data);
                if signature.is_none() && self.eip155 {
                    stream.append(&self.chain_id).append(&0u8).append(&0u8);
                }
                None
            }
            TxKind::Eip2930 => {
                stream.begin_list(if signature.is_some() { 11 } else { 8 });
                stream
                    .append(&self.chain_id)
                    .append(&self.nonce)
                    .append(&self.gas_price)
                    .append(&self.gas_limit)
                    .append(&self.to)
                    .append(&self.value)
                    .append(&self.data);
                self.append_access_list(&mut stream);
                Some(0x01)
            }
            TxKind::Eip1559 => {
                stream.begin_list(if signature.is_some() { 12 } else { 9 });
                stream
                    .append(&self.chain_id)
                    .append(&self.nonce)
                    .append(&self.max_priority_fee_per_gas)
                    .append(&self.max_fee_per_gas)
                    .append(&self.gas_limit)
                    .append(&self.to)
                    .append(&self.value)
                    .append(&self.data);
                self.append_access_list(&mut stream);
                Some(0x02)
            }
        };
        if let Some(sig) = signature {
            stream.append(&sig.v).append(&sig.r).append(&sig.s);
        }

        let body = stream.out();
        let mut out = Vec::with_capacity(body.len() + 1);
        out.extend(prefix);
        out.extend_from_slice(&body);
        out
    }

    fn append_access_list(&self, stream: &mut RlpStream) {
        stream.begin_list(self.access_list.len());
        for (address, keys) in &self.access_list {
            stream.begin_list(2).append(address);
            stream.begin_list(keys.len());
            for key in keys {
                stream.append(key);
            }
        }
    }
}

fn quantity(q: &Option<Quantity>) -> Quantity {
    q.clone().unwrap_or_default()
}

fn parse_private_key(s: &str) -> Result<SigningKey, SignerError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(SignerError::InvalidPrivateKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    SigningKey::from_slice(&bytes).map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}
