//! Transaction fields as supplied by callers.

use rlp::{Encodable, RlpStream};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SignerError;

/// An unsigned integer stored as minimal big-endian bytes.
///
/// Deserializes from a JSON number or a `0x`-prefixed hex string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quantity(Vec<u8>);

impl Quantity {
    pub fn from_u64(value: u64) -> Self {
        Self::from_be_slice(&value.to_be_bytes())
    }

    pub(crate) fn from_be_slice(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        Self(bytes[start..].to_vec())
    }

    /// Parse a `0x`-prefixed hex quantity.
    pub fn from_hex(s: &str) -> Result<Self, SignerError> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| SignerError::InvalidQuantity(format!("missing 0x prefix: {s}")))?;
        let padded;
        let digits = if digits.len() % 2 == 1 {
            padded = format!("0{digits}");
            padded.as_str()
        } else {
            digits
        };
        let bytes = hex::decode(digits).map_err(|e| SignerError::InvalidQuantity(format!("{s}: {e}")))?;
        Ok(Self::from_be_slice(&bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The value as `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.len() > 8 {
            return None;
        }
        Some(self.0.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl Encodable for Quantity {
    fn rlp_append(&self, s: &mut RlpStream) {
        self.0.rlp_append(s);
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            serializer.serialize_str("0x0")
        } else {
            serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
        }
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::from_u64(n)),
            Raw::Text(s) => Self::from_hex(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Envelope type chosen for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    /// Type 0 (optionally EIP-155 replay protected).
    Legacy,
    /// Type 1 transaction carrying an access list.
    Eip2930,
    /// Type 2 fee-market transaction.
    Eip1559,
}

/// One entry of an EIP-2930 access list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    pub address: String,
    #[serde(default)]
    pub storage_keys: Vec<String>,
}

/// Caller-supplied transaction fields. Missing quantities encode as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxData {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Quantity>,
    #[serde(alias = "gas", skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<Quantity>,
    /// Recipient address; absent for contract creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Quantity>,
    #[serde(alias = "input", skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<AccessListItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Quantity>,
}

impl TxData {
    /// Pick the envelope from an explicit `type`, else from the fee fields
    /// and the presence of an access list.
    pub fn kind(&self) -> Result<TxKind, SignerError> {
        match self.tx_type.as_ref().map(Quantity::to_u64) {
            Some(Some(0)) => Ok(TxKind::Legacy),
            Some(Some(1)) => Ok(TxKind::Eip2930),
            Some(Some(2)) => Ok(TxKind::Eip1559),
            Some(_) => Err(SignerError::Unsupported(format!(
                "transaction type {:?}",
                self.tx_type
            ))),
            None if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() => {
                Ok(TxKind::Eip1559)
            }
            None if self.access_list.is_some() => Ok(TxKind::Eip2930),
            None => Ok(TxKind::Legacy),
        }
    }

    /// Recipient bytes: empty for contract creation, otherwise 20 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SignerError> {
        let Some(to) = self.to.as_deref().filter(|s| !s.is_empty()) else {
            return Ok(Vec::new());
        };
        decode_sized("to", to, 20)
    }

    pub fn data_bytes(&self) -> Result<Vec<u8>, SignerError> {
        match self.data.as_deref() {
            None | Some("") | Some("0x") => Ok(Vec::new()),
            Some(data) => decode_hex("data", data),
        }
    }

    /// Decoded access list: 20-byte addresses, each with 32-byte keys.
    pub fn access_list_bytes(&self) -> Result<Vec<(Vec<u8>, Vec<Vec<u8>>)>, SignerError> {
        let Some(list) = &self.access_list else {
            return Ok(Vec::new());
        };
        list.iter()
            .map(|item| {
                let address = decode_sized("accessList.address", &item.address, 20)?;
                let keys = item
                    .storage_keys
                    .iter()
                    .map(|key| decode_sized("accessList.storageKeys", key, 32))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((address, keys))
            })
            .collect()
    }
}

fn decode_sized(field: &'static str, s: &str, len: usize) -> Result<Vec<u8>, SignerError> {
    let bytes = decode_hex(field, s)?;
    if bytes.len() != len {
        return Err(SignerError::InvalidHex {
            field,
            value: s.to_string(),
        });
    }
    Ok(bytes)
}

fn decode_hex(field: &'static str, s: &str) -> Result<Vec<u8>, SignerError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|_| SignerError::InvalidHex {
        field,
        value: s.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_parsing() {
        assert_eq!(Quantity::from_hex("0x0").unwrap().as_bytes(), &[] as &[u8]);
        assert_eq!(Quantity::from_hex("0x5208").unwrap().to_u64(), Some(21_000));
        assert_eq!(Quantity::from_hex("0x4a817c800").unwrap().to_u64(), Some(20_000_000_000));
        assert!(Quantity::from_hex("5208").is_err());
        assert!(Quantity::from_hex("0xzz").is_err());
        assert_eq!(Quantity::from_u64(0), Quantity::default());
    }

    #[test]
    fn tx_data_from_json() {
        let tx: TxData = serde_json::from_value(serde_json::json!({
            "nonce": 9,
            "gasPrice": "0x4a817c800",
            "gas": "0x5208",
            "to": "0x3535353535353535353535353535353535353535",
            "value": "0xde0b6b3a7640000",
        }))
        .unwrap();
        assert_eq!(tx.nonce.as_ref().and_then(Quantity::to_u64), Some(9));
        assert_eq!(tx.gas_limit.as_ref().and_then(Quantity::to_u64), Some(21_000));
        assert_eq!(tx.kind().unwrap(), TxKind::Legacy);
        assert_eq!(tx.to_bytes().unwrap(), vec![0x35; 20]);
        assert!(tx.data_bytes().unwrap().is_empty());
    }

    #[test]
    fn kind_detection() {
        let tx = TxData {
            max_fee_per_gas: Some(Quantity::from_u64(100)),
            ..Default::default()
        };
        assert_eq!(tx.kind().unwrap(), TxKind::Eip1559);

        let tx = TxData {
            tx_type: Some(Quantity::from_u64(1)),
            ..Default::default()
        };
        assert_eq!(tx.kind().unwrap(), TxKind::Eip2930);

        let tx = TxData {
            gas_price: Some(Quantity::from_u64(1)),
            access_list: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(tx.kind().unwrap(), TxKind::Eip2930);

        let tx = TxData {
            tx_type: Some(Quantity::from_u64(3)),
            ..Default::default()
        };
        assert!(matches!(tx.kind(), Err(SignerError::Unsupported(_))));
    }

    #[test]
    fn access_list_from_json() {
        let tx: TxData = serde_json::from_value(serde_json::json!({
            "accessList": [
                {
                    "address": "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae",
                    "storageKeys": [
                        "0x0000000000000000000000000000000000000000000000000000000000000003",
                        "0x0000000000000000000000000000000000000000000000000000000000000007",
                    ],
                },
                {"address": "0xbb9bc244d798123fde783fcc1c72d3bb8c189413"},
            ],
        }))
        .unwrap();
        let list = tx.access_list_bytes().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].0.len(), 20);
        assert_eq!(list[0].1.len(), 2);
        assert_eq!(list[0].1[1][31], 7);
        assert!(list[1].1.is_empty());
    }

    #[test]
    fn rejects_malformed_access_list() {
        let tx = TxData {
            access_list: Some(vec![AccessListItem {
                address: "0x1234".into(),
                storage_keys: Vec::new(),
            }]),
            ..Default::default()
        };
        assert!(matches!(
            tx.access_list_bytes(),
            Err(SignerError::InvalidHex { field: "accessList.address", .. })
        ));

        let tx = TxData {
            access_list: Some(vec![AccessListItem {
                address: format!("0x{}", "11".repeat(20)),
                storage_keys: vec!["0x01".into()],
            }]),
            ..Default::default()
        };
        assert!(matches!(
            tx.access_list_bytes(),
            Err(SignerError::InvalidHex { field: "accessList.storageKeys", .. })
        ));
    }

    #[test]
    fn rejects_short_recipient() {
        let tx = TxData {
            to: Some("0x1234".into()),
            ..Default::default()
        };
        assert!(tx.to_bytes().is_err());
    }
}
