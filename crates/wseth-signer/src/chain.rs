//! Chain descriptors consumed by the signer.
//!
//! Two JSON shapes are accepted:
//!
//! ```json
//! { "chain": "sepolia", "hardfork": "london" }
//! { "customChain": { "name": "devnet", "chainId": 1337 }, "hardfork": "shanghai" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SignerError;

/// Well-known public networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Mainnet,
    Goerli,
    Sepolia,
    Holesky,
}

impl Chain {
    pub fn chain_id(self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Goerli => 5,
            Self::Sepolia => 11_155_111,
            Self::Holesky => 17_000,
        }
    }
}

/// Protocol rule sets, in activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Hardfork {
    Chainstart,
    Homestead,
    SpuriousDragon,
    Byzantium,
    Istanbul,
    Berlin,
    London,
    #[default]
    Shanghai,
    Cancun,
}

impl Hardfork {
    /// Replay-protected signatures (EIP-155).
    pub fn supports_eip155(self) -> bool {
        self >= Self::SpuriousDragon
    }

    /// Access-list transactions (EIP-2930).
    pub fn supports_eip2930(self) -> bool {
        self >= Self::Berlin
    }

    /// Fee-market transactions (EIP-1559).
    pub fn supports_eip1559(self) -> bool {
        self >= Self::London
    }
}

/// A network that is not one of the named [`Chain`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomChain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<u64>,
}

/// Immutable description of the target network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainParams {
    Custom {
        #[serde(rename = "customChain")]
        custom_chain: CustomChain,
        #[serde(default)]
        hardfork: Hardfork,
    },
    Named {
        chain: Chain,
        #[serde(default)]
        hardfork: Hardfork,
    },
}

impl ChainParams {
    pub fn named(chain: Chain) -> Self {
        Self::Named {
            chain,
            hardfork: Hardfork::default(),
        }
    }

    pub fn custom(chain_id: u64) -> Self {
        Self::Custom {
            custom_chain: CustomChain {
                name: None,
                chain_id,
                network_id: None,
            },
            hardfork: Hardfork::default(),
        }
    }

    /// Replace the hardfork.
    pub fn with_hardfork(self, hardfork: Hardfork) -> Self {
        match self {
            Self::Custom { custom_chain, .. } => Self::Custom {
                custom_chain,
                hardfork,
            },
            Self::Named { chain, .. } => Self::Named { chain, hardfork },
        }
    }

    /// Parse either JSON shape.
    pub fn from_json(s: &str) -> Result<Self, SignerError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Custom { custom_chain, .. } => custom_chain.chain_id,
            Self::Named { chain, .. } => chain.chain_id(),
        }
    }

    pub fn hardfork(&self) -> Hardfork {
        match self {
            Self::Custom { hardfork, .. } | Self::Named { hardfork, .. } => *hardfork,
        }
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::named(Chain::Mainnet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_shape() {
        let params = ChainParams::from_json(r#"{"chain":"sepolia","hardfork":"london"}"#).unwrap();
        assert_eq!(params.chain_id(), 11_155_111);
        assert_eq!(params.hardfork(), Hardfork::London);
    }

    #[test]
    fn parses_custom_shape() {
        let params = ChainParams::from_json(
            r#"{"customChain":{"name":"devnet","chainId":1337,"networkId":1337}}"#,
        )
        .unwrap();
        assert_eq!(params.chain_id(), 1337);
        assert_eq!(params.hardfork(), Hardfork::Shanghai);
        assert!(matches!(params, ChainParams::Custom { .. }));
    }

    #[test]
    fn rejects_unknown_chain() {
        assert!(ChainParams::from_json(r#"{"chain":"atlantis"}"#).is_err());
    }

    #[test]
    fn hardfork_rules() {
        assert!(!Hardfork::Homestead.supports_eip155());
        assert!(Hardfork::SpuriousDragon.supports_eip155());
        assert!(!Hardfork::Istanbul.supports_eip2930());
        assert!(Hardfork::Berlin.supports_eip2930());
        assert!(!Hardfork::Berlin.supports_eip1559());
        assert!(Hardfork::London.supports_eip1559());
        let json = serde_json::to_string(&Hardfork::SpuriousDragon).unwrap();
        assert_eq!(json, "\"spuriousDragon\"");
    }
}
