//! Contains the [ChainConfig] type.

use crate::{ForkId, GER_MANAGER_ADDRESS};
use alloc::vec::Vec;
use alloy_primitives::Address;

/// Chain-level configuration consumed by the sync core.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ChainConfig {
    /// Every fork the chain knows about, in canonical ascending order.
    pub forks: Vec<ForkId>,
    /// The global exit root manager contract whose storage holds the local exit root.
    pub ger_manager_address: Address,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self { forks: ForkId::ORDERED.to_vec(), ger_manager_address: GER_MANAGER_ADDRESS }
    }
}

impl ChainConfig {
    /// Returns `true` if the configured forks are strictly ascending.
    pub fn forks_ordered(&self) -> bool {
        self.forks.windows(2).all(|w| w[0] < w[1])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_chain_config_defaults() {
        let cfg = ChainConfig::default();
        assert_eq!(cfg.forks, ForkId::ORDERED.to_vec());
        assert_eq!(cfg.ger_manager_address, GER_MANAGER_ADDRESS);
        assert!(cfg.forks_ordered());
    }

    #[test]
    fn test_chain_config_partial_json() {
        let raw = r#"{ "forks": [7, 8, 9] }"#;
        let cfg: ChainConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.forks, vec![ForkId(7), ForkId(8), ForkId(9)]);
        assert_eq!(cfg.ger_manager_address, GER_MANAGER_ADDRESS);

        let raw = r#"{ "gerManagerAddress": "0x0000000000000000000000000000000000000abc" }"#;
        let cfg: ChainConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.forks, ForkId::ORDERED.to_vec());
        assert_eq!(cfg.ger_manager_address, address!("0000000000000000000000000000000000000abc"));
    }

    #[test]
    fn test_chain_config_unordered_forks() {
        let cfg = ChainConfig { forks: vec![ForkId(8), ForkId(7)], ..Default::default() };
        assert!(!cfg.forks_ordered());
    }
}
