//! Contains the [ForkId] type.

use derive_more::{Display, From};

/// A zkEVM protocol version identifier.
///
/// Fork identifiers are totally ordered; a higher identifier always activates at the same block
/// as, or a later block than, every lower one.
#[derive(Debug, Display, From, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[display("{_0}")]
pub struct ForkId(pub u64);

impl ForkId {
    /// The first fork supported by the sync pipeline.
    pub const FORK_4: Self = Self(4);
    /// Dragonfruit. Introduces the effective gas price percentage byte.
    pub const FORK_5_DRAGONFRUIT: Self = Self(5);
    /// IncaBerry.
    pub const FORK_6_INCABERRY: Self = Self(6);
    /// Etrog. Introduces per-block `changeL2Block` markers in the batch data.
    pub const FORK_7_ETROG: Self = Self(7);
    /// Elderberry.
    pub const FORK_8_ELDERBERRY: Self = Self(8);
    /// Elderberry 2.
    pub const FORK_9_ELDERBERRY_2: Self = Self(9);
    /// Fork 10.
    pub const FORK_10: Self = Self(10);
    /// Fork 11.
    pub const FORK_11: Self = Self(11);
    /// Banana.
    pub const FORK_12_BANANA: Self = Self(12);

    /// Every known fork, in canonical ascending order.
    pub const ORDERED: [Self; 9] = [
        Self::FORK_4,
        Self::FORK_5_DRAGONFRUIT,
        Self::FORK_6_INCABERRY,
        Self::FORK_7_ETROG,
        Self::FORK_8_ELDERBERRY,
        Self::FORK_9_ELDERBERRY_2,
        Self::FORK_10,
        Self::FORK_11,
        Self::FORK_12_BANANA,
    ];

    /// Returns the raw identifier.
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if transactions in this fork carry an effective gas price percentage byte.
    pub const fn has_effective_gas_price(self) -> bool {
        self.0 >= Self::FORK_5_DRAGONFRUIT.0
    }

    /// Returns `true` if blocks in this fork are delimited by a `changeL2Block` marker.
    pub const fn has_change_l2_block(self) -> bool {
        self.0 >= Self::FORK_7_ETROG.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ordered_forks_ascend() {
        assert!(ForkId::ORDERED.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_fork_feature_gates() {
        assert!(!ForkId::FORK_4.has_effective_gas_price());
        assert!(ForkId::FORK_5_DRAGONFRUIT.has_effective_gas_price());
        assert!(!ForkId::FORK_6_INCABERRY.has_change_l2_block());
        assert!(ForkId::FORK_7_ETROG.has_change_l2_block());
        assert!(ForkId::FORK_12_BANANA.has_change_l2_block());
    }

    #[test]
    fn test_fork_serde_transparent() {
        let fork: ForkId = serde_json::from_str("9").unwrap();
        assert_eq!(fork, ForkId::FORK_9_ELDERBERRY_2);
        assert_eq!(serde_json::to_string(&fork).unwrap(), "9");
    }
}
