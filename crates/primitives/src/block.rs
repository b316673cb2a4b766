//! Contains the [L2Block] type.

use crate::L2Transaction;
use alloc::vec::Vec;
use alloy_primitives::B256;
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// An executed L2 block.
///
/// Block numbers are gapless and every block belongs to exactly one batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L2Block {
    /// The block number.
    pub number: u64,
    /// The block timestamp, in seconds.
    pub timestamp: u64,
    /// The transactions in execution order.
    pub transactions: Vec<L2Transaction>,
}

impl L2Block {
    /// Creates a new [L2Block].
    pub const fn new(number: u64, timestamp: u64, transactions: Vec<L2Transaction>) -> Self {
        Self { number, timestamp, transactions }
    }

    /// Returns the hashes of the block's transactions, in order.
    pub fn transaction_hashes(&self) -> Vec<B256> {
        self.transactions.iter().map(L2Transaction::hash).collect()
    }
}
