//! Contains the [BlockL2DataEncoder] trait.

use alloc::vec::Vec;
use alloy_primitives::{map::HashMap, B256};
use core::fmt::Debug;
use zk_primitives::{ForkId, L2Transaction};

/// Encodes a single block into its batch L2 data form.
///
/// Implementations must be pure: the same inputs always produce the same bytes, so that the
/// concatenated batch matches what the L1 verifier reconstructs.
pub trait BlockL2DataEncoder: Debug {
    /// The error type for the [BlockL2DataEncoder].
    type Error: core::error::Error;

    /// Encodes one block.
    ///
    /// ## Takes
    /// - `fork`: The fork active for the batch.
    /// - `delta_timestamp`: Seconds elapsed since the previous block.
    /// - `l1_info_tree_index`: The L1 info tree index recorded for the block.
    /// - `transactions`: The block's transactions, in execution order.
    /// - `effective_gas_prices`: Effective gas price percentages keyed by transaction hash.
    ///
    /// ## Returns
    /// - `Ok(Vec<u8>)`: The encoded block.
    /// - `Err(Self::Error)`: If the block cannot be encoded for `fork`.
    fn encode_block(
        &self,
        fork: ForkId,
        delta_timestamp: u32,
        l1_info_tree_index: u32,
        transactions: &[L2Transaction],
        effective_gas_prices: &HashMap<B256, u8>,
    ) -> Result<Vec<u8>, Self::Error>;
}
