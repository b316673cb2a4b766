//! Assembly of a batch's L2 data payload from its executed blocks.

use crate::traits::{BlockMetaReader, BlockReader};
use alloc::vec::Vec;
use alloy_primitives::map::HashMap;
use thiserror::Error;
use tracing::{debug, trace};
use zk_codec::{BlockL2DataEncoder, DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE};
use zk_primitives::{ForkId, L2Block};

/// An error encountered while generating batch data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchDataError<S, C>
where
    S: core::error::Error,
    C: core::error::Error,
{
    /// No blocks were given.
    #[error("Cannot generate data for a batch without blocks")]
    EmptyBatch,
    /// The block preceding the batch does not exist.
    #[error("Block {0} preceding the batch was not found")]
    MissingBlock(u64),
    /// A block is older than the block before it.
    #[error("Block {block} has timestamp {timestamp}, before its parent's {parent_timestamp}")]
    TimestampRegression {
        /// The offending block.
        block: u64,
        /// Its timestamp.
        timestamp: u64,
        /// The timestamp of the block before it.
        parent_timestamp: u64,
    },
    /// The timestamp delta of a block does not fit the 32-bit wire field.
    #[error("Block {block} has a timestamp delta of {delta}, which does not fit in 32 bits")]
    DeltaTimestampOverflow {
        /// The offending block.
        block: u64,
        /// The delta.
        delta: u64,
    },
    /// The L1 info tree index of a block does not fit the 32-bit wire field.
    #[error("Block {block} has L1 info tree index {index}, which does not fit in 32 bits")]
    L1InfoTreeIndexOverflow {
        /// The offending block.
        block: u64,
        /// The recorded index.
        index: u64,
    },
    /// A store read failed.
    #[error("Store read failed: {0}")]
    Store(#[source] S),
    /// The codec rejected a block.
    #[error("Failed to encode block {block}: {source}")]
    Codec {
        /// The offending block.
        block: u64,
        /// The codec error.
        #[source]
        source: C,
    },
}

/// Generates the L2 data of a batch from its blocks.
///
/// `blocks` must be the batch's blocks in ascending order. The first block's timestamp delta is
/// taken against the block preceding it, which is the last block of the previous batch, or
/// against zero if the batch starts at genesis. Each later block is measured against the block
/// before it in `blocks`.
///
/// The encoder receives an effective gas price percentage for every transaction of a block.
/// Transactions with none recorded get [DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE].
///
/// Any failure aborts the whole batch; no partial payload is returned.
pub fn generate_batch_data<P, C>(
    store: &P,
    encoder: &C,
    blocks: &[L2Block],
    fork: ForkId,
) -> Result<Vec<u8>, BatchDataError<P::Error, C::Error>>
where
    P: BlockReader + BlockMetaReader,
    C: BlockL2DataEncoder,
{
    let first = blocks.first().ok_or(BatchDataError::EmptyBatch)?;
    let mut parent_timestamp = match first.number.checked_sub(1) {
        Some(parent) => {
            store
                .block_by_number(parent)
                .map_err(BatchDataError::Store)?
                .ok_or(BatchDataError::MissingBlock(parent))?
                .timestamp
        }
        None => 0,
    };

    let mut batch_data = Vec::new();
    for block in blocks {
        let delta = block.timestamp.checked_sub(parent_timestamp).ok_or(
            BatchDataError::TimestampRegression {
                block: block.number,
                timestamp: block.timestamp,
                parent_timestamp,
            },
        )?;
        let delta_timestamp = u32::try_from(delta)
            .map_err(|_| BatchDataError::DeltaTimestampOverflow { block: block.number, delta })?;

        let index = store.block_l1_info_tree_index(block.number).map_err(BatchDataError::Store)?;
        let l1_info_tree_index = u32::try_from(index)
            .map_err(|_| BatchDataError::L1InfoTreeIndexOverflow { block: block.number, index })?;

        let mut effective_gas_prices = HashMap::default();
        for hash in block.transaction_hashes() {
            let percentage = store
                .effective_gas_price_percentage(hash)
                .map_err(BatchDataError::Store)?
                .unwrap_or(DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE);
            effective_gas_prices.insert(hash, percentage);
        }

        let encoded = encoder
            .encode_block(
                fork,
                delta_timestamp,
                l1_info_tree_index,
                &block.transactions,
                &effective_gas_prices,
            )
            .map_err(|source| BatchDataError::Codec { block: block.number, source })?;
        trace!(
            target: "batch_data",
            "Encoded block {} into {} bytes (delta {delta_timestamp}, index {l1_info_tree_index})",
            block.number,
            encoded.len()
        );

        batch_data.extend_from_slice(&encoded);
        parent_timestamp = block.timestamp;
    }

    debug!(
        target: "batch_data",
        "Generated {} bytes of batch data for blocks {}..={} at fork {fork}",
        batch_data.len(),
        first.number,
        blocks.last().map_or(first.number, |block| block.number)
    );
    Ok(batch_data)
}
