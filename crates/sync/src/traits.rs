//! Capability traits over the progress store.
//!
//! Each trait covers one concern so that callers can be handed exactly the access they need and
//! tests can substitute in-memory fakes. All capabilities of one store share its error type
//! through [ProgressStore].

use alloy_primitives::{Address, Bytes, B256};
use zk_primitives::{ForkId, L2Block, SyncStage};

/// The base trait of every store capability.
pub trait ProgressStore {
    /// The error returned by any read or write against the store.
    type Error: core::error::Error;
}

/// Reads named stage-progress cursors.
pub trait StageProgressReader: ProgressStore {
    /// Returns the progress recorded for `stage`, or zero if the stage has never advanced.
    fn stage_progress(&self, stage: SyncStage) -> Result<u64, Self::Error>;
}

/// Reads the batch/block index.
pub trait BatchReader: ProgressStore {
    /// Returns the batch owning the given L2 block, or zero if the block is unknown.
    fn batch_no_by_l2_block(&self, block: u64) -> Result<u64, Self::Error>;

    /// Returns the highest block contained in `batch`, or `None` if the batch is empty or
    /// unknown.
    fn highest_block_in_batch(&self, batch: u64) -> Result<Option<u64>, Self::Error>;

    /// Returns the highest batch that has been fully downloaded.
    fn latest_downloaded_batch_no(&self) -> Result<u64, Self::Error>;
}

/// Reads the inputs to fork boundary reconciliation.
pub trait ForkReader: ProgressStore {
    /// Returns the lowest batch assigned to `fork`, if any.
    fn lowest_batch_by_fork(&self, fork: ForkId) -> Result<Option<u64>, Self::Error>;

    /// Returns the lowest block contained in `batch`, if any.
    fn lowest_block_in_batch(&self, batch: u64) -> Result<Option<u64>, Self::Error>;
}

/// Persists fork boundaries.
pub trait ForkConfigWriter: ProgressStore {
    /// Records `block` as the first block of `fork`, overwriting any previous boundary.
    fn set_fork_id_block(&mut self, fork: ForkId, block: u64) -> Result<(), Self::Error>;
}

/// Reads historical blocks.
pub trait BlockReader: ProgressStore {
    /// Returns the block with the given number, if it exists.
    fn block_by_number(&self, number: u64) -> Result<Option<L2Block>, Self::Error>;
}

/// Reads per-block and per-transaction metadata recorded during execution.
pub trait BlockMetaReader: ProgressStore {
    /// Returns the L1 info tree index recorded for `block`, or zero if none was recorded.
    fn block_l1_info_tree_index(&self, block: u64) -> Result<u64, Self::Error>;

    /// Returns the effective gas price percentage recorded for the transaction, if any.
    fn effective_gas_price_percentage(&self, tx_hash: B256) -> Result<Option<u8>, Self::Error>;
}

/// Opens read-only views of historical contract state.
pub trait StateViewProvider: ProgressStore {
    /// The view type. Any resources it holds are released when it is dropped.
    type View<'a>: StateView<Error = Self::Error>
    where
        Self: 'a;

    /// Opens a view of the state as it was before `block` executed, i.e. after `block - 1`.
    fn state_view_at(&self, block: u64) -> Result<Self::View<'_>, Self::Error>;
}

/// A read-only view of contract storage at a fixed point in history.
pub trait StateView {
    /// The error returned by storage reads.
    type Error: core::error::Error;

    /// Reads the raw value of `slot` in `address`'s storage, or `None` if it was never written.
    fn read_account_storage(
        &self,
        address: Address,
        slot: B256,
    ) -> Result<Option<Bytes>, Self::Error>;
}
