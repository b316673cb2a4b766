//! An in-memory [ProgressStore] with failure injection.

use crate::traits::{
    BatchReader, BlockMetaReader, BlockReader, ForkConfigWriter, ForkReader, ProgressStore,
    StageProgressReader, StateView, StateViewProvider,
};
use alloc::collections::BTreeMap;
use alloy_primitives::{Address, Bytes, B256};
use core::{cell::Cell, ops::RangeInclusive};
use thiserror::Error;
use zk_primitives::{ForkId, L2Block, SyncStage};

/// An error returned by the [TestProgressStore].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStoreError {
    /// A read was rejected.
    #[error("Test store read failed")]
    Read,
    /// A fork boundary write was rejected.
    #[error("Test store write failed for fork {0}")]
    Write(ForkId),
}

/// An in-memory store backing every capability trait.
#[derive(Debug, Default)]
pub struct TestProgressStore {
    /// Stage cursors.
    pub stage_progress: BTreeMap<SyncStage, u64>,
    /// Block number to owning batch.
    pub block_batches: BTreeMap<u64, u64>,
    /// Fork to the lowest batch assigned to it.
    pub fork_batches: BTreeMap<ForkId, u64>,
    /// Written fork boundaries.
    pub fork_blocks: BTreeMap<ForkId, u64>,
    /// The download frontier.
    pub downloaded_batch: u64,
    /// Historical blocks by number.
    pub blocks: BTreeMap<u64, L2Block>,
    /// L1 info tree index by block number.
    pub l1_info_tree_indices: BTreeMap<u64, u64>,
    /// Effective gas price percentage by transaction hash.
    pub effective_gas_prices: BTreeMap<B256, u8>,
    /// Storage values keyed by `(address, slot, block written at)`.
    pub storage: BTreeMap<(Address, B256, u64), Bytes>,
    /// Fail every read, including opening state views.
    pub fail_reads: bool,
    /// Fail storage reads through an open state view.
    pub fail_storage_reads: bool,
    /// Fail the boundary write for this fork.
    pub fail_write_for: Option<ForkId>,
    /// The number of state views currently open.
    pub open_views: Cell<usize>,
    /// The number of state views ever opened.
    pub views_opened: Cell<usize>,
    /// The number of storage reads served.
    pub storage_reads: Cell<usize>,
}

impl TestProgressStore {
    /// Assigns every block in `blocks` to `batch`.
    pub fn insert_batch(&mut self, batch: u64, blocks: RangeInclusive<u64>) {
        self.block_batches.extend(blocks.map(|block| (block, batch)));
    }

    /// Sets the progress of `stage`.
    pub fn set_stage_progress(&mut self, stage: SyncStage, progress: u64) {
        self.stage_progress.insert(stage, progress);
    }

    /// Stores `block` along with its L1 info tree index.
    pub fn insert_block(&mut self, block: L2Block, l1_info_tree_index: u64) {
        self.l1_info_tree_indices.insert(block.number, l1_info_tree_index);
        self.blocks.insert(block.number, block);
    }

    /// Records a write of `value` to `slot` of `address` by block `block`.
    pub fn insert_storage(&mut self, address: Address, slot: B256, block: u64, value: Bytes) {
        self.storage.insert((address, slot, block), value);
    }

    const fn check_read(&self) -> Result<(), TestStoreError> {
        if self.fail_reads {
            return Err(TestStoreError::Read);
        }
        Ok(())
    }

    fn blocks_in_batch(&self, batch: u64) -> impl Iterator<Item = u64> + '_ {
        self.block_batches.iter().filter(move |(_, b)| **b == batch).map(|(block, _)| *block)
    }
}

impl ProgressStore for TestProgressStore {
    type Error = TestStoreError;
}

impl StageProgressReader for TestProgressStore {
    fn stage_progress(&self, stage: SyncStage) -> Result<u64, Self::Error> {
        self.check_read()?;
        Ok(self.stage_progress.get(&stage).copied().unwrap_or_default())
    }
}

impl BatchReader for TestProgressStore {
    fn batch_no_by_l2_block(&self, block: u64) -> Result<u64, Self::Error> {
        self.check_read()?;
        Ok(self.block_batches.get(&block).copied().unwrap_or_default())
    }

    fn highest_block_in_batch(&self, batch: u64) -> Result<Option<u64>, Self::Error> {
        self.check_read()?;
        Ok(self.blocks_in_batch(batch).max())
    }

    fn latest_downloaded_batch_no(&self) -> Result<u64, Self::Error> {
        self.check_read()?;
        Ok(self.downloaded_batch)
    }
}

impl ForkReader for TestProgressStore {
    fn lowest_batch_by_fork(&self, fork: ForkId) -> Result<Option<u64>, Self::Error> {
        self.check_read()?;
        Ok(self.fork_batches.get(&fork).copied())
    }

    fn lowest_block_in_batch(&self, batch: u64) -> Result<Option<u64>, Self::Error> {
        self.check_read()?;
        Ok(self.blocks_in_batch(batch).min())
    }
}

impl ForkConfigWriter for TestProgressStore {
    fn set_fork_id_block(&mut self, fork: ForkId, block: u64) -> Result<(), Self::Error> {
        if self.fail_write_for == Some(fork) {
            return Err(TestStoreError::Write(fork));
        }
        self.fork_blocks.insert(fork, block);
        Ok(())
    }
}

impl BlockReader for TestProgressStore {
    fn block_by_number(&self, number: u64) -> Result<Option<L2Block>, Self::Error> {
        self.check_read()?;
        Ok(self.blocks.get(&number).cloned())
    }
}

impl BlockMetaReader for TestProgressStore {
    fn block_l1_info_tree_index(&self, block: u64) -> Result<u64, Self::Error> {
        self.check_read()?;
        Ok(self.l1_info_tree_indices.get(&block).copied().unwrap_or_default())
    }

    fn effective_gas_price_percentage(&self, tx_hash: B256) -> Result<Option<u8>, Self::Error> {
        self.check_read()?;
        Ok(self.effective_gas_prices.get(&tx_hash).copied())
    }
}

impl StateViewProvider for TestProgressStore {
    type View<'a> = TestStateView<'a>;

    fn state_view_at(&self, block: u64) -> Result<Self::View<'_>, Self::Error> {
        self.check_read()?;
        self.open_views.set(self.open_views.get() + 1);
        self.views_opened.set(self.views_opened.get() + 1);
        Ok(TestStateView { store: self, block })
    }
}

/// A state view over a [TestProgressStore], seeing writes made before its anchor block.
///
/// Decrements [TestProgressStore::open_views] when dropped.
#[derive(Debug)]
pub struct TestStateView<'a> {
    store: &'a TestProgressStore,
    block: u64,
}

impl StateView for TestStateView<'_> {
    type Error = TestStoreError;

    fn read_account_storage(
        &self,
        address: Address,
        slot: B256,
    ) -> Result<Option<Bytes>, Self::Error> {
        if self.store.fail_storage_reads {
            return Err(TestStoreError::Read);
        }
        self.store.storage_reads.set(self.store.storage_reads.get() + 1);
        Ok(self
            .store
            .storage
            .range((address, slot, 0)..(address, slot, self.block))
            .next_back()
            .map(|(_, value)| value.clone()))
    }
}

impl Drop for TestStateView<'_> {
    fn drop(&mut self) {
        self.store.open_views.set(self.store.open_views.get() - 1);
    }
}
