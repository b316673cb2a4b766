//! Contains [HermezDb], the sync tables laid out over a [KeyValueStore].

use crate::{kv::Entry, DbError, DbResult, KeyValueStore, Table};
use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::Decodable;
use tracing::{debug, trace};
use zk_primitives::{ForkId, L2Block, SyncStage};
use zk_sync::traits::{
    BatchReader, BlockMetaReader, BlockReader, ForkConfigWriter, ForkReader, ProgressStore,
    StageProgressReader, StateView, StateViewProvider,
};

/// The [Table::Meta] key of the download frontier.
const LATEST_DOWNLOADED_BATCH: &[u8] = b"LatestDownloadedBatch";

/// The sync tables over a [KeyValueStore].
///
/// Implements every capability trait of the reconciliation core. Writers are used by the
/// ingestion stages; a single [HermezDb] must not be written concurrently.
#[derive(Debug, Default, Clone)]
pub struct HermezDb<KV> {
    kv: KV,
}

impl<KV: KeyValueStore> HermezDb<KV> {
    /// Creates a new [HermezDb] over `kv`.
    pub const fn new(kv: KV) -> Self {
        Self { kv }
    }

    /// Consumes the database, returning the underlying store.
    pub fn into_inner(self) -> KV {
        self.kv
    }

    /// Sets the progress of `stage`.
    pub fn set_stage_progress(&mut self, stage: SyncStage, progress: u64) -> DbResult<()> {
        self.put_u64(stage_key(stage), progress)
    }

    /// Assigns `block` to `batch`, removing it from the batch it was previously assigned to.
    pub fn write_block_batch(&mut self, block: u64, batch: u64) -> DbResult<()> {
        let key = Table::BlockBatches.key_u64(block);
        if let Some(previous) = self.get_u64(Table::BlockBatches, &key)? {
            if previous != batch {
                trace!(
                    target: "hermez_db",
                    "Moving block {block} from batch {previous} to {batch}"
                );
                self.kv.delete(&batch_block_key(previous, block))?;
            }
        }
        self.put_u64(key, batch)?;
        self.kv.set(batch_block_key(batch, block), Vec::new())
    }

    /// Records the fork of `batch`, lowering the fork's lowest batch if needed.
    pub fn write_batch_fork(&mut self, batch: u64, fork: ForkId) -> DbResult<()> {
        self.put_u64(Table::BatchForks.key_u64(batch), fork.id())?;

        let key = Table::ForkLowestBatch.key_u64(fork.id());
        match self.get_u64(Table::ForkLowestBatch, &key)? {
            Some(lowest) if lowest <= batch => Ok(()),
            _ => self.put_u64(key, batch),
        }
    }

    /// Records the L1 info tree index of `block`.
    pub fn write_l1_info_tree_index(&mut self, block: u64, index: u64) -> DbResult<()> {
        self.put_u64(Table::L1InfoTreeIndices.key_u64(block), index)
    }

    /// Records the effective gas price percentage of a transaction.
    pub fn write_effective_gas_price_percentage(
        &mut self,
        tx_hash: B256,
        percentage: u8,
    ) -> DbResult<()> {
        self.kv.set(Table::EffectiveGasPrices.key(&[tx_hash.as_slice()]), vec![percentage])
    }

    /// Stores `block`.
    pub fn write_block(&mut self, block: &L2Block) -> DbResult<()> {
        self.kv.set(Table::Blocks.key_u64(block.number), alloy_rlp::encode(block))
    }

    /// Sets the highest fully downloaded batch.
    pub fn set_latest_downloaded_batch_no(&mut self, batch: u64) -> DbResult<()> {
        self.put_u64(Table::Meta.key(&[LATEST_DOWNLOADED_BATCH]), batch)
    }

    /// Records that `block` wrote `value` to `slot` of `address`.
    pub fn write_storage(
        &mut self,
        address: Address,
        slot: B256,
        block: u64,
        value: &[u8],
    ) -> DbResult<()> {
        let key = Table::PlainStateHistory.key(&[
            address.as_slice(),
            slot.as_slice(),
            &block.to_be_bytes(),
        ]);
        self.kv.set(key, value.to_vec())
    }

    /// Returns the first block of `fork`, if set.
    pub fn fork_id_block(&self, fork: ForkId) -> DbResult<Option<u64>> {
        self.get_u64(Table::ForkIdBlocks, &Table::ForkIdBlocks.key_u64(fork.id()))
    }

    /// Returns every fork boundary, in fork order.
    pub fn fork_id_blocks(&self) -> DbResult<Vec<(ForkId, u64)>> {
        self.scan(&[Table::ForkIdBlocks.prefix()])?
            .into_iter()
            .map(|(key, value)| {
                let fork = decode_u64(Table::ForkIdBlocks, &key[1..])?;
                Ok((ForkId(fork), decode_u64(Table::ForkIdBlocks, &value)?))
            })
            .collect()
    }

    /// Returns the fork recorded for `batch`, if any.
    pub fn fork_by_batch(&self, batch: u64) -> DbResult<Option<ForkId>> {
        let fork = self.get_u64(Table::BatchForks, &Table::BatchForks.key_u64(batch))?;
        Ok(fork.map(ForkId))
    }

    /// Returns the blocks of `batch`, ascending.
    pub fn blocks_in_batch(&self, batch: u64) -> DbResult<Vec<u64>> {
        let prefix = Table::BatchBlocks.key_u64(batch);
        self.scan(&prefix)?
            .into_iter()
            .map(|(key, _)| decode_u64(Table::BatchBlocks, &key[prefix.len()..]))
            .collect()
    }

    fn get_u64(&self, table: Table, key: &[u8]) -> DbResult<Option<u64>> {
        self.kv.get(key)?.map(|value| decode_u64(table, &value)).transpose()
    }

    fn put_u64(&mut self, key: Vec<u8>, n: u64) -> DbResult<()> {
        self.kv.set(key, n.to_be_bytes().to_vec())
    }

    /// Returns every entry whose key starts with `prefix`, in key order.
    fn scan(&self, prefix: &[u8]) -> DbResult<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut probe = prefix.to_vec();
        while let Some((key, value)) = self.kv.seek_next(&probe)? {
            if !key.starts_with(prefix) {
                break;
            }
            // The smallest key greater than `key`.
            probe.clone_from(&key);
            probe.push(0);
            entries.push((key, value));
        }
        Ok(entries)
    }

    /// Returns the block in the [Table::BatchBlocks] entry of `batch`, if `entry` belongs to it.
    fn batch_block(batch: u64, entry: Option<Entry>) -> DbResult<Option<u64>> {
        let prefix = Table::BatchBlocks.key_u64(batch);
        entry
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| decode_u64(Table::BatchBlocks, &key[prefix.len()..]))
            .transpose()
    }
}

impl<KV> ProgressStore for HermezDb<KV> {
    type Error = DbError;
}

impl<KV: KeyValueStore> StageProgressReader for HermezDb<KV> {
    fn stage_progress(&self, stage: SyncStage) -> DbResult<u64> {
        Ok(self.get_u64(Table::SyncStageProgress, &stage_key(stage))?.unwrap_or_default())
    }
}

impl<KV: KeyValueStore> BatchReader for HermezDb<KV> {
    fn batch_no_by_l2_block(&self, block: u64) -> DbResult<u64> {
        let batch = self.get_u64(Table::BlockBatches, &Table::BlockBatches.key_u64(block))?;
        Ok(batch.unwrap_or_default())
    }

    fn highest_block_in_batch(&self, batch: u64) -> DbResult<Option<u64>> {
        let entry = self.kv.seek_prev(&batch_block_key(batch, u64::MAX))?;
        Self::batch_block(batch, entry)
    }

    fn latest_downloaded_batch_no(&self) -> DbResult<u64> {
        let key = Table::Meta.key(&[LATEST_DOWNLOADED_BATCH]);
        Ok(self.get_u64(Table::Meta, &key)?.unwrap_or_default())
    }
}

impl<KV: KeyValueStore> ForkReader for HermezDb<KV> {
    fn lowest_batch_by_fork(&self, fork: ForkId) -> DbResult<Option<u64>> {
        self.get_u64(Table::ForkLowestBatch, &Table::ForkLowestBatch.key_u64(fork.id()))
    }

    fn lowest_block_in_batch(&self, batch: u64) -> DbResult<Option<u64>> {
        let entry = self.kv.seek_next(&Table::BatchBlocks.key_u64(batch))?;
        Self::batch_block(batch, entry)
    }
}

impl<KV: KeyValueStore> ForkConfigWriter for HermezDb<KV> {
    fn set_fork_id_block(&mut self, fork: ForkId, block: u64) -> DbResult<()> {
        self.put_u64(Table::ForkIdBlocks.key_u64(fork.id()), block)?;
        debug!(target: "hermez_db", "Set fork {fork} to start at block {block}");
        Ok(())
    }
}

impl<KV: KeyValueStore> BlockReader for HermezDb<KV> {
    fn block_by_number(&self, number: u64) -> DbResult<Option<L2Block>> {
        let Some(raw) = self.kv.get(&Table::Blocks.key_u64(number))? else {
            return Ok(None);
        };
        Ok(Some(L2Block::decode(&mut raw.as_slice())?))
    }
}

impl<KV: KeyValueStore> BlockMetaReader for HermezDb<KV> {
    fn block_l1_info_tree_index(&self, block: u64) -> DbResult<u64> {
        let key = Table::L1InfoTreeIndices.key_u64(block);
        Ok(self.get_u64(Table::L1InfoTreeIndices, &key)?.unwrap_or_default())
    }

    fn effective_gas_price_percentage(&self, tx_hash: B256) -> DbResult<Option<u8>> {
        let key = Table::EffectiveGasPrices.key(&[tx_hash.as_slice()]);
        match self.kv.get(&key)?.as_deref() {
            None => Ok(None),
            Some([percentage]) => Ok(Some(*percentage)),
            Some(other) => Err(DbError::Corrupt {
                table: Table::EffectiveGasPrices,
                expected: 1,
                got: other.len(),
            }),
        }
    }
}

impl<KV: KeyValueStore> StateViewProvider for HermezDb<KV> {
    type View<'a>
        = PlainStateView<'a, KV>
    where
        Self: 'a;

    fn state_view_at(&self, block: u64) -> DbResult<Self::View<'_>> {
        trace!(target: "hermez_db", "Opening state view at block {block}");
        Ok(PlainStateView { kv: &self.kv, block })
    }
}

/// A read-only view of contract storage as it was before a given block executed.
///
/// A view anchored at block `N` sees the latest write recorded by a block below `N`.
#[derive(Debug)]
pub struct PlainStateView<'a, KV> {
    kv: &'a KV,
    block: u64,
}

impl<KV> PlainStateView<'_, KV> {
    /// Returns the block the view is anchored at.
    pub const fn block(&self) -> u64 {
        self.block
    }
}

impl<KV: KeyValueStore> StateView for PlainStateView<'_, KV> {
    type Error = DbError;

    fn read_account_storage(&self, address: Address, slot: B256) -> DbResult<Option<Bytes>> {
        let Some(last_visible) = self.block.checked_sub(1) else {
            return Ok(None);
        };

        let prefix = Table::PlainStateHistory.key(&[address.as_slice(), slot.as_slice()]);
        let probe = Table::PlainStateHistory.key(&[
            address.as_slice(),
            slot.as_slice(),
            &last_visible.to_be_bytes(),
        ]);
        let entry = self.kv.seek_prev(&probe)?;
        Ok(entry.filter(|(key, _)| key.starts_with(&prefix)).map(|(_, value)| value.into()))
    }
}

impl<KV> Drop for PlainStateView<'_, KV> {
    fn drop(&mut self) {
        trace!(target: "hermez_db", "Closing state view at block {}", self.block);
    }
}

fn stage_key(stage: SyncStage) -> Vec<u8> {
    Table::SyncStageProgress.key(&[stage.key().as_bytes()])
}

fn batch_block_key(batch: u64, block: u64) -> Vec<u8> {
    Table::BatchBlocks.key(&[&batch.to_be_bytes(), &block.to_be_bytes()])
}

fn decode_u64(table: Table, raw: &[u8]) -> DbResult<u64> {
    <[u8; 8]>::try_from(raw)
        .map(u64::from_be_bytes)
        .map_err(|_| DbError::Corrupt { table, expected: 8, got: raw.len() })
}
