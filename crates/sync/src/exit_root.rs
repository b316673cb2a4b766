//! Resolution of a batch's local exit root from historical contract storage.

use crate::traits::{BatchReader, StateView, StateViewProvider};
use alloy_primitives::{Address, B256};
use tracing::{debug, trace};
use zk_primitives::LOCAL_EXIT_ROOT_SLOT;

/// Returns the local exit root as of the end of `batch`.
///
/// The root is read from the GER manager at `ger_manager` in the state following the batch's
/// highest block. Batch zero, and batches without blocks, resolve to the zero hash.
pub fn batch_local_exit_root<P>(
    store: &P,
    batch: u64,
    ger_manager: Address,
) -> Result<B256, P::Error>
where
    P: BatchReader + StateViewProvider,
{
    if batch == 0 {
        return Ok(B256::ZERO);
    }

    let block = store.highest_block_in_batch(batch)?.unwrap_or_default();
    trace!(target: "exit_root", "Batch {batch} ends at block {block}");
    local_exit_root_by_block(store, block, ger_manager)
}

/// Returns the local exit root as of the end of `block`.
///
/// Block zero resolves to the zero hash without opening a state view. Otherwise a view is
/// opened after `block` and released before returning, whether or not the read succeeds.
pub fn local_exit_root_by_block<P>(
    store: &P,
    block: u64,
    ger_manager: Address,
) -> Result<B256, P::Error>
where
    P: StateViewProvider,
{
    if block == 0 {
        return Ok(B256::ZERO);
    }

    let raw = {
        let view = store.state_view_at(block.saturating_add(1))?;
        view.read_account_storage(ger_manager, LOCAL_EXIT_ROOT_SLOT)?
    };

    let root = raw.as_ref().map(|raw| bytes_to_hash(raw)).unwrap_or_default();
    debug!(target: "exit_root", "Local exit root at block {block}: {root}");
    Ok(root)
}

/// Interprets `raw` as a big-endian hash: left-padded when short, keeping the trailing 32 bytes
/// when long.
fn bytes_to_hash(raw: &[u8]) -> B256 {
    B256::left_padding_from(&raw[raw.len().saturating_sub(32)..])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{TestProgressStore, TestStoreError};
    use alloy_primitives::{address, b256, Bytes};
    use zk_primitives::GER_MANAGER_ADDRESS;

    const ROOT: B256 = b256!("1c5d9fbb5a42f2e41dba11d1b0b1a3a6e45cde6d5dc1b7ac0e4c3fa8d2b91a47");

    fn store_with_root() -> TestProgressStore {
        let root_bytes = Bytes::copy_from_slice(ROOT.as_slice());
        let mut store = TestProgressStore::default();
        store.insert_batch(1, 1..=10);
        store.insert_batch(2, 11..=20);
        store.insert_storage(GER_MANAGER_ADDRESS, LOCAL_EXIT_ROOT_SLOT, 20, root_bytes);
        // Written by the first block of the next batch.
        let later = Bytes::from_static(&[0xff]);
        store.insert_storage(GER_MANAGER_ADDRESS, LOCAL_EXIT_ROOT_SLOT, 21, later);
        store
    }

    #[test]
    fn test_zero_batch_never_opens_view() {
        let store = store_with_root();
        assert_eq!(batch_local_exit_root(&store, 0, GER_MANAGER_ADDRESS), Ok(B256::ZERO));
        assert_eq!(local_exit_root_by_block(&store, 0, GER_MANAGER_ADDRESS), Ok(B256::ZERO));
        assert_eq!(store.views_opened.get(), 0);
    }

    #[test]
    fn test_batch_without_blocks_is_zero() {
        let store = store_with_root();
        assert_eq!(batch_local_exit_root(&store, 9, GER_MANAGER_ADDRESS), Ok(B256::ZERO));
        assert_eq!(store.views_opened.get(), 0);
    }

    #[test]
    fn test_reads_state_after_last_block() {
        let store = store_with_root();
        assert_eq!(batch_local_exit_root(&store, 2, GER_MANAGER_ADDRESS), Ok(ROOT));
        assert_eq!(store.views_opened.get(), 1);
        assert_eq!(store.open_views.get(), 0);
        assert_eq!(store.storage_reads.get(), 1);
    }

    #[test]
    fn test_unwritten_slot_is_zero() {
        let store = store_with_root();
        assert_eq!(batch_local_exit_root(&store, 1, GER_MANAGER_ADDRESS), Ok(B256::ZERO));
        let other = address!("0000000000000000000000000000000000000001");
        assert_eq!(batch_local_exit_root(&store, 2, other), Ok(B256::ZERO));
    }

    #[test]
    fn test_short_value_left_padded() {
        let mut store = TestProgressStore::default();
        store.insert_batch(3, 30..=30);
        let raw = Bytes::from_static(&[0x12, 0x34]);
        store.insert_storage(GER_MANAGER_ADDRESS, LOCAL_EXIT_ROOT_SLOT, 30, raw);
        assert_eq!(
            batch_local_exit_root(&store, 3, GER_MANAGER_ADDRESS),
            Ok(b256!("0000000000000000000000000000000000000000000000000000000000001234"))
        );
    }

    #[test]
    fn test_long_value_keeps_trailing_bytes() {
        let mut raw = alloc::vec![0xaa; 4];
        raw.extend_from_slice(ROOT.as_slice());
        assert_eq!(bytes_to_hash(&raw), ROOT);
    }

    #[test]
    fn test_view_released_on_read_failure() {
        let mut store = store_with_root();
        store.fail_storage_reads = true;
        assert_eq!(
            batch_local_exit_root(&store, 2, GER_MANAGER_ADDRESS),
            Err(TestStoreError::Read)
        );
        assert_eq!(store.views_opened.get(), 1);
        assert_eq!(store.open_views.get(), 0);
    }

    #[test]
    fn test_store_failure_propagates() {
        let mut store = store_with_root();
        store.fail_reads = true;
        assert_eq!(
            batch_local_exit_root(&store, 2, GER_MANAGER_ADDRESS),
            Err(TestStoreError::Read)
        );
        assert_eq!(store.views_opened.get(), 0);
    }
}
