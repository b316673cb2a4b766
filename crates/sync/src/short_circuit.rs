//! The short-circuit decision: how far execution may fast-forward before its next cycle.

use crate::traits::{BatchReader, StageProgressReader};
use tracing::{debug, info, trace};
use zk_primitives::SyncStage;

/// A redirection target for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortCircuit {
    /// The batch execution is redirected to.
    pub batch: u64,
    /// The highest block of [Self::batch]. Execution runs up to and including this block.
    pub block: u64,
}

/// Decides whether execution should be short-circuited, reading the cursors from `store`.
///
/// The verified batch is read from [SyncStage::L1VerificationsBatchNo], the executed batch is
/// the batch owning the [SyncStage::Execution] block, and the downloaded batch is the store's
/// download frontier. See [short_circuit_target] for the decision itself.
///
/// ## Returns
/// - `Ok(Some(_))`: Execution should run up to the returned block.
/// - `Ok(None)`: Execution is already at the download frontier.
/// - `Err(_)`: A store read failed. No partial decision is made.
pub fn should_short_circuit_execution<P>(store: &P) -> Result<Option<ShortCircuit>, P::Error>
where
    P: StageProgressReader + BatchReader,
{
    let verified = store.stage_progress(SyncStage::L1VerificationsBatchNo)?;
    let executed_block = store.stage_progress(SyncStage::Execution)?;
    let executed = store.batch_no_by_l2_block(executed_block)?;
    let downloaded = store.latest_downloaded_batch_no()?;

    let target = short_circuit_target(verified, executed, downloaded, |batch| {
        store.highest_block_in_batch(batch)
    })?;

    match target {
        Some(ShortCircuit { batch, block }) => {
            info!(target: "short_circuit", "Short circuit to batch {batch}, block {block}");
        }
        None => {
            debug!(
                target: "short_circuit",
                "No short circuit: executed batch {executed}, downloaded batch {downloaded}"
            );
        }
    }

    Ok(target)
}

/// Computes the short-circuit target from the three cursors.
///
/// - If the executed batch lags the verified batch, the target is the lesser of the verified
///   and downloaded batches. Finality is caught up first, capped by what is available.
/// - Otherwise the target is the first non-empty batch after the executed batch, up to and
///   including the downloaded batch. If there is none, there is no target.
///
/// Batches may be empty; a batch is only a valid target if `highest_block_in_batch` yields a
/// non-zero block. When a lagging-verification target turns out to be empty, the highest
/// non-empty batch below it (and above the executed batch) is used, since executing to its end
/// covers every block up to the target. If every batch up to the target is empty, the first
/// non-empty batch after it, up to the downloaded batch, is used instead.
///
/// The scan over empty batches is linear, bounded by the downloaded batch.
pub fn short_circuit_target<E, F>(
    verified: u64,
    executed: u64,
    downloaded: u64,
    mut highest_block_in_batch: F,
) -> Result<Option<ShortCircuit>, E>
where
    F: FnMut(u64) -> Result<Option<u64>, E>,
{
    let mut non_empty = |batch: u64| -> Result<Option<ShortCircuit>, E> {
        let found = highest_block_in_batch(batch)?
            .filter(|block| *block != 0)
            .map(|block| ShortCircuit { batch, block });
        if found.is_none() {
            trace!(target: "short_circuit", "Batch {batch} is empty");
        }
        Ok(found)
    };

    if executed < verified {
        let target = verified.min(downloaded);
        if let Some(short_circuit) = non_empty(target)? {
            return Ok(Some(short_circuit));
        }
        for batch in (executed + 1..target).rev() {
            if let Some(short_circuit) = non_empty(batch)? {
                return Ok(Some(short_circuit));
            }
        }
        // Everything up to the target is empty, so continue with the batches after it.
        return forward_from(target, downloaded, non_empty);
    }

    forward_from(executed, downloaded, non_empty)
}

/// Returns the first non-empty batch in `(after, downloaded]`.
fn forward_from<E, F>(
    after: u64,
    downloaded: u64,
    mut non_empty: F,
) -> Result<Option<ShortCircuit>, E>
where
    F: FnMut(u64) -> Result<Option<ShortCircuit>, E>,
{
    let Some(first) = after.checked_add(1) else {
        return Ok(None);
    };
    for batch in first..=downloaded {
        if let Some(short_circuit) = non_empty(batch)? {
            return Ok(Some(short_circuit));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{TestProgressStore, TestStoreError};
    use alloc::collections::BTreeMap;
    use proptest::prelude::*;

    /// Builds a store where every batch in `batches` ends at `batch * 1000`.
    fn store_with(
        verified: u64,
        executed_batch: u64,
        downloaded: u64,
        batches: impl IntoIterator<Item = u64>,
    ) -> TestProgressStore {
        let mut store = TestProgressStore::default();
        for batch in batches {
            store.insert_batch(batch, batch * 1000 - 1..=batch * 1000);
        }
        store.insert_batch(executed_batch, executed_batch * 1000 + 1..=executed_batch * 1000 + 1);
        store.set_stage_progress(SyncStage::L1VerificationsBatchNo, verified);
        store.set_stage_progress(SyncStage::Execution, executed_batch * 1000 + 1);
        store.downloaded_batch = downloaded;
        store
    }

    fn lookup(table: &BTreeMap<u64, u64>) -> impl FnMut(u64) -> Result<Option<u64>, ()> + '_ {
        |batch| Ok(table.get(&batch).copied())
    }

    #[test]
    fn test_catch_up_to_verified() {
        let mut store = TestProgressStore::default();
        store.insert_batch(3, 3000..=3000);
        store.insert_batch(5, 4990..=5000);
        store.set_stage_progress(SyncStage::L1VerificationsBatchNo, 5);
        store.set_stage_progress(SyncStage::Execution, 3000);
        store.downloaded_batch = 10;

        let target = should_short_circuit_execution(&store).unwrap();
        assert_eq!(target, Some(ShortCircuit { batch: 5, block: 5000 }));
    }

    #[test]
    fn test_at_download_frontier() {
        let store = store_with(5, 7, 7, 1..=7);
        assert_eq!(should_short_circuit_execution(&store).unwrap(), None);
    }

    #[test]
    fn test_skips_empty_batch() {
        let mut store = store_with(5, 7, 9, 1..=7);
        store.insert_batch(9, 9050..=9100);

        let target = should_short_circuit_execution(&store).unwrap();
        assert_eq!(target, Some(ShortCircuit { batch: 9, block: 9100 }));
    }

    #[test]
    fn test_only_empty_batches_ahead() {
        let table = BTreeMap::from([(7, 7000)]);
        assert_eq!(short_circuit_target(5, 7, 12, lookup(&table)), Ok(None));
    }

    #[test]
    fn test_verified_capped_by_download() {
        let table = BTreeMap::from([(4, 4000), (6, 6000), (8, 8000)]);
        assert_eq!(
            short_circuit_target(8, 2, 6, lookup(&table)),
            Ok(Some(ShortCircuit { batch: 6, block: 6000 }))
        );
    }

    #[test]
    fn test_empty_verified_batch_falls_back_below() {
        let table = BTreeMap::from([(4, 4000), (5, 5000)]);
        assert_eq!(
            short_circuit_target(7, 3, 10, lookup(&table)),
            Ok(Some(ShortCircuit { batch: 5, block: 5000 }))
        );
        // Nothing executable anywhere ahead of the executed batch.
        assert_eq!(short_circuit_target(7, 5, 10, lookup(&BTreeMap::new())), Ok(None));
    }

    #[test]
    fn test_empty_up_to_verified_moves_past_it() {
        let table = BTreeMap::from([(3, 3000), (8, 8000), (9, 9000)]);
        assert_eq!(
            short_circuit_target(7, 3, 10, lookup(&table)),
            Ok(Some(ShortCircuit { batch: 8, block: 8000 }))
        );
        // The batches past the verified batch stop at the download frontier.
        assert_eq!(short_circuit_target(7, 3, 7, lookup(&table)), Ok(None));
    }

    #[test]
    fn test_zero_block_counts_as_empty() {
        let table = BTreeMap::from([(1, 0), (2, 20)]);
        assert_eq!(
            short_circuit_target(0, 0, 2, lookup(&table)),
            Ok(Some(ShortCircuit { batch: 2, block: 20 }))
        );
    }

    #[test]
    fn test_executed_at_max_batch() {
        let target = short_circuit_target(0, u64::MAX, u64::MAX, |_| Ok::<_, ()>(Some(1)));
        assert_eq!(target, Ok(None));
    }

    #[test]
    fn test_read_failure_propagates() {
        let mut store = store_with(5, 3, 10, 1..=10);
        store.fail_reads = true;
        assert_eq!(should_short_circuit_execution(&store).unwrap_err(), TestStoreError::Read);

        let err =
            short_circuit_target(5, 7, 9, |batch| if batch == 9 { Err(batch) } else { Ok(None) });
        assert_eq!(err, Err(9));
    }

    proptest! {
        #[test]
        fn test_lagging_execution_targets_verified_or_downloaded(
            executed in 0u64..1_000,
            verified_gap in 1u64..1_000,
            downloaded_offset in 0u64..2_000,
        ) {
            let verified = executed + verified_gap;
            let downloaded = executed + 1 + downloaded_offset;
            let target = short_circuit_target(verified, executed, downloaded, |batch| {
                Ok::<_, ()>(Some(batch * 10 + 9))
            })
            .unwrap()
            .unwrap();

            let expected = verified.min(downloaded);
            prop_assert_eq!(target.batch, expected);
            prop_assert_eq!(target.block, expected * 10 + 9);
        }

        #[test]
        fn test_leading_execution_targets_next_non_empty(
            verified in 0u64..500,
            executed_offset in 0u64..500,
            ahead in 0u64..20,
            empty_mask in proptest::collection::vec(any::<bool>(), 20),
        ) {
            let executed = verified + executed_offset;
            let downloaded = executed + ahead;
            let is_empty = |batch: u64| empty_mask[((batch - executed) % 20) as usize];
            let target = short_circuit_target(verified, executed, downloaded, |batch| {
                Ok::<_, ()>((!is_empty(batch)).then_some(batch * 10))
            })
            .unwrap();

            let expected = (executed + 1..=downloaded).find(|batch| !is_empty(*batch));
            prop_assert_eq!(target.map(|t| t.batch), expected);
            if let Some(target) = target {
                prop_assert_eq!(target.block, target.batch * 10);
            }
        }
    }
}
