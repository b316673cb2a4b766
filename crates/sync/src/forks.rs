//! Fork boundary tracking: the block at which each fork becomes active.

use crate::traits::{ForkConfigWriter, ForkReader};
use thiserror::Error;
use tracing::{debug, error, trace, warn};
use zk_primitives::ForkId;

/// An error encountered while updating fork boundaries.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ForkUpdateError<E>
where
    E: core::error::Error,
{
    /// Reading the lowest batch or block for a fork failed.
    #[error("Failed to read the boundary of fork {fork}: {source}")]
    Read {
        /// The fork being reconciled.
        fork: ForkId,
        /// The store error.
        #[source]
        source: E,
    },
    /// Persisting a boundary failed. The pass was aborted.
    #[error("Failed to set fork {fork} to block {block}: {source}")]
    Write {
        /// The fork being written.
        fork: ForkId,
        /// The boundary that was being written.
        block: u64,
        /// The store error.
        #[source]
        source: E,
    },
}

/// Reconciles the boundary of every fork in `forks` against the batch index.
///
/// Forks are visited in the given order, which must be canonical ascending order. For each
/// fork, the lowest block of its lowest batch becomes its boundary. A fork without a block
/// inherits the last boundary written in this pass, or is skipped if no earlier fork has one
/// yet. Boundaries never decrease along the fork order: a block lower than the previous
/// boundary is raised to it.
///
/// A write failure aborts the pass; boundaries written before it are left in place.
pub fn update_fork_boundaries<P>(
    store: &mut P,
    forks: &[ForkId],
) -> Result<(), ForkUpdateError<P::Error>>
where
    P: ForkReader + ForkConfigWriter,
{
    let mut last_set_block: Option<u64> = None;

    for &fork in forks {
        let found = match store
            .lowest_batch_by_fork(fork)
            .map_err(|source| ForkUpdateError::Read { fork, source })?
        {
            Some(batch) => store
                .lowest_block_in_batch(batch)
                .map_err(|source| ForkUpdateError::Read { fork, source })?,
            None => None,
        };

        let block = match (found, last_set_block) {
            (Some(block), Some(last)) if block < last => {
                warn!(
                    target: "forks",
                    "Fork {fork} starts at block {block}, below the previous boundary {last}"
                );
                last
            }
            (Some(block), _) => block,
            (None, Some(last)) => {
                trace!(
                    target: "forks",
                    "No block number found for fork {fork}, using last set block number {last}"
                );
                last
            }
            (None, None) => {
                trace!(
                    target: "forks",
                    "No block number found for fork {fork} and no previous block number set"
                );
                continue;
            }
        };

        write_boundary(store, fork, block)?;
        last_set_block = Some(block);
    }

    Ok(())
}

/// Resets the boundary of every fork at or below `fork` to `block`, leaving later forks
/// untouched.
///
/// Used after an interrupted resync to re-establish a consistent table in one pass.
pub fn recover_fork_boundaries<P>(
    store: &mut P,
    forks: &[ForkId],
    block: u64,
    fork: ForkId,
) -> Result<(), ForkUpdateError<P::Error>>
where
    P: ForkConfigWriter,
{
    for &candidate in forks.iter().filter(|candidate| **candidate <= fork) {
        write_boundary(store, candidate, block)?;
    }
    debug!(target: "forks", "Recovered fork boundaries up to fork {fork} at block {block}");
    Ok(())
}

fn write_boundary<P>(
    store: &mut P,
    fork: ForkId,
    block: u64,
) -> Result<(), ForkUpdateError<P::Error>>
where
    P: ForkConfigWriter,
{
    store.set_fork_id_block(fork, block).map_err(|source| {
        error!(target: "forks", "Error setting fork id {fork} to block {block}: {source}");
        ForkUpdateError::Write { fork, block, source }
    })
}
