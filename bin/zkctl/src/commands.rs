//! Runs a [Command] against a [HermezDb].

use crate::cli::Command;
use alloy_primitives::hex;
use anyhow::{anyhow, Result};
use tracing::info;
use zk_codec::ZkEvmL2DataEncoder;
use zk_db::{HermezDb, KeyValueStore};
use zk_primitives::{ChainConfig, L2Block};
use zk_sync::prelude::*;

/// Runs `command`, returning the text to print.
pub(crate) fn run<KV: KeyValueStore>(
    db: &mut HermezDb<KV>,
    config: &ChainConfig,
    command: &Command,
) -> Result<String> {
    match command {
        Command::ShortCircuit => Ok(match should_short_circuit_execution(&*db)? {
            Some(ShortCircuit { batch, block }) => format!("batch {batch} block {block}"),
            None => "none".to_string(),
        }),
        Command::UpdateForks => {
            update_fork_boundaries(db, &config.forks)?;
            fork_table(db)
        }
        Command::RecoverForks { block, fork } => {
            info!(target: "zkctl", "Recovering fork boundaries up to fork {fork} at block {block}");
            recover_fork_boundaries(db, &config.forks, *block, *fork)?;
            fork_table(db)
        }
        Command::ExitRoot { batch } => {
            let root = batch_local_exit_root(&*db, *batch, config.ger_manager_address)?;
            Ok(root.to_string())
        }
        Command::BatchData { batch, fork } => {
            let fork = match fork {
                Some(fork) => *fork,
                None => db
                    .fork_by_batch(*batch)?
                    .ok_or_else(|| anyhow!("No fork recorded for batch {batch}"))?,
            };
            let blocks = db
                .blocks_in_batch(*batch)?
                .into_iter()
                .map(|number| -> Result<L2Block> {
                    db.block_by_number(number)?
                        .ok_or_else(|| anyhow!("Block {number} of batch {batch} not found"))
                })
                .collect::<Result<Vec<L2Block>>>()?;

            let data = generate_batch_data(&*db, &ZkEvmL2DataEncoder, &blocks, fork)?;
            Ok(hex::encode_prefixed(data))
        }
        Command::ForkTable => fork_table(db),
    }
}

fn fork_table<KV: KeyValueStore>(db: &HermezDb<KV>) -> Result<String> {
    let rows = db
        .fork_id_blocks()?
        .into_iter()
        .map(|(fork, block)| format!("{fork}\t{block}"))
        .collect::<Vec<_>>();
    Ok(rows.join("\n"))
}
