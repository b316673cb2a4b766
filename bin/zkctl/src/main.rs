//! `zkctl` opens a sync datadir and runs the reconciliation operations against it.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use zk_db::{DiskKeyValueStore, HermezDb};

mod cli;
use cli::{init_tracing_subscriber, ZkCli};

mod commands;

fn main() -> Result<()> {
    let cli = ZkCli::parse();
    init_tracing_subscriber(cli.v)?;

    let config = cli.read_chain_config()?;
    let mut db = HermezDb::new(DiskKeyValueStore::open(&cli.datadir)?);

    let output = commands::run(&mut db, &config, &cli.command)?;
    println!("{output}");

    info!(target: "zkctl", "Done.");
    Ok(())
}
