//! Command line arguments and tracing setup.

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use zk_primitives::{ChainConfig, ForkId};

/// The `zkctl` CLI arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub(crate) struct ZkCli {
    /// Verbosity level (0-4)
    #[arg(long, short, help = "Verbosity level (0 [error] - 4 [trace]) - Default: 0 [error]", action = ArgAction::Count)]
    pub(crate) v: u8,
    /// The data directory of the sync database.
    #[arg(long, env = "ZK_DATADIR")]
    pub(crate) datadir: PathBuf,
    /// Path to a JSON chain config. Defaults to the zkEVM mainnet forks and GER manager.
    #[arg(long, env = "ZK_CHAIN_CONFIG")]
    pub(crate) chain_config: Option<PathBuf>,
    /// The operation to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// An operation against the sync database.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// Prints the block execution should run up to, if it can fast-forward.
    ShortCircuit,
    /// Reconciles fork boundaries against the batch index and prints the fork table.
    UpdateForks,
    /// Resets the boundary of every fork up to `--fork` to `--block`.
    RecoverForks {
        /// The block to resume from.
        #[arg(long)]
        block: u64,
        /// The fork active at `--block`.
        #[arg(long, value_parser = parse_fork_id)]
        fork: ForkId,
    },
    /// Prints the local exit root as of the end of a batch.
    ExitRoot {
        /// The batch number.
        #[arg(long)]
        batch: u64,
    },
    /// Prints the hex-encoded L2 data of a batch.
    BatchData {
        /// The batch number.
        #[arg(long)]
        batch: u64,
        /// The fork to encode for. Defaults to the fork recorded for the batch.
        #[arg(long, value_parser = parse_fork_id)]
        fork: Option<ForkId>,
    },
    /// Prints the stored fork boundaries.
    ForkTable,
}

impl ZkCli {
    /// Reads the [ChainConfig] from `--chain-config`, or returns the default config.
    pub(crate) fn read_chain_config(&self) -> Result<ChainConfig> {
        let Some(path) = self.chain_config.as_ref() else {
            return Ok(ChainConfig::default());
        };

        let ser_config = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Error reading chain config {}: {e}", path.display()))?;
        let config: ChainConfig = serde_json::from_str(&ser_config)
            .map_err(|e| anyhow!("Error deserializing ChainConfig: {e}"))?;

        if !config.forks_ordered() {
            return Err(anyhow!("Chain config forks must be strictly ascending"));
        }
        Ok(config)
    }
}

/// Parse a string slice into a [ForkId].
fn parse_fork_id(s: &str) -> Result<ForkId, String> {
    s.parse::<u64>().map(ForkId).map_err(|_| format!("Invalid fork id: {s}"))
}

/// Initializes the tracing subscriber
///
/// # Arguments
/// * `verbosity_level` - The verbosity level (0-4)
///
/// # Returns
/// * `Result<()>` - Ok if successful, Err otherwise.
pub(crate) fn init_tracing_subscriber(verbosity_level: u8) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(match verbosity_level {
            0 => Level::ERROR,
            1 => Level::WARN,
            2 => Level::INFO,
            3 => Level::DEBUG,
            _ => Level::TRACE,
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_subcommands() {
        let cases = [
            (["short-circuit"].as_slice(), Some(Command::ShortCircuit)),
            (["recover-forks", "--block", "10", "--fork", "8"].as_slice(), {
                Some(Command::RecoverForks { block: 10, fork: ForkId(8) })
            }),
            (["batch-data", "--batch", "4"].as_slice(), {
                Some(Command::BatchData { batch: 4, fork: None })
            }),
            (["exit-root", "--batch", "x"].as_slice(), None),
            (["recover-forks", "--block", "10", "--fork", "banana"].as_slice(), None),
            (["fork-table"].as_slice(), Some(Command::ForkTable)),
        ];

        for (args, expected) in cases {
            let argv = ["zkctl", "--datadir", "/tmp/zk"].iter().chain(args);
            let parsed = ZkCli::try_parse_from(argv).ok().map(|cli| cli.command);
            assert_eq!(parsed, expected, "{args:?}");
        }
    }

    #[test]
    fn test_verbosity_count() {
        let cli =
            ZkCli::try_parse_from(["zkctl", "-vvv", "--datadir", "d", "fork-table"]).unwrap();
        assert_eq!(cli.v, 3);
        assert_eq!(cli.read_chain_config().unwrap(), ChainConfig::default());
    }

    #[test]
    fn test_read_chain_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "forks": [9, 12] }}"#).unwrap();
        let path = file.path().to_str().unwrap();

        let argv = ["zkctl", "--datadir", "d", "--chain-config", path, "fork-table"];
        let cli = ZkCli::try_parse_from(argv).unwrap();
        let config = cli.read_chain_config().unwrap();
        assert_eq!(config.forks, vec![ForkId::FORK_9_ELDERBERRY_2, ForkId::FORK_12_BANANA]);

        let mut unordered = tempfile::NamedTempFile::new().unwrap();
        write!(unordered, r#"{{ "forks": [12, 9] }}"#).unwrap();
        let cli = ZkCli { chain_config: Some(unordered.path().to_path_buf()), ..cli };
        assert!(cli.read_chain_config().is_err());
    }
}
