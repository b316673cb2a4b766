//! Contains the [SyncStage] type.

use derive_more::Display;

/// A named stage-progress cursor.
///
/// Each stage owns its cursor and is the only writer of it. Most cursors hold a block number;
/// [SyncStage::L1VerificationsBatchNo] holds the highest batch number verified on L1.
#[derive(Debug, Display, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncStage {
    /// Highest L2 block executed locally.
    Execution,
    /// Highest batch number verified on L1.
    L1VerificationsBatchNo,
    /// Highest L2 block downloaded from the data stream.
    Batches,
}

impl SyncStage {
    /// Returns the stable key under which the stage's progress is persisted.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Execution => "Execution",
            Self::L1VerificationsBatchNo => "L1VerificationsBatchNo",
            Self::Batches => "Batches",
        }
    }
}
