//! Contains the [Table] type, the one-byte key prefixes partitioning the store.

use derive_more::Display;

/// A logical table. Every key starts with its table's prefix byte.
///
/// Integers inside keys and values are big-endian `u64`s, so that key order matches numeric
/// order.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Table {
    /// `stage key -> progress`.
    SyncStageProgress = 0x01,
    /// `block -> batch`.
    BlockBatches = 0x02,
    /// `batch ++ block -> ()`. Ordered so the first and last block of a batch are one seek away.
    BatchBlocks = 0x03,
    /// `batch -> fork`.
    BatchForks = 0x04,
    /// `fork -> lowest batch`.
    ForkLowestBatch = 0x05,
    /// `fork -> first block`.
    ForkIdBlocks = 0x06,
    /// `block -> L1 info tree index`.
    L1InfoTreeIndices = 0x07,
    /// `tx hash -> effective gas price percentage`.
    EffectiveGasPrices = 0x08,
    /// `block -> rlp(block)`.
    Blocks = 0x09,
    /// `address ++ slot ++ block -> value`. The value written to a slot by a block.
    PlainStateHistory = 0x0a,
    /// `name -> value`. Singleton values.
    Meta = 0x0b,
}

impl Table {
    /// Returns the table's key prefix.
    pub const fn prefix(self) -> u8 {
        self as u8
    }

    /// Builds a key in this table from the concatenation of `parts`.
    pub fn key(self, parts: &[&[u8]]) -> Vec<u8> {
        let len = 1 + parts.iter().map(|part| part.len()).sum::<usize>();
        let mut key = Vec::with_capacity(len);
        key.push(self.prefix());
        parts.iter().for_each(|part| key.extend_from_slice(part));
        key
    }

    /// Builds a key in this table from a single integer.
    pub fn key_u64(self, n: u64) -> Vec<u8> {
        self.key(&[&n.to_be_bytes()])
    }
}
