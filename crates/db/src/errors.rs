//! Errors for the `zk-db` crate.

use crate::Table;
use thiserror::Error;

/// A [Result] type alias where the error is [DbError].
pub type DbResult<T> = Result<T, DbError>;

/// An error encountered while reading or writing the database.
#[derive(Error, Debug)]
pub enum DbError {
    /// The rocksdb backend failed.
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    /// A stored value had an unexpected length.
    #[error("Corrupt value in table {table}: expected {expected} bytes, got {got}")]
    Corrupt {
        /// The table holding the value.
        table: Table,
        /// The expected length.
        expected: usize,
        /// The actual length.
        got: usize,
    },
    /// A stored block failed to decode.
    #[error("Failed to decode block: {0}")]
    Rlp(#[from] alloy_rlp::Error),
}
