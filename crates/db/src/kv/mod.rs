//! The [KeyValueStore] trait and its in-memory and on-disk implementations.

use crate::DbResult;

mod mem;
pub use mem::MemoryKeyValueStore;

mod disk;
pub use disk::DiskKeyValueStore;

/// A key-value entry.
pub type Entry = (Vec<u8>, Vec<u8>);

/// A synchronous key-value store ordered by key bytes.
pub trait KeyValueStore {
    /// Gets the value associated with `key`.
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>>;

    /// Sets the value associated with `key`.
    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> DbResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> DbResult<()>;

    /// Returns the entry with the greatest key less than or equal to `key`.
    fn seek_prev(&self, key: &[u8]) -> DbResult<Option<Entry>>;

    /// Returns the entry with the smallest key greater than or equal to `key`.
    fn seek_next(&self, key: &[u8]) -> DbResult<Option<Entry>>;
}
