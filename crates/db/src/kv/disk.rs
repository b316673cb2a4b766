//! Contains a concrete implementation of the [KeyValueStore] trait that stores data on disk
//! using [rocksdb].

use super::{Entry, KeyValueStore, MemoryKeyValueStore};
use crate::{DbError, DbResult};
use rocksdb::{Direction, IteratorMode, Options, DB};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A synchronous key-value store persisted in a rocksdb data directory.
#[derive(Debug)]
pub struct DiskKeyValueStore {
    data_directory: PathBuf,
    db: DB,
}

impl DiskKeyValueStore {
    /// Opens the store at `data_directory`, creating it if missing.
    pub fn open(data_directory: impl AsRef<Path>) -> DbResult<Self> {
        let data_directory = data_directory.as_ref().to_path_buf();
        let db = DB::open(&Self::get_db_options(), &data_directory)?;
        debug!(target: "hermez_db", "Opened database at {}", data_directory.display());
        Ok(Self { data_directory, db })
    }

    /// Returns the data directory backing the store.
    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    /// Gets the [Options] for the underlying RocksDB instance.
    fn get_db_options() -> Options {
        let mut options = Options::default();
        options.set_compression_type(rocksdb::DBCompressionType::Snappy);
        options.create_if_missing(true);
        options
    }

    fn first_entry(&self, mode: IteratorMode<'_>) -> DbResult<Option<Entry>> {
        let entry = self.db.iterator(mode).next().transpose()?;
        Ok(entry.map(|(k, v)| (k.into_vec(), v.into_vec())))
    }
}

impl KeyValueStore for DiskKeyValueStore {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> DbResult<()> {
        Ok(self.db.put(key, value)?)
    }

    fn delete(&mut self, key: &[u8]) -> DbResult<()> {
        Ok(self.db.delete(key)?)
    }

    fn seek_prev(&self, key: &[u8]) -> DbResult<Option<Entry>> {
        self.first_entry(IteratorMode::From(key, Direction::Reverse))
    }

    fn seek_next(&self, key: &[u8]) -> DbResult<Option<Entry>> {
        self.first_entry(IteratorMode::From(key, Direction::Forward))
    }
}

impl TryFrom<&DiskKeyValueStore> for MemoryKeyValueStore {
    type Error = DbError;

    fn try_from(disk_store: &DiskKeyValueStore) -> DbResult<Self> {
        let mut memory_store = Self::new();
        for entry in disk_store.db.iterator(IteratorMode::Start) {
            let (key, value) = entry?;
            memory_store.set(key.into_vec(), value.into_vec())?;
        }
        Ok(memory_store)
    }
}
