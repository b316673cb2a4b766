//! Contains a concrete implementation of the [KeyValueStore] trait that stores data in memory.

use super::{Entry, KeyValueStore};
use crate::DbResult;
use std::collections::BTreeMap;

/// A key-value store held in memory. Useful for tests and for replaying a datadir snapshot.
#[derive(Default, Clone, Debug, Eq, PartialEq)]
pub struct MemoryKeyValueStore {
    store: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryKeyValueStore {
    /// Create a new [MemoryKeyValueStore] with an empty store.
    pub const fn new() -> Self {
        Self { store: BTreeMap::new() }
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        Ok(self.store.get(key).cloned())
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> DbResult<()> {
        self.store.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> DbResult<()> {
        self.store.remove(key);
        Ok(())
    }

    fn seek_prev(&self, key: &[u8]) -> DbResult<Option<Entry>> {
        Ok(self.store.range(..=key.to_vec()).next_back().map(|(k, v)| (k.clone(), v.clone())))
    }

    fn seek_next(&self, key: &[u8]) -> DbResult<Option<Entry>> {
        Ok(self.store.range(key.to_vec()..).next().map(|(k, v)| (k.clone(), v.clone())))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seek_bounds() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set(vec![1, 0], vec![10]).unwrap();
        kv.set(vec![1, 5], vec![15]).unwrap();
        kv.set(vec![2], vec![20]).unwrap();

        assert_eq!(kv.seek_prev(&[1, 5]).unwrap(), Some((vec![1, 5], vec![15])));
        assert_eq!(kv.seek_prev(&[1, 4]).unwrap(), Some((vec![1, 0], vec![10])));
        assert_eq!(kv.seek_prev(&[0]).unwrap(), None);
        assert_eq!(kv.seek_next(&[1, 1]).unwrap(), Some((vec![1, 5], vec![15])));
        assert_eq!(kv.seek_next(&[1, 5, 0]).unwrap(), Some((vec![2], vec![20])));
        assert_eq!(kv.seek_next(&[3]).unwrap(), None);
        assert_eq!(kv.len(), 3);

        kv.delete(&[1, 5]).unwrap();
        kv.delete(&[9]).unwrap();
        assert_eq!(kv.seek_next(&[1, 1]).unwrap(), Some((vec![2], vec![20])));
        assert_eq!(kv.len(), 2);
    }
}
