//! Storage for the zkEVM sync pipeline.
//!
//! [HermezDb] lays the sync tables out over an ordered [KeyValueStore] and implements every
//! capability trait of the reconciliation core, so the core's operations run directly against
//! an in-memory or rocksdb-backed store.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod kv;
pub use kv::{DiskKeyValueStore, KeyValueStore, MemoryKeyValueStore};

mod tables;
pub use tables::Table;

mod errors;
pub use errors::{DbError, DbResult};

mod hermez;
pub use hermez::{HermezDb, PlainStateView};
