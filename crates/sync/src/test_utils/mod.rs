//! Test utilities for the reconciliation core.

mod store;
pub use store::{TestProgressStore, TestStateView, TestStoreError};

mod tracing;
pub use tracing::{CollectingLayer, TraceStorage};
