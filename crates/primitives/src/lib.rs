//! Primitive types shared by the zkEVM sync crates: fork identifiers, stage cursors, L2 blocks
//! and transactions, and the chain configuration.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod fork;
pub use fork::ForkId;

mod stage;
pub use stage::SyncStage;

mod transaction;
pub use transaction::L2Transaction;

mod block;
pub use block::L2Block;

mod config;
pub use config::ChainConfig;

mod constants;
pub use constants::{GER_MANAGER_ADDRESS, LOCAL_EXIT_ROOT_SLOT};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::{
        ChainConfig, ForkId, L2Block, L2Transaction, SyncStage, GER_MANAGER_ADDRESS,
        LOCAL_EXIT_ROOT_SLOT,
    };
}
