//! The reconciliation core of the zkEVM sync pipeline.
//!
//! Keeps locally executed L2 state consistent with two independently advancing cursors: the
//! highest batch verified on L1 and the highest batch fully downloaded from the data stream.
//!
//! Every operation is a synchronous computation over a caller-supplied view of the store,
//! accessed through the narrow capability traits in [traits]. A single call must observe one
//! consistent snapshot; writers must be serialized by the caller.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(any(test, feature = "test-utils")), warn(unused_crate_dependencies))]
#![cfg_attr(not(any(test, feature = "test-utils")), no_std)]

extern crate alloc;

/// Re-export commonly used types and traits.
pub mod prelude {
    pub use crate::{
        batch_data::{generate_batch_data, BatchDataError},
        exit_root::{batch_local_exit_root, local_exit_root_by_block},
        forks::{recover_fork_boundaries, update_fork_boundaries, ForkUpdateError},
        short_circuit::{should_short_circuit_execution, short_circuit_target, ShortCircuit},
        traits::*,
    };
}

pub mod batch_data;
pub mod exit_root;
pub mod forks;
pub mod short_circuit;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
