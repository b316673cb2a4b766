//! Well-known addresses and storage slots.

use alloy_primitives::{address, Address, B256};

/// The zkEVM global exit root manager system contract.
pub const GER_MANAGER_ADDRESS: Address = address!("a40D5f56745a118D0906a34E69aeC8C0Db1cB8fA");

/// The storage slot of [GER_MANAGER_ADDRESS] holding the rollup's local exit root.
pub const LOCAL_EXIT_ROOT_SLOT: B256 = B256::with_last_byte(1);
