//! Contains the [ZkEvmL2DataEncoder], the canonical block encoder.

use crate::{
    BlockL2DataEncoder, CodecError, CodecResult, CHANGE_L2_BLOCK_TX_TYPE,
    DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE,
};
use alloc::vec::Vec;
use alloy_primitives::{map::HashMap, B256};
use zk_primitives::{ForkId, L2Transaction};

/// Encodes blocks into the batch L2 data layout verified on L1.
///
/// Block layout:
/// ```text
/// [0x0b | delta_timestamp (u32 BE) | l1_info_tree_index (u32 BE)]   (fork >= 7)
/// tx_0 | tx_1 | ... | tx_n
/// ```
///
/// Transaction layout:
/// ```text
/// rlp(signing payload) | r (32 bytes) | s (32 bytes) | v (1 byte) | [egp (1 byte), fork >= 5]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ZkEvmL2DataEncoder;

impl ZkEvmL2DataEncoder {
    /// Appends the L2 data form of `tx` to `out`.
    pub fn encode_transaction(
        tx: &L2Transaction,
        fork: ForkId,
        effective_gas_price_percentage: u8,
        out: &mut Vec<u8>,
    ) {
        tx.encode_unsigned(out);
        out.extend_from_slice(&tx.r.to_be_bytes::<32>());
        out.extend_from_slice(&tx.s.to_be_bytes::<32>());
        out.push(27 + tx.odd_y_parity as u8);
        if fork.has_effective_gas_price() {
            out.push(effective_gas_price_percentage);
        }
    }
}

impl BlockL2DataEncoder for ZkEvmL2DataEncoder {
    type Error = CodecError;

    fn encode_block(
        &self,
        fork: ForkId,
        delta_timestamp: u32,
        l1_info_tree_index: u32,
        transactions: &[L2Transaction],
        effective_gas_prices: &HashMap<B256, u8>,
    ) -> CodecResult<Vec<u8>> {
        if fork < ForkId::FORK_4 {
            return Err(CodecError::UnsupportedFork(fork));
        }

        let mut out = Vec::new();
        if fork.has_change_l2_block() {
            out.push(CHANGE_L2_BLOCK_TX_TYPE);
            out.extend_from_slice(&delta_timestamp.to_be_bytes());
            out.extend_from_slice(&l1_info_tree_index.to_be_bytes());
        }

        for tx in transactions {
            let egp = effective_gas_prices
                .get(&tx.hash())
                .copied()
                .unwrap_or(DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE);
            Self::encode_transaction(tx, fork, egp, &mut out);
        }

        Ok(out)
    }
}
