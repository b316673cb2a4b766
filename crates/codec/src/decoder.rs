//! Decoding of concatenated batch L2 data back into blocks and transactions.

use crate::{
    CodecError, CodecResult, CHANGE_L2_BLOCK_TX_TYPE, DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE,
};
use alloc::vec::Vec;
use alloy_primitives::U256;
use alloy_rlp::{Buf, Decodable, Header};
use zk_primitives::{ForkId, L2Transaction};

/// A block recovered from batch L2 data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedL2Block {
    /// Seconds elapsed since the previous block. Always zero before fork 7.
    pub delta_timestamp: u32,
    /// The L1 info tree index. Always zero before fork 7.
    pub l1_info_tree_index: u32,
    /// The block's transactions.
    pub transactions: Vec<DecodedL2Transaction>,
}

/// A transaction recovered from batch L2 data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedL2Transaction {
    /// The signed transaction.
    pub transaction: L2Transaction,
    /// The effective gas price percentage. Full price before fork 5.
    pub effective_gas_price_percentage: u8,
}

/// Decodes a batch's L2 data into its blocks.
///
/// Before fork 7 batches carry no block delimiters, so the whole payload decodes into a single
/// block.
pub fn decode_batch_l2_data(mut data: &[u8], fork: ForkId) -> CodecResult<Vec<DecodedL2Block>> {
    if fork < ForkId::FORK_4 {
        return Err(CodecError::UnsupportedFork(fork));
    }

    let mut blocks: Vec<DecodedL2Block> = Vec::new();
    if !fork.has_change_l2_block() {
        blocks.push(DecodedL2Block::default());
    }

    while let Some(&first) = data.first() {
        if fork.has_change_l2_block() && first == CHANGE_L2_BLOCK_TX_TYPE {
            data.advance(1);
            let delta_timestamp = u32::from_be_bytes(take::<4>(&mut data)?);
            let l1_info_tree_index = u32::from_be_bytes(take::<4>(&mut data)?);
            blocks.push(DecodedL2Block {
                delta_timestamp,
                l1_info_tree_index,
                ..Default::default()
            });
            continue;
        }

        let tx = decode_transaction(&mut data, fork)?;
        blocks.last_mut().ok_or(CodecError::MissingChangeL2Block)?.transactions.push(tx);
    }

    Ok(blocks)
}

/// Decodes a single transaction in its L2 data form, advancing `buf` past it.
fn decode_transaction(buf: &mut &[u8], fork: ForkId) -> CodecResult<DecodedL2Transaction> {
    let header = Header::decode(buf).map_err(CodecError::Rlp)?;
    if !header.list {
        return Err(CodecError::ExpectedList);
    }
    if buf.len() < header.payload_length {
        return Err(CodecError::UnexpectedEof);
    }
    let (mut payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;

    let nonce = u64::decode(&mut payload).map_err(CodecError::Rlp)?;
    let gas_price = U256::decode(&mut payload).map_err(CodecError::Rlp)?;
    let gas_limit = u64::decode(&mut payload).map_err(CodecError::Rlp)?;
    let to = Decodable::decode(&mut payload).map_err(CodecError::Rlp)?;
    let value = U256::decode(&mut payload).map_err(CodecError::Rlp)?;
    let input = Decodable::decode(&mut payload).map_err(CodecError::Rlp)?;

    let chain_id = if payload.is_empty() {
        None
    } else {
        let chain_id = u64::decode(&mut payload).map_err(CodecError::Rlp)?;
        let zero_r = u64::decode(&mut payload).map_err(CodecError::Rlp)?;
        let zero_s = u64::decode(&mut payload).map_err(CodecError::Rlp)?;
        if zero_r != 0 || zero_s != 0 || !payload.is_empty() {
            return Err(CodecError::InvalidSigningPayload);
        }
        Some(chain_id)
    };

    let r = U256::from_be_bytes(take::<32>(buf)?);
    let s = U256::from_be_bytes(take::<32>(buf)?);
    let odd_y_parity = match take::<1>(buf)?[0] {
        27 => false,
        28 => true,
        v => return Err(CodecError::InvalidV(v)),
    };
    let effective_gas_price_percentage = if fork.has_effective_gas_price() {
        take::<1>(buf)?[0]
    } else {
        DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE
    };

    Ok(DecodedL2Transaction {
        transaction: L2Transaction {
            chain_id,
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            input,
            r,
            s,
            odd_y_parity,
        },
        effective_gas_price_percentage,
    })
}

/// Takes `N` bytes off the front of `buf`.
fn take<const N: usize>(buf: &mut &[u8]) -> CodecResult<[u8; N]> {
    if buf.len() < N {
        return Err(CodecError::UnexpectedEof);
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[..N]);
    buf.advance(N);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{BlockL2DataEncoder, ZkEvmL2DataEncoder};
    use alloy_primitives::{map::HashMap, Bytes, TxKind};
    use proptest::prelude::*;

    fn tx(nonce: u64, chain_id: Option<u64>) -> L2Transaction {
        L2Transaction {
            chain_id,
            nonce,
            gas_price: U256::from(7u64),
            gas_limit: 100_000,
            to: TxKind::Create,
            value: U256::ZERO,
            input: Bytes::from(alloc::vec![0x60, 0x00]),
            r: U256::from(1u64),
            s: U256::from(2u64),
            odd_y_parity: nonce % 2 == 0,
        }
    }

    fn encode_blocks(fork: ForkId, blocks: &[(u32, u32, Vec<L2Transaction>)]) -> Vec<u8> {
        let egp = HashMap::default();
        blocks
            .iter()
            .flat_map(|(dts, idx, txs)| {
                ZkEvmL2DataEncoder.encode_block(fork, *dts, *idx, txs, &egp).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_decode_etrog_batch() {
        let data = encode_blocks(
            ForkId::FORK_7_ETROG,
            &[
                (3, 1, alloc::vec![tx(0, Some(1101)), tx(1, None)]),
                (0, 1, alloc::vec![]),
                (2, 2, alloc::vec![tx(2, Some(1101))]),
            ],
        );

        let blocks = decode_batch_l2_data(&data, ForkId::FORK_7_ETROG).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].delta_timestamp, 3);
        assert_eq!(blocks[0].transactions.len(), 2);
        assert_eq!(blocks[0].transactions[0].transaction, tx(0, Some(1101)));
        assert_eq!(blocks[0].transactions[1].transaction, tx(1, None));
        assert!(blocks[1].transactions.is_empty());
        assert_eq!(blocks[2].l1_info_tree_index, 2);
        assert_eq!(
            blocks[2].transactions[0].effective_gas_price_percentage,
            DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE
        );
    }

    #[test]
    fn test_decode_pre_etrog_batch_is_single_block() {
        let data = encode_blocks(
            ForkId::FORK_6_INCABERRY,
            &[(3, 1, alloc::vec![tx(0, Some(1))]), (4, 2, alloc::vec![tx(1, Some(1))])],
        );

        let blocks = decode_batch_l2_data(&data, ForkId::FORK_6_INCABERRY).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].delta_timestamp, 0);
        assert_eq!(blocks[0].transactions.len(), 2);
    }

    #[test]
    fn test_decode_truncated_signature() {
        let mut data = encode_blocks(ForkId::FORK_7_ETROG, &[(0, 0, alloc::vec![tx(0, Some(1))])]);
        data.truncate(data.len() - 10);
        assert_eq!(
            decode_batch_l2_data(&data, ForkId::FORK_7_ETROG).unwrap_err(),
            CodecError::UnexpectedEof
        );
    }

    #[test]
    fn test_decode_transaction_without_block_marker() {
        let mut data = Vec::new();
        ZkEvmL2DataEncoder::encode_transaction(
            &tx(0, Some(1)),
            ForkId::FORK_7_ETROG,
            255,
            &mut data,
        );
        assert_eq!(
            decode_batch_l2_data(&data, ForkId::FORK_7_ETROG).unwrap_err(),
            CodecError::MissingChangeL2Block
        );
    }

    #[test]
    fn test_decode_invalid_v() {
        let mut data = Vec::new();
        ZkEvmL2DataEncoder::encode_transaction(&tx(1, None), ForkId::FORK_4, 255, &mut data);
        let last = data.len() - 1;
        data[last] = 29;
        assert_eq!(
            decode_batch_l2_data(&data, ForkId::FORK_4).unwrap_err(),
            CodecError::InvalidV(29)
        );
    }

    proptest! {
        #[test]
        fn test_transaction_count_preserved(
            shape in proptest::collection::vec(0usize..4, 1..8),
            chain_id in proptest::option::of(1u64..5_000),
        ) {
            let blocks = shape
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    let txs = (0..*n as u64).map(|nonce| tx(nonce, chain_id)).collect::<Vec<_>>();
                    (i as u32, i as u32, txs)
                })
                .collect::<Vec<_>>();
            let data = encode_blocks(ForkId::FORK_12_BANANA, &blocks);

            let decoded = decode_batch_l2_data(&data, ForkId::FORK_12_BANANA).unwrap();
            prop_assert_eq!(decoded.len(), shape.len());
            for (block, expected) in decoded.iter().zip(shape.iter()) {
                prop_assert_eq!(block.transactions.len(), *expected);
            }
        }
    }
}
