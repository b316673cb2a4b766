//! Encoding and decoding of zkEVM batch L2 data.
//!
//! A batch's L2 data is the concatenation of its blocks' encodings. Each block is introduced by
//! a `changeL2Block` marker (from fork 7) and followed by its transactions in their L2 data form.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod traits;
pub use traits::BlockL2DataEncoder;

mod encoder;
pub use encoder::ZkEvmL2DataEncoder;

mod decoder;
pub use decoder::{decode_batch_l2_data, DecodedL2Block, DecodedL2Transaction};

mod errors;
pub use errors::{CodecError, CodecResult};

/// The type byte of the `changeL2Block` marker that opens every block from fork 7.
pub const CHANGE_L2_BLOCK_TX_TYPE: u8 = 0x0b;

/// The effective gas price percentage encoded when none was recorded for a transaction.
pub const DEFAULT_EFFECTIVE_GAS_PRICE_PERCENTAGE: u8 = 255;
