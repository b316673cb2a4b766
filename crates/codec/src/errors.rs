//! Errors for the `zk-codec` crate.

use thiserror::Error;
use zk_primitives::ForkId;

/// A [Result] type alias where the error is [CodecError].
pub type CodecResult<T> = Result<T, CodecError>;

/// An error encountered while encoding or decoding batch L2 data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The fork predates batch L2 data support.
    #[error("Unsupported fork id: {0}")]
    UnsupportedFork(ForkId),
    /// The data ended in the middle of a block header or transaction.
    #[error("Unexpected end of batch data")]
    UnexpectedEof,
    /// A transaction appeared before the first `changeL2Block` marker.
    #[error("Transaction found before the first changeL2Block marker")]
    MissingChangeL2Block,
    /// A transaction's RLP payload was not a list.
    #[error("Transaction RLP must be a list")]
    ExpectedList,
    /// The EIP-155 suffix of a signing payload was malformed.
    #[error("Invalid EIP-155 signing payload")]
    InvalidSigningPayload,
    /// The signature's `v` byte was neither 27 nor 28.
    #[error("Invalid signature v byte: {0}")]
    InvalidV(u8),
    /// Failed to decode RLP.
    #[error("RLP error: {0}")]
    Rlp(alloy_rlp::Error),
}
