//! Contains the [L2Transaction] type and its RLP encodings.

use alloy_primitives::{keccak256, Bytes, TxKind, B256, U256};
use alloy_rlp::{length_of_length, BufMut, Decodable, Encodable, Header};

/// A signed legacy transaction as executed on the L2.
///
/// The canonical RLP encoding of an [L2Transaction] is the signed legacy encoding
/// `[nonce, gasPrice, gas, to, value, data, v, r, s]`, and its hash is the keccak-256 digest of
/// that encoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L2Transaction {
    /// The EIP-155 chain id, or `None` for pre-EIP-155 transactions.
    pub chain_id: Option<u64>,
    /// The sender's nonce.
    pub nonce: u64,
    /// The gas price, in wei.
    pub gas_price: U256,
    /// The gas limit.
    pub gas_limit: u64,
    /// The call target, or [TxKind::Create].
    pub to: TxKind,
    /// The value transferred, in wei.
    pub value: U256,
    /// The calldata.
    pub input: Bytes,
    /// Signature `r`.
    pub r: U256,
    /// Signature `s`.
    pub s: U256,
    /// Signature y-parity.
    pub odd_y_parity: bool,
}

impl L2Transaction {
    /// Returns the `v` value of the signature, folding in the chain id per EIP-155.
    ///
    /// Widened to `u128` so that every `u64` chain id has a representable `v`.
    pub fn v(&self) -> u128 {
        let parity = self.odd_y_parity as u128;
        match self.chain_id {
            Some(chain_id) => chain_id as u128 * 2 + 35 + parity,
            None => 27 + parity,
        }
    }

    /// Computes the transaction hash.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }

    /// Computes the hash the sender signed over.
    pub fn signature_hash(&self) -> B256 {
        let mut buf = alloc::vec::Vec::with_capacity(self.unsigned_payload_length() + 3);
        self.encode_unsigned(&mut buf);
        keccak256(buf)
    }

    /// RLP-encodes the signing payload: `[nonce, gasPrice, gas, to, value, data]`, extended with
    /// `[chainId, 0, 0]` for EIP-155 transactions.
    pub fn encode_unsigned(&self, out: &mut dyn BufMut) {
        Header { list: true, payload_length: self.unsigned_payload_length() }.encode(out);
        self.encode_fields(out);
        if let Some(chain_id) = self.chain_id {
            chain_id.encode(out);
            0u8.encode(out);
            0u8.encode(out);
        }
    }

    fn fields_length(&self) -> usize {
        self.nonce.length() +
            self.gas_price.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
    }

    fn unsigned_payload_length(&self) -> usize {
        let mut len = self.fields_length();
        if let Some(chain_id) = self.chain_id {
            len += chain_id.length() + 0u8.length() * 2;
        }
        len
    }

    fn signed_payload_length(&self) -> usize {
        self.fields_length() + self.v().length() + self.r.length() + self.s.length()
    }
}

impl Encodable for L2Transaction {
    fn encode(&self, out: &mut dyn BufMut) {
        Header { list: true, payload_length: self.signed_payload_length() }.encode(out);
        self.encode_fields(out);
        self.v().encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.signed_payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for L2Transaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        let remaining = buf.len();

        let nonce = Decodable::decode(buf)?;
        let gas_price = Decodable::decode(buf)?;
        let gas_limit = Decodable::decode(buf)?;
        let to = Decodable::decode(buf)?;
        let value = Decodable::decode(buf)?;
        let input = Decodable::decode(buf)?;
        let v: u128 = Decodable::decode(buf)?;
        let r = Decodable::decode(buf)?;
        let s = Decodable::decode(buf)?;

        if remaining - buf.len() != header.payload_length {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: header.payload_length,
                got: remaining - buf.len(),
            });
        }

        let (chain_id, odd_y_parity) = match v {
            27 | 28 => (None, v == 28),
            v if v >= 35 => {
                let chain_id = u64::try_from((v - 35) / 2)
                    .map_err(|_| alloy_rlp::Error::Custom("chain id out of range"))?;
                (Some(chain_id), (v - 35) % 2 == 1)
            }
            _ => return Err(alloy_rlp::Error::Custom("invalid legacy signature v")),
        };

        Ok(Self { chain_id, nonce, gas_price, gas_limit, to, value, input, r, s, odd_y_parity })
    }
}
