//! Coinbase transaction construction for the genesis block.
//!
//! The genesis coinbase is the block's only transaction: one input spending
//! the null outpoint, one output paying the whole reward to a public key.
//! Its txid is therefore also the block's merkle root.

use crate::error::Result;
use crate::hash::{double_sha256, hash_to_display_hex};
use crate::script::{build_input_script, build_output_script};

/// Transaction version used by the genesis coinbase.
pub const TX_VERSION: u32 = 1;

/// Builder for the genesis coinbase transaction.
#[derive(Debug, Clone)]
pub struct CoinbaseBuilder {
    /// Message embedded in the input script.
    timestamp: String,
    /// Hex-encoded uncompressed public key receiving the reward.
    pubkey_hex: String,
    /// Output value in the smallest coin unit.
    value: i64,
}

impl CoinbaseBuilder {
    /// Create a new coinbase builder paying `value` to `pubkey_hex`.
    pub fn new(timestamp: impl Into<String>, pubkey_hex: impl Into<String>, value: i64) -> Self {
        CoinbaseBuilder {
            timestamp: timestamp.into(),
            pubkey_hex: pubkey_hex.into(),
            value,
        }
    }

    /// Build the coinbase transaction.
    ///
    /// Fails if the timestamp is too long or the public key is malformed.
    pub fn build(&self) -> Result<CoinbaseTransaction> {
        let input_script = build_input_script(&self.timestamp)?;
        let output_script = build_output_script(&self.pubkey_hex)?;

        Ok(CoinbaseTransaction::new(input_script, output_script, self.value))
    }
}

/// A constructed coinbase transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseTransaction {
    /// Input scriptSig (prefix + timestamp push).
    pub input_script: Vec<u8>,
    /// Output scriptPubKey (pubkey + OP_CHECKSIG).
    pub output_script: Vec<u8>,
    /// Output value.
    pub value: i64,
    /// Serialized transaction.
    pub raw_tx: Vec<u8>,
    /// Transaction ID (double SHA256 of raw_tx, natural byte order).
    pub txid: [u8; 32],
}

impl CoinbaseTransaction {
    /// Assemble and hash the transaction from its two scripts.
    pub fn new(input_script: Vec<u8>, output_script: Vec<u8>, value: i64) -> Self {
        let raw_tx = serialize_transaction(&input_script, &output_script, value);
        let txid = double_sha256(&raw_tx);

        CoinbaseTransaction {
            input_script,
            output_script,
            value,
            raw_tx,
            txid,
        }
    }

    /// Merkle root of a block whose only transaction is this one.
    pub fn merkle_root(&self) -> [u8; 32] {
        self.txid
    }

    /// Merkle root in display (reversed hex) format.
    pub fn merkle_root_hex(&self) -> String {
        hash_to_display_hex(&self.txid)
    }
}

/// Serialize a single-input, single-output coinbase transaction.
pub fn serialize_transaction(input_script: &[u8], output_script: &[u8], value: i64) -> Vec<u8> {
    let mut raw_tx = Vec::with_capacity(60 + input_script.len() + output_script.len());

    // Version (4 bytes, little-endian)
    raw_tx.extend_from_slice(&TX_VERSION.to_le_bytes());

    // Input count
    raw_tx.push(0x01);

    // Input: null previous output
    raw_tx.extend_from_slice(&[0u8; 32]);
    raw_tx.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());

    encode_varint(input_script.len() as u64, &mut raw_tx);
    raw_tx.extend_from_slice(input_script);

    // Sequence
    raw_tx.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());

    // Output count
    raw_tx.push(0x01);

    raw_tx.extend_from_slice(&value.to_le_bytes());
    encode_varint(output_script.len() as u64, &mut raw_tx);
    raw_tx.extend_from_slice(output_script);

    // Locktime
    raw_tx.extend_from_slice(&0u32.to_le_bytes());

    raw_tx
}

/// Encode a variable-length integer (Bitcoin varint).
fn encode_varint(value: u64, output: &mut Vec<u8>) {
    if value < 0xfd {
        output.push(value as u8);
    } else if value <= 0xffff {
        output.push(0xfd);
        output.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffffffff {
        output.push(0xfe);
        output.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        output.push(0xff);
        output.extend_from_slice(&value.to_le_bytes());
    }
}
