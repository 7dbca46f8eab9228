//! Coinbase input and output scripts.
//!
//! The input script embeds the genesis timestamp message after the canonical
//! `<0x1d00ffff> <4>` pushes; the output script pays to a raw uncompressed
//! public key.

use crate::error::{Error, Result};

/// Push of `0x1d00ffff` followed by a push of the number 4.
pub const COINBASE_SCRIPT_PREFIX: [u8; 7] = [0x04, 0xff, 0xff, 0x00, 0x1d, 0x01, 0x04];

/// Largest push whose length fits in the opcode itself.
pub const MAX_DIRECT_PUSH: usize = 0x4b;

/// Longest timestamp that fits a one-byte push length.
pub const MAX_TIMESTAMP_LEN: usize = 0xff;

/// Length of an uncompressed secp256k1 public key.
pub const PUBKEY_LEN: usize = 65;

pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_CHECKSIG: u8 = 0xac;

/// Build the coinbase scriptSig carrying `timestamp`.
///
/// Timestamps of up to 75 bytes use a direct push; longer ones are prefixed
/// with `OP_PUSHDATA1`. Anything over 255 bytes is rejected.
pub fn build_input_script(timestamp: &str) -> Result<Vec<u8>> {
    let message = timestamp.as_bytes();

    if message.len() > MAX_TIMESTAMP_LEN {
        return Err(Error::config(format!(
            "timestamp is {} bytes, at most {} can be embedded",
            message.len(),
            MAX_TIMESTAMP_LEN
        )));
    }

    let mut script = Vec::with_capacity(COINBASE_SCRIPT_PREFIX.len() + 2 + message.len());
    script.extend_from_slice(&COINBASE_SCRIPT_PREFIX);

    if message.len() > MAX_DIRECT_PUSH {
        script.push(OP_PUSHDATA1);
    }
    script.push(message.len() as u8);
    script.extend_from_slice(message);

    Ok(script)
}

/// Build the pay-to-pubkey scriptPubKey: `<pubkey> OP_CHECKSIG`.
pub fn build_output_script(pubkey_hex: &str) -> Result<Vec<u8>> {
    let pubkey = decode_pubkey(pubkey_hex)?;

    let mut script = Vec::with_capacity(PUBKEY_LEN + 2);
    script.push(PUBKEY_LEN as u8);
    script.extend_from_slice(&pubkey);
    script.push(OP_CHECKSIG);

    Ok(script)
}

/// Decode a hex public key, requiring an uncompressed 65-byte point.
pub fn decode_pubkey(pubkey_hex: &str) -> Result<[u8; PUBKEY_LEN]> {
    let bytes = hex::decode(pubkey_hex.trim())
        .map_err(|e| Error::config(format!("pubkey is not valid hex: {}", e)))?;

    let pubkey: [u8; PUBKEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
        Error::config(format!(
            "pubkey must be {} bytes, got {}",
            PUBKEY_LEN,
            bytes.len()
        ))
    })?;

    if pubkey[0] != 0x04 {
        return Err(Error::config(format!(
            "pubkey must be an uncompressed point (0x04 prefix), got prefix 0x{:02x}",
            pubkey[0]
        )));
    }

    Ok(pubkey)
}
