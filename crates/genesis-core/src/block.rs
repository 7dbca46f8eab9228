//! Genesis block header construction and serialization.

use crate::coinbase::{CoinbaseBuilder, CoinbaseTransaction};
use crate::config::GenesisConfig;
use crate::difficulty::bits_to_target;
use crate::error::Result;
use crate::hash::double_sha256;

/// Serialized header size.
pub const HEADER_SIZE: usize = 80;

/// Offset of the little-endian nonce inside the serialized header.
pub const NONCE_OFFSET: usize = 76;

/// Header version of the genesis block.
pub const GENESIS_VERSION: u32 = 1;

/// Overwrite the nonce of an already serialized header.
///
/// The other 76 bytes are left untouched.
#[inline]
pub fn write_nonce(header: &mut [u8; HEADER_SIZE], nonce: u32) {
    header[NONCE_OFFSET..].copy_from_slice(&nonce.to_le_bytes());
}

/// A block header (80 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block version.
    pub version: u32,
    /// Hash of the previous block (internal byte order).
    pub prev_block_hash: [u8; 32],
    /// Merkle root of all transactions.
    pub merkle_root: [u8; 32],
    /// Block timestamp (Unix time).
    pub time: u32,
    /// Difficulty target in compact "bits" format.
    pub bits: u32,
    /// Nonce for proof of work.
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a genesis header: version 1, no previous block.
    pub fn genesis(merkle_root: [u8; 32], time: u32, bits: u32, nonce: u32) -> Self {
        BlockHeader {
            version: GENESIS_VERSION,
            prev_block_hash: [0u8; 32],
            merkle_root,
            time,
            bits,
            nonce,
        }
    }

    /// Serialize the block header to 80 bytes.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];

        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..36].copy_from_slice(&self.prev_block_hash);
        header[36..68].copy_from_slice(&self.merkle_root);
        header[68..72].copy_from_slice(&self.time.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        write_nonce(&mut header, self.nonce);

        header
    }

    /// Parse a serialized header.
    pub fn deserialize(bytes: &[u8; HEADER_SIZE]) -> Self {
        let u32_at = |offset: usize| {
            let mut word = [0u8; 4];
            word.copy_from_slice(&bytes[offset..offset + 4]);
            u32::from_le_bytes(word)
        };

        let mut prev_block_hash = [0u8; 32];
        prev_block_hash.copy_from_slice(&bytes[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&bytes[36..68]);

        BlockHeader {
            version: u32_at(0),
            prev_block_hash,
            merkle_root,
            time: u32_at(68),
            bits: u32_at(72),
            nonce: u32_at(NONCE_OFFSET),
        }
    }

    /// Compute the block hash (double SHA256).
    pub fn hash(&self) -> [u8; 32] {
        double_sha256(&self.serialize())
    }

    /// Get the target as a 256-bit number.
    pub fn target(&self) -> [u8; 32] {
        bits_to_target(self.bits)
    }
}

/// Everything fixed before the nonce search starts.
#[derive(Debug, Clone)]
pub struct GenesisTemplate {
    /// The header, carrying the configured start nonce.
    pub header: BlockHeader,
    /// The coinbase transaction.
    pub coinbase: CoinbaseTransaction,
    /// The block target (256-bit, big-endian).
    pub target: [u8; 32],
}

impl GenesisTemplate {
    /// Build the coinbase and header described by `config`.
    pub fn new(config: &GenesisConfig) -> Result<Self> {
        let coinbase =
            CoinbaseBuilder::new(&config.timestamp, &config.pubkey, config.coin_value).build()?;

        let header = BlockHeader::genesis(
            coinbase.merkle_root(),
            config.time,
            config.bits,
            config.start_nonce,
        );

        Ok(GenesisTemplate {
            header,
            coinbase,
            target: bits_to_target(config.bits),
        })
    }

    /// Header with `nonce` in place of the start nonce.
    pub fn header_with_nonce(&self, nonce: u32) -> BlockHeader {
        BlockHeader {
            nonce,
            ..self.header
        }
    }
}
