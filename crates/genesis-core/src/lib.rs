//! Genesis block construction and proof-of-work search.
//!
//! This crate provides pure Rust implementations of:
//! - Coinbase script and transaction serialization
//! - Genesis block header construction and serialization
//! - Compact difficulty target decoding and comparison
//! - SHA256d, scrypt and dual Argon2id/yespower proof-of-work
//! - A bounded or unbounded nonce search

pub mod block;
pub mod coinbase;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod genesis;
pub mod hash;
pub mod miner;
pub mod pow;
pub mod script;

pub use block::{BlockHeader, GenesisTemplate, HEADER_SIZE};
pub use coinbase::{CoinbaseBuilder, CoinbaseTransaction};
pub use config::{Algorithm, GenesisConfig, SearchLimit};
pub use difficulty::{bits_to_target, hash_meets_target};
pub use error::{Error, Result};
pub use genesis::{generate, GenesisBlock, GenesisGenerator, GenesisOutcome};
pub use hash::double_sha256;
pub use miner::{Miner, MiningStats, SearchOutcome};
pub use pow::{ExternalYespower, HashAlgorithm, PowDigests, PowHasher, YespowerHash};
pub use script::{build_input_script, build_output_script};
