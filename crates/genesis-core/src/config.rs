//! Typed configuration for genesis block generation.
//!
//! A [`GenesisConfig`] is built once (by the command line front end or by a
//! test) and handed by reference to every component. Nothing in the core
//! reads the clock or any other ambient state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::difficulty::bits_to_target;
use crate::error::{Error, Result};
use crate::script::{decode_pubkey, MAX_TIMESTAMP_LEN};

/// Message embedded in the coinbase when none is given.
pub const DEFAULT_TIMESTAMP: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";

/// Public key paid by the coinbase when none is given.
pub const DEFAULT_PUBKEY: &str = "040184710fa689ad5023690c80f3a49c8f13f8d45b8c857fbcbc8bc4a8e4d3eb4b10f4d4604fa08dce601aaf0f470216fe1b51850b4acf21b179c45070ac7b03a9";

/// 50 coins of 10^8 units.
pub const DEFAULT_COIN_VALUE: i64 = 5_000_000_000;

/// Difficulty-1 bits for SHA256d chains.
pub const SHA256_DEFAULT_BITS: u32 = 0x1d00ffff;

/// Difficulty-1 bits for memory-hard chains.
pub const MEMORY_HARD_DEFAULT_BITS: u32 = 0x1e0ffff0;

/// Proof-of-work algorithm used to validate the genesis header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Double SHA256 (Bitcoin).
    #[serde(rename = "SHA256")]
    Sha256,
    /// scrypt with N=1024, r=1, p=1 (Litecoin).
    #[serde(rename = "scrypt")]
    Scrypt,
    /// Dual Argon2id + yespower proof-of-work.
    #[serde(rename = "dpowcoin")]
    Dpowcoin,
}

impl Algorithm {
    /// Every supported algorithm.
    pub const ALL: [Algorithm; 3] = [Algorithm::Sha256, Algorithm::Scrypt, Algorithm::Dpowcoin];

    /// Canonical name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "SHA256",
            Algorithm::Scrypt => "scrypt",
            Algorithm::Dpowcoin => "dpowcoin",
        }
    }

    /// Compact bits used when none are configured.
    pub fn default_bits(&self) -> u32 {
        match self {
            Algorithm::Sha256 => SHA256_DEFAULT_BITS,
            Algorithm::Scrypt | Algorithm::Dpowcoin => MEMORY_HARD_DEFAULT_BITS,
        }
    }

    /// Whether two distinct digests must both clear the target.
    pub fn is_dual(&self) -> bool {
        matches!(self, Algorithm::Dpowcoin)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Algorithm::ALL.iter().map(Algorithm::name).collect();
                Error::config(format!(
                    "unsupported algorithm '{}', expected one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// How long the nonce search may run before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchLimit {
    /// Keep sweeping the nonce range until a block is found.
    Unbounded,
    /// Stop after this many full passes over `start_nonce..=u32::MAX`.
    Rounds(u32),
    /// Stop after this many hash evaluations.
    Attempts(u64),
}

/// Immutable inputs of a genesis block search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Message embedded in the coinbase input script.
    pub timestamp: String,
    /// Hex-encoded uncompressed public key paid by the coinbase.
    pub pubkey: String,
    /// Coinbase output value in the smallest coin unit.
    pub coin_value: i64,
    /// Header time (unix seconds).
    pub time: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// First nonce tried, and the nonce a new round restarts from.
    pub start_nonce: u32,
    /// Proof-of-work algorithm.
    pub algorithm: Algorithm,
    /// Search budget.
    pub limit: SearchLimit,
}

impl GenesisConfig {
    /// Create a configuration with the default message, key, value and bits
    /// for `algorithm`, stamped with `time`, searching a single round from
    /// nonce 0.
    pub fn new(algorithm: Algorithm, time: u32) -> Self {
        GenesisConfig {
            timestamp: DEFAULT_TIMESTAMP.to_string(),
            pubkey: DEFAULT_PUBKEY.to_string(),
            coin_value: DEFAULT_COIN_VALUE,
            time,
            bits: algorithm.default_bits(),
            start_nonce: 0,
            algorithm,
            limit: SearchLimit::Rounds(1),
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_pubkey(mut self, pubkey: impl Into<String>) -> Self {
        self.pubkey = pubkey.into();
        self
    }

    pub fn with_coin_value(mut self, coin_value: i64) -> Self {
        self.coin_value = coin_value;
        self
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_start_nonce(mut self, start_nonce: u32) -> Self {
        self.start_nonce = start_nonce;
        self
    }

    pub fn with_limit(mut self, limit: SearchLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Check the inputs that would otherwise only fail when the coinbase is
    /// built.
    pub fn validate(&self) -> Result<()> {
        if self.timestamp.len() > MAX_TIMESTAMP_LEN {
            return Err(Error::config(format!(
                "timestamp is {} bytes, at most {} can be embedded",
                self.timestamp.len(),
                MAX_TIMESTAMP_LEN
            )));
        }

        decode_pubkey(&self.pubkey)?;

        if bits_to_target(self.bits) == [0u8; 32] {
            return Err(Error::config(format!(
                "bits 0x{:08x} decode to a zero target",
                self.bits
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("SHA256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("sha256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("scrypt".parse::<Algorithm>().unwrap(), Algorithm::Scrypt);
        assert_eq!("dpowcoin".parse::<Algorithm>().unwrap(), Algorithm::Dpowcoin);

        let err = "x11".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("SHA256, scrypt, dpowcoin"));
    }

    #[test]
    fn test_default_bits_per_algorithm() {
        assert_eq!(GenesisConfig::new(Algorithm::Sha256, 0).bits, 0x1d00ffff);
        assert_eq!(GenesisConfig::new(Algorithm::Scrypt, 0).bits, 0x1e0ffff0);
        assert_eq!(GenesisConfig::new(Algorithm::Dpowcoin, 0).bits, 0x1e0ffff0);
    }

    #[test]
    fn test_defaults_validate() {
        GenesisConfig::new(Algorithm::Sha256, 1_700_000_000)
            .validate()
            .unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let base = GenesisConfig::new(Algorithm::Sha256, 0);

        assert!(base.clone().with_pubkey("04").validate().is_err());
        assert!(base
            .clone()
            .with_timestamp("t".repeat(256))
            .validate()
            .is_err());
        assert!(base.with_bits(0x1d000000).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bits_shifted_to_zero() {
        let base = GenesisConfig::new(Algorithm::Sha256, 0);

        for bits in [0x00123456, 0x01000001, 0x02000080] {
            let err = base.clone().with_bits(bits).validate().unwrap_err();
            assert!(matches!(err, Error::Config { .. }), "bits 0x{:08x}", bits);
        }

        // Small exponents that keep a non-zero mantissa byte are fine
        base.clone().with_bits(0x01010000).validate().unwrap();
        base.with_bits(0x02008000).validate().unwrap();
    }

    #[test]
    fn test_config_serde_names() {
        let config = GenesisConfig::new(Algorithm::Dpowcoin, 42).with_limit(SearchLimit::Unbounded);
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("\"algorithm\":\"dpowcoin\""));
        assert!(json.contains("\"limit\":\"unbounded\""));

        let back: GenesisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
