//! End-to-end genesis block generation: coinbase, header, search, result.

use serde::Serialize;
use tracing::info;

use crate::block::GenesisTemplate;
use crate::config::{Algorithm, GenesisConfig};
use crate::difficulty::{bits_to_difficulty, format_difficulty};
use crate::error::Result;
use crate::hash::hash_to_display_hex;
use crate::miner::{FoundBlock, Miner, MiningStats, SearchOutcome, DEFAULT_REPORT_INTERVAL};
use crate::pow::{HashAlgorithm, YespowerHash};

/// A mined genesis block, ready to be pasted into a node's chain parameters.
///
/// Hashes are in display (reversed) hex; `header` and `transaction` are the
/// raw serialized bytes in hex.
#[derive(Debug, Clone, Serialize)]
pub struct GenesisBlock {
    pub algorithm: Algorithm,
    pub timestamp: String,
    pub pubkey: String,
    pub coin_value: i64,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
    pub merkle_root: String,
    /// SHA256d for SHA256 and scrypt chains, the Argon2id digest for dpowcoin.
    pub block_hash: String,
    pub pow_hash: String,
    pub pow_hash_secondary: String,
    pub sha256d_hash: String,
    pub header: String,
    pub transaction: String,
    pub stats: MiningStats,
}

/// How a genesis search ended.
#[derive(Debug, Clone)]
pub enum GenesisOutcome {
    Found(GenesisBlock),
    Exhausted { attempts: u64, rounds: u32 },
}

/// Builds the genesis template for a configuration and mines it.
pub struct GenesisGenerator {
    config: GenesisConfig,
    template: GenesisTemplate,
    hasher: HashAlgorithm,
    report_interval: u64,
}

impl GenesisGenerator {
    /// Validate `config` and prepare the coinbase, header and hasher.
    ///
    /// Every configuration or dependency problem surfaces here, before any
    /// nonce is tried.
    pub fn new(config: GenesisConfig, yespower: Option<Box<dyn YespowerHash>>) -> Result<Self> {
        config.validate()?;

        let hasher = HashAlgorithm::for_algorithm(config.algorithm, yespower)?;
        let template = GenesisTemplate::new(&config)?;

        Ok(GenesisGenerator {
            config,
            template,
            hasher,
            report_interval: DEFAULT_REPORT_INTERVAL,
        })
    }

    pub fn with_report_interval(mut self, interval: u64) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn config(&self) -> &GenesisConfig {
        &self.config
    }

    pub fn template(&self) -> &GenesisTemplate {
        &self.template
    }

    /// Log the fixed block parameters.
    pub fn log_block_info(&self) {
        let difficulty = bits_to_difficulty(self.config.bits);

        info!(algorithm = %self.config.algorithm, "Genesis block parameters");
        info!(merkle_root = %self.template.coinbase.merkle_root_hex());
        info!(timestamp = %self.config.timestamp);
        info!(pubkey = %self.config.pubkey);
        info!(time = self.config.time);
        info!(
            bits = %format!("0x{:08x}", self.config.bits),
            difficulty = %format_difficulty(difficulty)
        );
    }

    /// Run the nonce search.
    pub fn run(&self) -> Result<GenesisOutcome> {
        let mut miner = Miner::new(&self.hasher, self.template.target, self.config.limit)
            .with_report_interval(self.report_interval);

        let outcome = match miner.mine(&self.template.header)? {
            SearchOutcome::Found(found) => {
                GenesisOutcome::Found(self.assemble(found, miner.stats().clone()))
            }
            SearchOutcome::Exhausted { attempts, rounds } => {
                GenesisOutcome::Exhausted { attempts, rounds }
            }
        };

        Ok(outcome)
    }

    fn assemble(&self, found: FoundBlock, stats: MiningStats) -> GenesisBlock {
        let block_hash = if self.config.algorithm.is_dual() {
            found.digests.primary
        } else {
            found.sha256d
        };

        GenesisBlock {
            algorithm: self.config.algorithm,
            timestamp: self.config.timestamp.clone(),
            pubkey: self.config.pubkey.clone(),
            coin_value: self.config.coin_value,
            time: found.header.time,
            bits: found.header.bits,
            nonce: found.header.nonce,
            merkle_root: hash_to_display_hex(&found.header.merkle_root),
            block_hash: hash_to_display_hex(&block_hash),
            pow_hash: hash_to_display_hex(&found.digests.primary),
            pow_hash_secondary: hash_to_display_hex(&found.digests.secondary),
            sha256d_hash: hash_to_display_hex(&found.sha256d),
            header: hex::encode(found.header_bytes),
            transaction: hex::encode(&self.template.coinbase.raw_tx),
            stats,
        }
    }
}

/// Validate `config`, mine it, and return the outcome.
pub fn generate(
    config: GenesisConfig,
    yespower: Option<Box<dyn YespowerHash>>,
) -> Result<GenesisOutcome> {
    let generator = GenesisGenerator::new(config, yespower)?;
    generator.log_block_info();
    generator.run()
}
