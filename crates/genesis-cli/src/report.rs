//! Printing of the mined genesis block.

use std::io::{self, Write};

use genesis_core::GenesisBlock;

/// Write `block` as labelled lines, or as pretty JSON when `json` is set.
pub fn write_block<W: Write>(out: &mut W, block: &GenesisBlock, json: bool) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, block)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "genesis hash found!")?;
    writeln!(out, "algorithm: {}", block.algorithm)?;
    writeln!(out, "nonce: {}", block.nonce)?;
    writeln!(out, "time: {}", block.time)?;
    writeln!(out, "bits: 0x{:08x}", block.bits)?;
    writeln!(out, "merkle hash: {}", block.merkle_root)?;
    writeln!(out, "genesis hash: {}", block.block_hash)?;
    writeln!(out, "pow hash: {}", block.pow_hash)?;
    if block.algorithm.is_dual() {
        writeln!(out, "pow hash (secondary): {}", block.pow_hash_secondary)?;
    }
    writeln!(out, "genesis hash (SHA256): {}", block.sha256d_hash)?;
    writeln!(out, "header: {}", block.header)?;
    writeln!(out, "transaction: {}", block.transaction)?;
    writeln!(
        out,
        "attempts: {} in {:.1}s ({})",
        block.stats.attempts,
        block.stats.elapsed_secs,
        block.stats.format_hash_rate()
    )?;

    Ok(())
}

pub fn print_block(block: &GenesisBlock, json: bool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_block(&mut out, block, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_core::{generate, Algorithm, GenesisConfig, GenesisOutcome, SearchLimit};

    fn bitcoin_genesis() -> GenesisBlock {
        let config = GenesisConfig::new(Algorithm::Sha256, 1231006505)
            .with_pubkey("04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f")
            .with_start_nonce(2083236893)
            .with_limit(SearchLimit::Attempts(1));

        match generate(config, None).unwrap() {
            GenesisOutcome::Found(block) => block,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_text_report() {
        let mut out = Vec::new();
        write_block(&mut out, &bitcoin_genesis(), false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("nonce: 2083236893"));
        assert!(text.contains("bits: 0x1d00ffff"));
        assert!(text.contains(
            "genesis hash: 000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        ));
        assert!(!text.contains("secondary"));
    }

    #[test]
    fn test_json_report() {
        let mut out = Vec::new();
        write_block(&mut out, &bitcoin_genesis(), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(
            value["merkle_root"],
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
        );
        assert_eq!(value["algorithm"], "SHA256");
    }
}
