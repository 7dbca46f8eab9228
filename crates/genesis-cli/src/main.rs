//! Genesis block generator.
//!
//! Builds the coinbase and header from the command line, searches for a
//! winning nonce and prints the block parameters to paste into a node.

mod cli;
mod report;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};
use clap::Parser;
use genesis_core::{GenesisGenerator, GenesisOutcome};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Args;

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn unix_now() -> anyhow::Result<u32> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?
        .as_secs();

    u32::try_from(secs).context("current time does not fit the 32-bit header time field")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = args.to_config(unix_now()?);
    let yespower = args.yespower()?;

    let generator = GenesisGenerator::new(config, yespower)
        .context("cannot start the genesis search")?
        .with_report_interval(args.report_interval);

    generator.log_block_info();

    match generator.run()? {
        GenesisOutcome::Found(block) => report::print_block(&block, args.json),
        GenesisOutcome::Exhausted { attempts, rounds } => bail!(
            "no genesis hash found after {} attempts ({} rounds); raise --max-rounds, \
             use --unbounded, or change --time",
            attempts,
            rounds
        ),
    }
}
