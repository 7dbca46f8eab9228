//! Command line arguments.

use clap::{Parser, ValueEnum};
use genesis_core::config::{DEFAULT_COIN_VALUE, DEFAULT_PUBKEY, DEFAULT_TIMESTAMP};
use genesis_core::miner::DEFAULT_REPORT_INTERVAL;
use genesis_core::{Algorithm, ExternalYespower, GenesisConfig, SearchLimit, YespowerHash};

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Generate a genesis block: build the coinbase and header, then search for
/// a nonce whose proof-of-work hash is below the target.
#[derive(Debug, Clone, Parser)]
#[command(name = "genesis", version, about = "Genesis block generator")]
pub struct Args {
    /// The (unix) time when the genesis block is created [default: now]
    #[arg(short = 't', long, env = "GENESIS_TIME")]
    pub time: Option<u32>,

    /// The message embedded in the coinbase of the genesis block
    #[arg(short = 'z', long, default_value = DEFAULT_TIMESTAMP)]
    pub timestamp: String,

    /// The first nonce tried; each new round restarts here
    #[arg(short = 'n', long, default_value_t = 0)]
    pub nonce: u32,

    /// The PoW algorithm: SHA256, scrypt or dpowcoin
    #[arg(short = 'a', long, default_value = "SHA256", value_parser = parse_algorithm)]
    pub algorithm: Algorithm,

    /// The uncompressed public key paid by the coinbase output (hex)
    #[arg(short = 'p', long, default_value = DEFAULT_PUBKEY)]
    pub pubkey: String,

    /// The output value in the smallest coin unit (e.g. 5000000000 for 50 coins)
    #[arg(short = 'v', long, default_value_t = DEFAULT_COIN_VALUE, allow_negative_numbers = true)]
    pub value: i64,

    /// The target in compact representation, decimal or 0x-prefixed hex
    /// [default: 0x1d00ffff for SHA256, 0x1e0ffff0 otherwise]
    #[arg(short = 'b', long, value_parser = parse_bits)]
    pub bits: Option<u32>,

    /// Passes over the nonce range before giving up [default: 1]
    #[arg(long, conflicts_with_all = ["unbounded", "max_attempts"])]
    pub max_rounds: Option<u32>,

    /// Hash evaluations before giving up
    #[arg(long, conflicts_with = "unbounded")]
    pub max_attempts: Option<u64>,

    /// Keep searching until a block is found
    #[arg(long)]
    pub unbounded: bool,

    /// Command computing the dpowcoin yespower hash of a hex header
    #[arg(long, env = "GENESIS_YESPOWER_CMD")]
    pub yespower_cmd: Option<String>,

    /// Attempts between progress reports
    #[arg(long, default_value_t = DEFAULT_REPORT_INTERVAL)]
    pub report_interval: u64,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    fn limit(&self) -> SearchLimit {
        if self.unbounded {
            SearchLimit::Unbounded
        } else if let Some(attempts) = self.max_attempts {
            SearchLimit::Attempts(attempts)
        } else {
            SearchLimit::Rounds(self.max_rounds.unwrap_or(1))
        }
    }

    /// Build the core configuration, stamping it with `now` unless a time
    /// was given.
    pub fn to_config(&self, now: u32) -> GenesisConfig {
        let config = GenesisConfig::new(self.algorithm, self.time.unwrap_or(now))
            .with_timestamp(self.timestamp.clone())
            .with_pubkey(self.pubkey.clone())
            .with_coin_value(self.value)
            .with_start_nonce(self.nonce)
            .with_limit(self.limit());

        match self.bits {
            Some(bits) => config.with_bits(bits),
            None => config,
        }
    }

    /// The yespower backend, if one was configured.
    pub fn yespower(&self) -> genesis_core::Result<Option<Box<dyn YespowerHash>>> {
        self.yespower_cmd
            .as_deref()
            .map(|cmd| {
                ExternalYespower::from_command_line(cmd)
                    .map(|backend| Box::new(backend) as Box<dyn YespowerHash>)
            })
            .transpose()
    }
}

fn parse_algorithm(s: &str) -> genesis_core::Result<Algorithm> {
    s.parse()
}

fn parse_bits(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid bits '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("genesis").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let config = args.to_config(1_700_000_000);

        assert_eq!(config.algorithm, Algorithm::Sha256);
        assert_eq!(config.bits, 0x1d00ffff);
        assert_eq!(config.time, 1_700_000_000);
        assert_eq!(config.timestamp, DEFAULT_TIMESTAMP);
        assert_eq!(config.pubkey, DEFAULT_PUBKEY);
        assert_eq!(config.coin_value, 5_000_000_000);
        assert_eq!(config.start_nonce, 0);
        assert_eq!(config.limit, SearchLimit::Rounds(1));
        assert!(args.yespower().unwrap().is_none());
    }

    #[test]
    fn test_algorithm_specific_default_bits() {
        assert_eq!(parse(&["-a", "scrypt"]).to_config(0).bits, 0x1e0ffff0);
        assert_eq!(parse(&["-a", "dpowcoin"]).to_config(0).bits, 0x1e0ffff0);
        assert_eq!(parse(&["-a", "scrypt", "-b", "0x1d00ffff"]).to_config(0).bits, 0x1d00ffff);
    }

    #[test]
    fn test_bits_accepts_decimal_and_hex() {
        assert_eq!(parse_bits("486604799").unwrap(), 0x1d00ffff);
        assert_eq!(parse_bits("0x1d00ffff").unwrap(), 0x1d00ffff);
        assert!(parse_bits("0xzz").is_err());
    }

    #[test]
    fn test_unsupported_algorithm_is_rejected() {
        let err = Args::try_parse_from(["genesis", "-a", "x11"]).unwrap_err();
        assert!(err.to_string().contains("unsupported algorithm"));
    }

    #[test]
    fn test_explicit_values() {
        let config = parse(&[
            "-t", "1231006505", "-n", "2083236893", "-z", "hello", "-v", "100", "--unbounded",
        ])
        .to_config(0);

        assert_eq!(config.time, 1231006505);
        assert_eq!(config.start_nonce, 2083236893);
        assert_eq!(config.timestamp, "hello");
        assert_eq!(config.coin_value, 100);
        assert_eq!(config.limit, SearchLimit::Unbounded);
    }

    #[test]
    fn test_search_limits() {
        assert_eq!(parse(&["--max-rounds", "3"]).to_config(0).limit, SearchLimit::Rounds(3));
        assert_eq!(
            parse(&["--max-attempts", "10"]).to_config(0).limit,
            SearchLimit::Attempts(10)
        );
        assert!(Args::try_parse_from(["genesis", "--max-rounds", "3", "--unbounded"]).is_err());
    }

    #[test]
    fn test_yespower_command() {
        let args = parse(&["-a", "dpowcoin", "--yespower-cmd", "yespower-cli --dpowcoin"]);
        assert!(args.yespower().unwrap().is_some());

        let args = parse(&["--yespower-cmd", "  "]);
        assert!(args.yespower().is_err());
    }
}
