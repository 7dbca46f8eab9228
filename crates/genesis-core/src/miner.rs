//! The nonce search.
//!
//! The header is serialized once; every attempt only rewrites its last four
//! bytes. Nonces run from the header's start nonce up to and including
//! `u32::MAX`, then wrap back to the start nonce for another round.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::block::{write_nonce, BlockHeader, HEADER_SIZE};
use crate::config::SearchLimit;
use crate::error::Result;
use crate::hash::double_sha256;
use crate::pow::{PowDigests, PowHasher};

/// Attempts between two progress reports.
pub const DEFAULT_REPORT_INTERVAL: u64 = 1_000_000;

/// Size of the nonce space swept by one round.
const NONCE_SPACE: f64 = 4_294_967_296.0;

/// Mining statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MiningStats {
    /// Hash evaluations performed.
    pub attempts: u64,
    /// Completed passes over the nonce range.
    pub rounds: u32,
    /// Time spent searching, in seconds.
    pub elapsed_secs: f64,
    /// Hash rate measured over the last report interval.
    pub hash_rate: f64,
}

impl MiningStats {
    /// Hours needed to sweep the whole nonce space at the current rate.
    pub fn sweep_estimate_hours(&self) -> f64 {
        if self.hash_rate > 0.0 {
            NONCE_SPACE / self.hash_rate / 3600.0
        } else {
            f64::INFINITY
        }
    }

    /// Format hash rate for display.
    pub fn format_hash_rate(&self) -> String {
        if self.hash_rate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", self.hash_rate / 1_000_000_000.0)
        } else if self.hash_rate >= 1_000_000.0 {
            format!("{:.2} MH/s", self.hash_rate / 1_000_000.0)
        } else if self.hash_rate >= 1_000.0 {
            format!("{:.2} KH/s", self.hash_rate / 1_000.0)
        } else {
            format!("{:.2} H/s", self.hash_rate)
        }
    }
}

/// A header whose digests cleared the target.
#[derive(Debug, Clone)]
pub struct FoundBlock {
    /// The winning header.
    pub header: BlockHeader,
    /// The winning header, serialized.
    pub header_bytes: [u8; HEADER_SIZE],
    /// Digests that cleared the target (natural byte order).
    pub digests: PowDigests,
    /// SHA256d of the winning header, whatever the algorithm.
    pub sha256d: [u8; 32],
}

/// How a search ended.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(FoundBlock),
    /// The configured limit ran out first.
    Exhausted { attempts: u64, rounds: u32 },
}

/// Drives nonce increments until the header's digests clear the target.
pub struct Miner<H> {
    hasher: H,
    target: [u8; 32],
    limit: SearchLimit,
    report_interval: u64,
    stats: MiningStats,
}

impl<H: PowHasher> Miner<H> {
    pub fn new(hasher: H, target: [u8; 32], limit: SearchLimit) -> Self {
        Miner {
            hasher,
            target,
            limit,
            report_interval: DEFAULT_REPORT_INTERVAL,
            stats: MiningStats::default(),
        }
    }

    /// Report progress every `interval` attempts instead of every million.
    pub fn with_report_interval(mut self, interval: u64) -> Self {
        self.report_interval = interval.max(1);
        self
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn stats(&self) -> &MiningStats {
        &self.stats
    }

    fn limit_reached(&self) -> bool {
        match self.limit {
            SearchLimit::Unbounded => false,
            SearchLimit::Rounds(rounds) => self.stats.rounds >= rounds,
            SearchLimit::Attempts(attempts) => self.stats.attempts >= attempts,
        }
    }

    /// Search from `header.nonce` until a header clears the target or the
    /// limit is reached.
    ///
    /// Only hasher errors end the search early.
    pub fn mine(&mut self, header: &BlockHeader) -> Result<SearchOutcome> {
        let start_nonce = header.nonce;
        let mut nonce = start_nonce;
        let mut header_bytes = header.serialize();

        self.stats = MiningStats::default();
        let started = Instant::now();
        let mut last_report = started;

        info!(start_nonce, limit = ?self.limit, "Searching for genesis hash");

        loop {
            if self.limit_reached() {
                self.finish(started);
                info!(
                    attempts = self.stats.attempts,
                    rounds = self.stats.rounds,
                    "Search limit reached without a solution"
                );
                return Ok(SearchOutcome::Exhausted {
                    attempts: self.stats.attempts,
                    rounds: self.stats.rounds,
                });
            }

            let digests = self.hasher.pow_digests(&header_bytes)?;
            self.stats.attempts += 1;

            if digests.meets_target(&self.target) {
                self.finish(started);
                info!(nonce, attempts = self.stats.attempts, "Genesis hash found");

                return Ok(SearchOutcome::Found(FoundBlock {
                    header: BlockHeader { nonce, ..*header },
                    header_bytes,
                    digests,
                    sha256d: double_sha256(&header_bytes),
                }));
            }

            if self.stats.attempts % self.report_interval == 0 {
                let now = Instant::now();
                self.report_progress(now.duration_since(last_report), nonce);
                last_report = now;
            }

            if nonce == u32::MAX {
                self.stats.rounds += 1;
                warn!(
                    rounds = self.stats.rounds,
                    start_nonce, "All nonces exhausted, starting next round"
                );
                nonce = start_nonce;
            } else {
                nonce += 1;
            }
            write_nonce(&mut header_bytes, nonce);
        }
    }

    fn finish(&mut self, started: Instant) {
        self.stats.elapsed_secs = started.elapsed().as_secs_f64();
        // Searches shorter than one report interval have no measured rate yet
        if self.stats.hash_rate == 0.0 && self.stats.elapsed_secs > 0.0 {
            self.stats.hash_rate = self.stats.attempts as f64 / self.stats.elapsed_secs;
        }
    }

    fn report_progress(&mut self, since_last: Duration, nonce: u32) {
        let secs = since_last.as_secs_f64();
        if secs > 0.0 {
            self.stats.hash_rate = self.report_interval as f64 / secs;
        }

        info!(
            nonce,
            hash_rate = %self.stats.format_hash_rate(),
            estimate_hours = format_args!("{:.1}", self.stats.sweep_estimate_hours()),
            "Mining progress"
        );
        debug!(attempts = self.stats.attempts, "Progress report");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::NONCE_OFFSET;
    use crate::difficulty::bits_to_target;
    use crate::error::Error;
    use std::cell::RefCell;

    /// Returns digests from a script, recording each nonce it was asked about.
    struct ScriptedHasher {
        script: Vec<PowDigests>,
        seen: RefCell<Vec<u32>>,
    }

    impl ScriptedHasher {
        fn new(script: Vec<PowDigests>) -> Self {
            ScriptedHasher {
                script,
                seen: RefCell::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<u32> {
            self.seen.borrow().clone()
        }
    }

    impl PowHasher for ScriptedHasher {
        fn pow_digests(&self, header: &[u8; HEADER_SIZE]) -> Result<PowDigests> {
            let mut word = [0u8; 4];
            word.copy_from_slice(&header[NONCE_OFFSET..]);
            let mut seen = self.seen.borrow_mut();
            seen.push(u32::from_le_bytes(word));

            let index = (seen.len() - 1).min(self.script.len() - 1);
            Ok(self.script[index])
        }
    }

    struct FailingHasher;

    impl PowHasher for FailingHasher {
        fn pow_digests(&self, _header: &[u8; HEADER_SIZE]) -> Result<PowDigests> {
            Err(Error::hash("out of memory"))
        }
    }

    const LOW: [u8; 32] = [0u8; 32];
    const HIGH: [u8; 32] = [0xFFu8; 32];

    fn digests(primary: [u8; 32], secondary: [u8; 32]) -> PowDigests {
        PowDigests { primary, secondary }
    }

    fn header(nonce: u32) -> BlockHeader {
        BlockHeader::genesis([0x33; 32], 1_600_000_000, 0x1d00ffff, nonce)
    }

    #[test]
    fn test_found_only_when_both_digests_clear() {
        let hasher = ScriptedHasher::new(vec![
            digests(LOW, HIGH),
            digests(HIGH, LOW),
            digests(HIGH, HIGH),
            digests(LOW, LOW),
        ]);
        let mut miner = Miner::new(hasher, bits_to_target(0x1d00ffff), SearchLimit::Unbounded);

        let outcome = miner.mine(&header(100)).unwrap();

        let SearchOutcome::Found(found) = outcome else {
            panic!("expected a block");
        };
        assert_eq!(found.header.nonce, 103);
        assert_eq!(&found.header_bytes[NONCE_OFFSET..], &103u32.to_le_bytes());
        assert_eq!(found.digests, digests(LOW, LOW));
        assert_eq!(found.sha256d, double_sha256(&found.header_bytes));
        assert_eq!(miner.hasher().seen(), vec![100, 101, 102, 103]);
        assert_eq!(miner.stats().attempts, 4);
    }

    #[test]
    fn test_elapsed_is_wall_time_with_frequent_reports() {
        let hasher = ScriptedHasher::new(vec![digests(HIGH, HIGH)]);
        let mut miner = Miner::new(hasher, bits_to_target(0x1d00ffff), SearchLimit::Attempts(50))
            .with_report_interval(1);

        let started = Instant::now();
        miner.mine(&header(0)).unwrap();
        let wall = started.elapsed().as_secs_f64();

        assert_eq!(miner.stats().attempts, 50);
        assert!(miner.stats().elapsed_secs <= wall);
    }

    #[test]
    fn test_wraparound_restarts_at_start_nonce() {
        let hasher = ScriptedHasher::new(vec![digests(HIGH, HIGH)]);
        let mut miner = Miner::new(hasher, bits_to_target(0x1d00ffff), SearchLimit::Rounds(2));

        let outcome = miner.mine(&header(0xFFFF_FFFE)).unwrap();

        assert!(matches!(
            outcome,
            SearchOutcome::Exhausted {
                attempts: 4,
                rounds: 2
            }
        ));
        assert_eq!(
            miner.hasher().seen(),
            vec![0xFFFF_FFFE, 0xFFFF_FFFF, 0xFFFF_FFFE, 0xFFFF_FFFF]
        );
    }

    #[test]
    fn test_wraparound_then_found() {
        let hasher = ScriptedHasher::new(vec![
            digests(HIGH, HIGH),
            digests(HIGH, LOW),
            digests(LOW, LOW),
        ]);
        let mut miner = Miner::new(hasher, bits_to_target(0x1d00ffff), SearchLimit::Unbounded);

        let outcome = miner.mine(&header(0xFFFF_FFFE)).unwrap();

        let SearchOutcome::Found(found) = outcome else {
            panic!("expected a block");
        };
        assert_eq!(found.header.nonce, 0xFFFF_FFFE);
        assert_eq!(miner.stats().rounds, 1);
    }

    #[test]
    fn test_attempt_limit() {
        let hasher = ScriptedHasher::new(vec![digests(HIGH, HIGH)]);
        let mut miner = Miner::new(hasher, bits_to_target(0x1d00ffff), SearchLimit::Attempts(5));

        let outcome = miner.mine(&header(0)).unwrap();

        assert!(matches!(
            outcome,
            SearchOutcome::Exhausted {
                attempts: 5,
                rounds: 0
            }
        ));
        assert_eq!(miner.hasher().seen(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_budget_evaluates_nothing() {
        let hasher = ScriptedHasher::new(vec![digests(LOW, LOW)]);
        let mut miner = Miner::new(hasher, bits_to_target(0x1d00ffff), SearchLimit::Rounds(0));

        let outcome = miner.mine(&header(0)).unwrap();

        assert!(matches!(outcome, SearchOutcome::Exhausted { attempts: 0, .. }));
        assert!(miner.hasher().seen().is_empty());
    }

    #[test]
    fn test_hasher_error_stops_search() {
        let mut miner = Miner::new(FailingHasher, bits_to_target(0x1d00ffff), SearchLimit::Unbounded);
        assert!(matches!(miner.mine(&header(0)), Err(Error::Hash { .. })));
    }

    #[test]
    fn test_progress_reports_do_not_change_control_flow() {
        let hasher = ScriptedHasher::new(vec![digests(HIGH, HIGH)]);
        let mut miner = Miner::new(hasher, bits_to_target(0x1d00ffff), SearchLimit::Attempts(10))
            .with_report_interval(3);

        let outcome = miner.mine(&header(0)).unwrap();

        assert!(matches!(outcome, SearchOutcome::Exhausted { attempts: 10, .. }));
        assert_eq!(miner.hasher().seen().len(), 10);
    }

    #[test]
    fn test_stats_formatting() {
        let stats = MiningStats {
            hash_rate: 2_500_000.0,
            ..MiningStats::default()
        };
        assert_eq!(stats.format_hash_rate(), "2.50 MH/s");
        assert!((stats.sweep_estimate_hours() - NONCE_SPACE / 2_500_000.0 / 3600.0).abs() < 1e-9);

        assert!(MiningStats::default().sweep_estimate_hours().is_infinite());
    }
}
