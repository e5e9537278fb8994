//! Engine selection, dispatch and the scan session.

mod ac;
mod bm;
mod sh;
mod wm;

pub use self::ac::AhoCorasick;
pub use self::bm::BoyerMoore;
pub use self::sh::SetHorspool;
pub use self::wm::WuManber;

use core::fmt;
use core::str::FromStr;
use std::time::Instant;

use crate::analytics::Analytics;
use crate::set::PatternSet;
use crate::{Error, Result};

/// Engine selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Algorithm {
    /// Aho-Corasick automaton (`a`).
    AhoCorasick,
    /// Wu-Manber with deterministic prefix hashing (`d`).
    WuManberDet,
    /// Wu-Manber with a Bloom prefix filter (`p`).
    WuManberProb,
    /// Set-Horspool (`h`).
    SetHorspool,
    /// Iterated Boyer-Moore (`b`).
    BoyerMoore,
}

impl Algorithm {
    /// Map a selector letter to an algorithm.
    pub fn from_selector(c: char) -> Result<Algorithm> {
        match c.to_ascii_lowercase() {
            'a' => Ok(Algorithm::AhoCorasick),
            'd' => Ok(Algorithm::WuManberDet),
            'p' => Ok(Algorithm::WuManberProb),
            'h' => Ok(Algorithm::SetHorspool),
            'b' => Ok(Algorithm::BoyerMoore),
            _ => Err(Error::InvalidAlgorithm(c)),
        }
    }

    /// Printable engine name, as used in the analytics header.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::AhoCorasick => "Aho-Corasick",
            Algorithm::WuManberDet => "Wu-Manber (deterministic)",
            Algorithm::WuManberProb => "Wu-Manber (probabilistic)",
            Algorithm::SetHorspool => "Set-Horspool",
            Algorithm::BoyerMoore => "Boyer-Moore",
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Algorithm::from_selector(c),
            _ => Err(Error::InvalidAlgorithm(s.chars().next().unwrap_or('?'))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single pattern occurrence in a scanned buffer.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Match {
    /// Index of the pattern in the pattern set.
    pub pattern: u32,
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
}

/// Build-time configuration for a scan session.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Which engine to build.
    pub algorithm: Algorithm,
    /// Target false-positive rate for the Wu-Manber Bloom prefix gate.
    pub bloom_fp_rate: f64,
    /// Pin the Wu-Manber block size instead of deriving it from the
    /// pattern statistics.
    pub block_size: Option<usize>,
    /// Treat every pattern as caseless regardless of per-pattern flags.
    pub nocase_default: bool,
}

impl ScanConfig {
    /// Defaults for the given engine: a 1% Bloom false-positive rate,
    /// derived block size, per-pattern case handling.
    pub fn new(algorithm: Algorithm) -> ScanConfig {
        ScanConfig {
            algorithm,
            bloom_fp_rate: 0.01,
            block_size: None,
            nocase_default: false,
        }
    }
}

/// A compiled engine. One variant per algorithm, each owning its
/// preprocessed tables; the tables are dropped with the value.
pub enum Engine {
    /// Aho-Corasick automaton.
    Ac(AhoCorasick),
    /// Wu-Manber, deterministic prefix hash only.
    WmDet(WuManber),
    /// Wu-Manber with the Bloom prefix gate.
    WmProb(WuManber),
    /// Set-Horspool.
    Sh(SetHorspool),
    /// Boyer-Moore, iterated per pattern.
    Bm(BoyerMoore),
}

impl Engine {
    /// Preprocess the pattern set for the configured algorithm. The set
    /// has already been validated at construction, so building cannot
    /// fail.
    pub fn build(set: &PatternSet, config: &ScanConfig) -> Engine {
        match config.algorithm {
            Algorithm::AhoCorasick => Engine::Ac(AhoCorasick::new(set)),
            Algorithm::WuManberDet => {
                Engine::WmDet(WuManber::new(set, config.block_size, None))
            }
            Algorithm::WuManberProb => Engine::WmProb(WuManber::new(
                set,
                config.block_size,
                Some(config.bloom_fp_rate),
            )),
            Algorithm::SetHorspool => Engine::Sh(SetHorspool::new(set)),
            Algorithm::BoyerMoore => Engine::Bm(BoyerMoore::new(set)),
        }
    }

    /// Run the engine over `data`, streaming matches into `on_match`
    /// and counters into `stats`.
    pub fn scan<F: FnMut(Match)>(
        &self,
        set: &PatternSet,
        data: &[u8],
        stats: &mut Analytics,
        on_match: F,
    ) {
        stats.bytes_scanned += data.len() as u64;

        match self {
            Engine::Ac(ac) => ac.scan(data, stats, on_match),
            Engine::WmDet(wm) | Engine::WmProb(wm) => wm.scan(set, data, stats, on_match),
            Engine::Sh(sh) => sh.scan(set, data, stats, on_match),
            Engine::Bm(bm) => bm.scan(set, data, stats, on_match),
        }
    }

    /// Collect every match into a vector.
    pub fn find_all(&self, set: &PatternSet, data: &[u8], stats: &mut Analytics) -> Vec<Match> {
        let mut matches = Vec::new();
        self.scan(set, data, stats, |m| matches.push(m));
        matches
    }
}

/// The outcome of one buffer scan.
#[derive(Debug)]
pub struct ScanReport {
    /// Every occurrence found, left-to-right by start offset. Ties at
    /// one offset follow pattern id for AC and BM and candidate-bucket
    /// order for WM and SH.
    pub matches: Vec<Match>,
    /// The counters filled during the scan.
    pub stats: Analytics,
}

/// Owns a pattern set and the engine compiled over it, and runs timed
/// scans. The clock covers the scan only, never preprocessing.
pub struct Scanner {
    patterns: PatternSet,
    engine: Engine,
    algorithm: Algorithm,
}

impl Scanner {
    /// Build the configured engine over the pattern set.
    pub fn new(patterns: PatternSet, config: ScanConfig) -> Scanner {
        let patterns = if config.nocase_default {
            patterns.into_caseless()
        } else {
            patterns
        };
        let engine = Engine::build(&patterns, &config);

        Scanner {
            patterns,
            engine,
            algorithm: config.algorithm,
        }
    }

    /// The pattern set the engine was built over.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// The algorithm in use.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Scan one buffer to completion and report matches and analytics.
    pub fn scan(&self, data: &[u8]) -> ScanReport {
        let mut stats = Analytics::new(self.algorithm.name());
        let mut matches = Vec::new();

        let started = Instant::now();
        self.engine
            .scan(&self.patterns, data, &mut stats, |m| matches.push(m));
        stats.elapsed = started.elapsed();

        ScanReport { matches, stats }
    }
}
