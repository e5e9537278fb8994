//! Multiscan is an offline multi-pattern content scanner for network
//! intrusion detection.
//!
//! Literal byte patterns taken from the `content:"…"` clauses of
//! Snort-style rules are preprocessed into one of several search
//! structures, which are then run over captured payload buffers. Every
//! engine reports the same occurrences; they differ only in throughput
//! and table size, which the per-scan [`Analytics`] make observable.
//!
//! # Engines
//!
//! - **Aho-Corasick** (`a`): a keyword automaton with failure links,
//!   scanning every byte once.
//! - **Wu-Manber** (`d`/`p`): block-indexed shift and hash tables over a
//!   common window, deterministic or gated by a Bloom prefix filter.
//! - **Set-Horspool** (`h`): a rightmost-byte shift table with per-byte
//!   candidate buckets.
//! - **Boyer-Moore** (`b`): bad-character and good-suffix tables, run
//!   once per pattern.
//!
//! # Examples
//!
//! ```
//! #[macro_use]
//! extern crate multiscan;
//!
//! use multiscan::*;
//!
//! fn main() {
//!     let patterns = vec![pattern! {"EVIL"}, pattern! {"MALWARE"}];
//!     let set = PatternSet::new(patterns).unwrap();
//!
//!     let scanner = Scanner::new(set, ScanConfig::new(Algorithm::AhoCorasick));
//!     let report = scanner.scan(b"SOMEEVILPAYLOAD");
//!
//!     assert_eq!(report.matches.len(), 1);
//!     assert_eq!(report.matches[0].start, 4);
//! }
//! ```
#![deny(missing_docs, rust_2018_compatibility, rust_2018_idioms)]

#[macro_use]
extern crate log;

mod analytics;
mod bloom;
mod engine;
mod error;
mod pattern;
pub mod rules;
mod set;

pub use crate::analytics::Analytics;
pub use crate::bloom::BloomFilter;
pub use crate::engine::{
    Algorithm, AhoCorasick, BoyerMoore, Engine, Match, ScanConfig, ScanReport, Scanner,
    SetHorspool, WuManber,
};
pub use crate::error::{Error, Result};
pub use crate::pattern::{Flags, Pattern, Patterns, MAX_PATTERN_LEN};
pub use crate::set::PatternSet;
