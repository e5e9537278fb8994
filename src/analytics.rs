use core::fmt;
use std::time::Duration;

/// Per-scan performance counters.
///
/// One value is created for every scan and threaded into the engine by
/// mutable reference; there is no process-wide state. Each engine fills
/// only the counters that describe its work, and the formatter prints
/// only the non-zero ones.
#[derive(Clone, Debug, Default)]
pub struct Analytics {
    /// Name of the engine that filled the counters.
    pub algorithm: &'static str,

    /// Bytes of input examined.
    pub bytes_scanned: u64,
    /// Byte-against-byte comparisons during verification.
    pub comparisons: u64,
    /// Automaton state transitions taken.
    pub transitions: u64,
    /// Failure-link steps taken.
    pub fail_steps: u64,
    /// Total distance moved by shift heuristics.
    pub shifts: u64,
    /// Matches emitted through automaton output sets.
    pub matches: u64,

    /// Alignment windows examined.
    pub windows: u64,
    /// Total shift distance proposed by the block shift table.
    pub sum_shift: u64,
    /// Windows whose tail block hit the hash table.
    pub hash_hits: u64,
    /// Bloom prefix-gate lookups.
    pub bloom_checks: u64,
    /// Bloom lookups that passed.
    pub bloom_pass: u64,
    /// Hash-chain nodes visited during verification.
    pub chain_steps: u64,
    /// Exact pattern verifications that succeeded.
    pub exact_matches: u64,
    /// Verified matches downstream of the Bloom gate.
    pub verif_after_bloom: u64,

    /// Wall-clock scan time, monotonic, covering the scan only.
    pub elapsed: Duration,
}

impl Analytics {
    /// Fresh counters for one scan of the named engine.
    pub fn new(algorithm: &'static str) -> Analytics {
        Analytics {
            algorithm,
            ..Default::default()
        }
    }

    /// Megabytes scanned per second. Elapsed time is floored at 1 ms so
    /// trivially small inputs do not report inflated figures.
    pub fn throughput_mb_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64().max(1e-3);
        (self.bytes_scanned as f64 / (1024.0 * 1024.0)) / secs
    }
}

impl fmt::Display for Analytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[performance analytics: {}]", self.algorithm)?;

        let counters = [
            ("bytes scanned", self.bytes_scanned),
            ("comparisons", self.comparisons),
            ("state transitions", self.transitions),
            ("fail traversals", self.fail_steps),
            ("shifts", self.shifts),
            ("matches (total)", self.matches),
            ("windows processed", self.windows),
            ("total shift distance", self.sum_shift),
            ("hash table hits", self.hash_hits),
            ("bloom checks", self.bloom_checks),
            ("bloom positive checks", self.bloom_pass),
            ("chain traversal steps", self.chain_steps),
            ("exact string matches", self.exact_matches),
            ("verified post-bloom", self.verif_after_bloom),
        ];

        for (label, value) in &counters {
            if *value > 0 {
                writeln!(f, "  {:<22}: {}", label, value)?;
            }
        }

        if self.windows > 0 {
            writeln!(
                f,
                "  {:<22}: {:.2}",
                "avg shift length",
                self.sum_shift as f64 / self.windows as f64
            )?;
            if self.hash_hits > 0 {
                writeln!(
                    f,
                    "  {:<22}: {:.2}",
                    "avg chain steps / hit",
                    self.chain_steps as f64 / self.hash_hits as f64
                )?;
            }
            if self.bloom_checks > 0 {
                writeln!(
                    f,
                    "  {:<22}: {:.2}%",
                    "bloom pass rate",
                    100.0 * self.bloom_pass as f64 / self.bloom_checks as f64
                )?;
            }
        }

        writeln!(
            f,
            "  {:<22}: {:.6} sec",
            "elapsed time",
            self.elapsed.as_secs_f64()
        )?;
        write!(f, "  {:<22}: {:.2} MB/s", "throughput", self.throughput_mb_s())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_floor() {
        let mut stats = Analytics::new("test");
        stats.bytes_scanned = 1024 * 1024;
        stats.elapsed = Duration::from_secs(0);

        // 1 MiB against the 1 ms floor
        assert!((stats.throughput_mb_s() - 1024.0).abs() < 1e-9);

        stats.elapsed = Duration::from_secs(2);
        assert!((stats.throughput_mb_s() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_display_hides_zero_counters() {
        let mut stats = Analytics::new("test");
        stats.windows = 10;
        stats.sum_shift = 25;

        let text = stats.to_string();

        assert!(text.contains("windows processed"));
        assert!(text.contains("avg shift length"));
        assert!(!text.contains("bloom checks"));
        assert!(!text.contains("fail traversals"));
        assert!(text.contains("throughput"));
    }
}
