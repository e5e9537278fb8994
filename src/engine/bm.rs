use crate::analytics::Analytics;
use crate::engine::Match;
use crate::set::PatternSet;

/// Bad-character sentinel for bytes absent from the pattern.
const ABSENT: i32 = -1;

/// Shift tables for one pattern.
struct PatternTables {
    bad_char: [i32; 256],
    /// Strong good-suffix shifts, indexed by the position one past the
    /// mismatch; `good_suffix[0]` is the shift after a full match.
    good_suffix: Vec<usize>,
}

impl PatternTables {
    fn new(bytes: &[u8]) -> PatternTables {
        let len = bytes.len();

        let mut bad_char = [ABSENT; 256];
        for (i, &b) in bytes.iter().enumerate() {
            bad_char[b as usize] = i as i32;
        }

        // Two-phase strong good-suffix construction. border[i] is the
        // start of the widest border of the suffix beginning at i; the
        // array is consumed here and not kept.
        let mut border = vec![0; len + 1];
        let mut good_suffix = vec![0; len + 1];

        let mut i = len;
        let mut j = len + 1;
        border[i] = j;
        while i > 0 {
            while j <= len && bytes[i - 1] != bytes[j - 1] {
                if good_suffix[j] == 0 {
                    good_suffix[j] = j - i;
                }
                j = border[j];
            }
            i -= 1;
            j -= 1;
            border[i] = j;
        }

        let mut j = border[0];
        for i in 0..=len {
            if good_suffix[i] == 0 {
                good_suffix[i] = j;
            }
            if i == j {
                j = border[j];
            }
        }

        PatternTables {
            bad_char,
            good_suffix,
        }
    }
}

/// Iterated Boyer-Moore: every pattern is searched independently with
/// its own bad-character and strong good-suffix tables, and the shift
/// taken at each mismatch is the larger of the two heuristics. After a
/// full match the pattern shifts by its period so later occurrences,
/// overlapping ones included, are still reported.
pub struct BoyerMoore {
    tables: Vec<PatternTables>,
}

impl BoyerMoore {
    /// Build the per-pattern tables.
    pub fn new(set: &PatternSet) -> BoyerMoore {
        let tables = set.iter().map(|p| PatternTables::new(&p.bytes)).collect();

        debug!("boyer-moore tables built for {} patterns", set.len());

        BoyerMoore { tables }
    }

    /// Run every pattern over the buffer, summing counters across the
    /// per-pattern passes. Discovery is grouped by pattern, so matches
    /// are buffered and sorted before delivery: left-to-right by start
    /// offset, ties by pattern id ascending.
    pub fn scan<F: FnMut(Match)>(
        &self,
        set: &PatternSet,
        text: &[u8],
        stats: &mut Analytics,
        mut on_match: F,
    ) {
        let mut matches = Vec::new();

        for (pid, pattern) in set.iter().enumerate() {
            self.scan_one(pid as u32, &pattern.bytes, text, stats, &mut |m| {
                matches.push(m)
            });
        }

        matches.sort_unstable_by_key(|m| (m.start, m.pattern));
        for m in matches {
            on_match(m);
        }
    }

    fn scan_one<F: FnMut(Match)>(
        &self,
        pid: u32,
        bytes: &[u8],
        text: &[u8],
        stats: &mut Analytics,
        on_match: &mut F,
    ) {
        let len = bytes.len();
        let n = text.len();
        if len > n {
            return;
        }

        let tables = &self.tables[pid as usize];
        let mut s = 0;

        while s + len <= n {
            let mismatch = {
                let mut j = len - 1;
                loop {
                    stats.comparisons += 1;
                    if text[s + j] != bytes[j] {
                        break Some(j);
                    }
                    if j == 0 {
                        break None;
                    }
                    j -= 1;
                }
            };

            let step = match mismatch {
                None => {
                    stats.exact_matches += 1;
                    on_match(Match {
                        pattern: pid,
                        start: s,
                        end: s + len,
                    });
                    tables.good_suffix[0].max(1)
                }
                Some(j) => {
                    let bad = j as i32 - tables.bad_char[text[s + j] as usize];
                    let good = tables.good_suffix[j + 1];
                    (bad.max(1) as usize).max(good)
                }
            };

            stats.shifts += step as u64;
            s += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern;

    fn set(patterns: &[&str]) -> PatternSet {
        PatternSet::new(patterns.iter().map(|p| pattern! {*p}).collect()).unwrap()
    }

    fn matches(bm: &BoyerMoore, set: &PatternSet, text: &[u8]) -> Vec<(u32, usize)> {
        let mut stats = Analytics::new("test");
        let mut found = Vec::new();
        bm.scan(set, text, &mut stats, |m| found.push((m.pattern, m.start)));
        found.sort_unstable();
        found
    }

    #[test]
    fn test_bad_char_table() {
        let tables = PatternTables::new(b"ABCAB");

        assert_eq!(tables.bad_char[b'A' as usize], 3);
        assert_eq!(tables.bad_char[b'B' as usize], 4);
        assert_eq!(tables.bad_char[b'C' as usize], 2);
        assert_eq!(tables.bad_char[b'Z' as usize], ABSENT);
    }

    #[test]
    fn test_good_suffix_shifts_positive() {
        for pattern in [&b"aaaa"[..], &b"abcab"[..], &b"GCAGAGAG"[..], &b"x"[..]] {
            let tables = PatternTables::new(pattern);
            assert_eq!(tables.good_suffix.len(), pattern.len() + 1);
            for (i, &shift) in tables.good_suffix.iter().enumerate() {
                assert!(shift >= 1, "good_suffix[{}] = 0 for {:?}", i, pattern);
            }
        }
    }

    #[test]
    fn test_scenario_matches() {
        let ps = set(&["MALWARE", "EVIL", "BAD"]);
        let bm = BoyerMoore::new(&ps);

        assert_eq!(
            matches(&bm, &ps, b"THISBADFILEHASAVIRUSEVILMALWAREINSIDE"),
            vec![(0, 24), (1, 20), (2, 4)]
        );
    }

    #[test]
    fn test_emission_order_is_by_start_offset() {
        // MALWARE (pattern 0) sits last in the text; its per-pattern
        // pass runs first, but delivery must still be left-to-right
        let ps = set(&["MALWARE", "EVIL", "BAD"]);
        let bm = BoyerMoore::new(&ps);

        let mut stats = Analytics::new("test");
        let mut found = Vec::new();
        bm.scan(&ps, b"THISBADFILEHASAVIRUSEVILMALWAREINSIDE", &mut stats, |m| {
            found.push((m.pattern, m.start))
        });

        assert_eq!(found, vec![(2, 4), (1, 20), (0, 24)]);
    }

    #[test]
    fn test_reports_every_occurrence() {
        let ps = set(&["ab"]);
        let bm = BoyerMoore::new(&ps);

        assert_eq!(
            matches(&bm, &ps, b"ab ab ab"),
            vec![(0, 0), (0, 3), (0, 6)]
        );
    }

    #[test]
    fn test_overlapping_matches() {
        let ps = set(&["aaaa"]);
        let bm = BoyerMoore::new(&ps);

        assert_eq!(
            matches(&bm, &ps, b"aaaaaaa"),
            vec![(0, 0), (0, 1), (0, 2), (0, 3)]
        );
    }

    #[test]
    fn test_pattern_longer_than_text() {
        let ps = set(&["longpattern"]);
        let bm = BoyerMoore::new(&ps);

        assert_eq!(matches(&bm, &ps, b"short"), vec![]);
    }
}
