use crate::analytics::Analytics;
use crate::engine::Match;
use crate::pattern::Pattern;
use crate::set::PatternSet;

fn flip_case(c: u8) -> u8 {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c.to_ascii_uppercase()
    }
}

fn lower(table: &mut [usize; 256], c: u8, proposed: usize) {
    if proposed < table[c as usize] {
        table[c as usize] = proposed;
    }
}

/// Set-Horspool engine: one shift table over the rightmost window byte,
/// plus a candidate bucket per byte value.
///
/// Bytes that end some pattern's window hold a shift of 1, so the fast
/// path can never skip an alignment that needs verification; the bucket
/// for the window's last byte then limits verification to the patterns
/// that can actually end there. Patterns flagged `nocase` contribute
/// both letter cases to the tables and are verified case-insensitively.
pub struct SetHorspool {
    window: usize,
    shift: [usize; 256],
    buckets: Vec<Vec<u32>>,
}

impl SetHorspool {
    /// Build the shift table and candidate buckets over the common
    /// window (the shortest pattern length).
    pub fn new(set: &PatternSet) -> SetHorspool {
        let m = set.min_length();
        let mut shift = [m; 256];
        let mut buckets = vec![Vec::new(); 256];

        for (pid, pattern) in set.iter().enumerate() {
            let bytes = &pattern.bytes;
            let nocase = pattern.nocase();

            for i in 0..m - 1 {
                let c = bytes[i];
                lower(&mut shift, c, m - 1 - i);
                if nocase && c.is_ascii_alphabetic() {
                    lower(&mut shift, flip_case(c), m - 1 - i);
                }
            }

            let last = bytes[m - 1];
            buckets[last as usize].push(pid as u32);
            lower(&mut shift, last, 1);
            if nocase && last.is_ascii_alphabetic() {
                buckets[flip_case(last) as usize].push(pid as u32);
                lower(&mut shift, flip_case(last), 1);
            }
        }

        debug!("set-horspool tables built: window={}", m);

        SetHorspool {
            window: m,
            shift,
            buckets,
        }
    }

    /// Scanning window size: the shortest pattern length.
    pub fn window(&self) -> usize {
        self.window
    }

    fn verify(pattern: &Pattern, text: &[u8], pos: usize, comparisons: &mut u64) -> bool {
        let bytes = &pattern.bytes;
        let nocase = pattern.nocase();

        for j in (0..bytes.len()).rev() {
            *comparisons += 1;
            let matched = if nocase {
                text[pos + j].eq_ignore_ascii_case(&bytes[j])
            } else {
                text[pos + j] == bytes[j]
            };
            if !matched {
                return false;
            }
        }
        true
    }

    /// Slide the window over the buffer. Alignments whose last byte
    /// carries a shift above 1 are skipped outright; the rest verify
    /// their bucket, then advance by a single position so overlapping
    /// occurrences are kept.
    pub fn scan<F: FnMut(Match)>(
        &self,
        set: &PatternSet,
        text: &[u8],
        stats: &mut Analytics,
        mut on_match: F,
    ) {
        let n = text.len();
        let m = self.window;
        let mut pos = 0;

        while pos + m <= n {
            stats.windows += 1;

            let c = text[pos + m - 1];
            let shift = self.shift[c as usize];

            if shift > 1 {
                stats.shifts += shift as u64;
                pos += shift;
                continue;
            }

            let mut found = false;
            for &pid in &self.buckets[c as usize] {
                let pattern = &set[pid as usize];
                if pos + pattern.len() > n {
                    continue;
                }
                if Self::verify(pattern, text, pos, &mut stats.comparisons) {
                    stats.matches += 1;
                    found = true;
                    on_match(Match {
                        pattern: pid,
                        start: pos,
                        end: pos + pattern.len(),
                    });
                }
            }

            let step = if found { 1 } else { shift.max(1) };
            stats.shifts += step as u64;
            pos += step;
        }
    }
}
