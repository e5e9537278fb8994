use std::collections::VecDeque;

use crate::analytics::Analytics;
use crate::engine::Match;
use crate::set::PatternSet;

/// State index inside the automaton arena.
type StateId = u32;

const ROOT: StateId = 0;

/// Transition sentinel, present only while the trie is under
/// construction. Finalization resolves every entry, so the scan loop
/// never sees it.
const UNDEFINED: StateId = StateId::MAX;

struct State {
    trans: [StateId; 256],
    fail: StateId,
    /// `(pattern id, pattern length)` for every pattern ending at this
    /// state or at a state reachable over failure links.
    output: Vec<(u32, u32)>,
}

impl State {
    fn new() -> State {
        State {
            trans: [UNDEFINED; 256],
            fail: ROOT,
            output: Vec::new(),
        }
    }
}

/// Aho-Corasick automaton over the whole pattern set.
///
/// States live in an index-addressed arena rather than behind pointers,
/// which keeps failure-link traversal free of aliasing concerns. Bytes
/// are folded to ASCII lowercase both on insertion and on scan, so every
/// pattern matches case-insensitively through this engine.
pub struct AhoCorasick {
    states: Vec<State>,
}

impl AhoCorasick {
    /// Build the automaton: trie insertion, then a BFS pass that fills
    /// failure links, merges output sets downward, and resolves every
    /// remaining transition through the failure state.
    pub fn new(set: &PatternSet) -> AhoCorasick {
        let mut ac = AhoCorasick {
            states: vec![State::new()],
        };

        for (id, pattern) in set.iter().enumerate() {
            ac.insert(id as u32, &pattern.bytes);
        }
        ac.finalize();

        debug!("aho-corasick automaton built with {} states", ac.states.len());

        ac
    }

    fn insert(&mut self, id: u32, bytes: &[u8]) {
        let mut state = ROOT;

        for &b in bytes {
            let c = b.to_ascii_lowercase() as usize;
            let next = self.states[state as usize].trans[c];

            state = if next == UNDEFINED {
                let new_id = self.states.len() as StateId;
                self.states.push(State::new());
                self.states[state as usize].trans[c] = new_id;
                new_id
            } else {
                next
            };
        }

        self.states[state as usize]
            .output
            .push((id, bytes.len() as u32));
    }

    /// BFS from the root. The root self-loops on bytes that leave the
    /// keyword trie; every deeper state inherits both its failure link
    /// and its undefined transitions from the failure state, which the
    /// BFS order guarantees is already fully resolved.
    fn finalize(&mut self) {
        let mut queue = VecDeque::new();

        for c in 0..256 {
            let next = self.states[ROOT as usize].trans[c];
            if next == UNDEFINED {
                self.states[ROOT as usize].trans[c] = ROOT;
            } else {
                self.states[next as usize].fail = ROOT;
                queue.push_back(next);
            }
        }

        while let Some(state) = queue.pop_front() {
            for c in 0..256 {
                let next = self.states[state as usize].trans[c];
                let fail = self.states[state as usize].fail;
                let through = self.states[fail as usize].trans[c];

                if next == UNDEFINED {
                    self.states[state as usize].trans[c] = through;
                } else {
                    queue.push_back(next);
                    self.states[next as usize].fail = through;

                    let inherited = self.states[through as usize].output.clone();
                    self.states[next as usize].output.extend(inherited);
                }
            }
        }
    }

    /// Number of states in the arena.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Walk the buffer once, emitting every pattern occurrence. The
    /// inner step is a single table lookup; failure links were already
    /// compiled into the transition rows. The automaton discovers
    /// matches by end offset, so they are buffered and sorted before
    /// delivery: left-to-right by start offset, ties by pattern id
    /// ascending.
    pub fn scan<F: FnMut(Match)>(&self, text: &[u8], stats: &mut Analytics, mut on_match: F) {
        let mut state = ROOT;
        let mut matches = Vec::new();

        for (i, &b) in text.iter().enumerate() {
            let c = b.to_ascii_lowercase() as usize;

            stats.transitions += 1;
            state = self.states[state as usize].trans[c];

            for &(id, len) in &self.states[state as usize].output {
                stats.matches += 1;
                matches.push(Match {
                    pattern: id,
                    start: i + 1 - len as usize,
                    end: i + 1,
                });
            }
        }

        matches.sort_unstable_by_key(|m| (m.start, m.pattern));
        for m in matches {
            on_match(m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern;

    fn automaton(patterns: &[&str]) -> AhoCorasick {
        let set = PatternSet::new(patterns.iter().map(|p| pattern! {*p}).collect()).unwrap();
        AhoCorasick::new(&set)
    }

    fn matches(ac: &AhoCorasick, text: &[u8]) -> Vec<(u32, usize)> {
        let mut stats = Analytics::new("test");
        let mut found = Vec::new();
        ac.scan(text, &mut stats, |m| found.push((m.pattern, m.start)));
        found
    }

    #[test]
    fn test_ushers() {
        // delivery order: she (start 1), then he and hers (both start
        // 2, id ascending)
        let ac = automaton(&["he", "she", "his", "hers"]);

        assert_eq!(
            matches(&ac, b"ushers"),
            vec![(1, 1), (0, 2), (3, 2)],
            "she, he, hers"
        );
    }

    #[test]
    fn test_emission_order_is_by_start_offset() {
        // "a" is a suffix of "xya", so the automaton discovers it at
        // loop index 2, one byte before "xyaz" completes; delivery must
        // still lead with the earlier start offset
        let ac = automaton(&["xyaz", "a"]);

        assert_eq!(matches(&ac, b"xyaz"), vec![(0, 0), (1, 2)]);
    }

    #[test]
    fn test_case_folding() {
        let ac = automaton(&["cmd.exe"]);

        assert_eq!(matches(&ac, b"run CMD.EXE now"), vec![(0, 4)]);
    }

    #[test]
    fn test_empty_text() {
        let ac = automaton(&["x"]);
        let mut stats = Analytics::new("test");
        let mut count = 0;

        ac.scan(b"", &mut stats, |_| count += 1);

        assert_eq!(count, 0);
        assert_eq!(stats.transitions, 0);
    }

    #[test]
    fn test_transitions_total_after_build() {
        let ac = automaton(&["abc", "bcd", "c"]);

        for state in &ac.states {
            for c in 0..256 {
                assert_ne!(state.trans[c], UNDEFINED);
                assert!((state.trans[c] as usize) < ac.states.len());
            }
        }
    }

    #[test]
    fn test_outputs_closed_under_failure_links() {
        let ac = automaton(&["abcd", "bcd", "cd", "d"]);

        for state in &ac.states {
            let fail = &ac.states[state.fail as usize];
            for entry in &fail.output {
                assert!(
                    state.output.contains(entry),
                    "output set not closed under failure link"
                );
            }
        }
    }

    #[test]
    fn test_overlapping_matches() {
        let ac = automaton(&["aaaa"]);

        assert_eq!(
            matches(&ac, b"aaaaaaa"),
            vec![(0, 0), (0, 1), (0, 2), (0, 3)]
        );
    }
}
