use core::ops::Index;
use core::slice;

use crate::pattern::{Flags, Pattern, Patterns, MAX_PATTERN_LEN};
use crate::{Error, Result};

/// An immutable, validated collection of content patterns.
///
/// The set owns the pattern bytes. Engines refer to patterns by their
/// index in the set, which is stable for the set's lifetime; the derived
/// length statistics drive window and block sizing in the shift-based
/// engines.
#[derive(Clone, Debug)]
pub struct PatternSet {
    patterns: Patterns,
    min_length: usize,
    avg_length: usize,
}

impl PatternSet {
    /// Validate and take ownership of the given patterns.
    ///
    /// Refuses an empty set, an empty pattern, and any pattern longer
    /// than [`MAX_PATTERN_LEN`]; no engine can be built without a set
    /// that passed this gate.
    pub fn new(patterns: Patterns) -> Result<PatternSet> {
        if patterns.is_empty() {
            return Err(Error::EmptyPatternSet);
        }

        let mut min_length = usize::MAX;
        let mut total = 0;

        for (id, pattern) in patterns.iter().enumerate() {
            if pattern.is_empty() {
                return Err(Error::EmptyPattern(id));
            }
            if pattern.len() > MAX_PATTERN_LEN {
                return Err(Error::PatternTooLong {
                    id,
                    len: pattern.len(),
                    max: MAX_PATTERN_LEN,
                });
            }

            min_length = min_length.min(pattern.len());
            total += pattern.len();
        }

        let avg_length = total / patterns.len();

        debug!(
            "pattern set: {} patterns, min length {}, avg length {}",
            patterns.len(),
            min_length,
            avg_length
        );

        Ok(PatternSet {
            patterns,
            min_length,
            avg_length,
        })
    }

    /// Number of patterns in the set.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set holds no patterns. Construction refuses an empty
    /// set, so this is false for every live value.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Length of the shortest pattern; the scanning window size for the
    /// shift-based engines.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Mean pattern length, rounded down.
    pub fn avg_length(&self) -> usize {
        self.avg_length
    }

    /// The patterns as a slice, indexed by pattern id.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Iterate patterns in id order.
    pub fn iter(&self) -> slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    /// Apply the `CASELESS` flag to every pattern, consuming the set.
    pub fn into_caseless(mut self) -> PatternSet {
        for pattern in &mut self.patterns {
            pattern.flags |= Flags::CASELESS;
        }
        self
    }
}

impl Index<usize> for PatternSet {
    type Output = Pattern;

    fn index(&self, id: usize) -> &Pattern {
        &self.patterns[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern;

    #[test]
    fn test_statistics() {
        let set = PatternSet::new(vec![
            pattern! {"MALWARE"},
            pattern! {"EVIL"},
            pattern! {"BAD"},
        ])
        .unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.min_length(), 3);
        assert_eq!(set.avg_length(), 4);
        assert_eq!(set[0].bytes, b"MALWARE");
    }

    #[test]
    fn test_refusals() {
        assert!(matches!(
            PatternSet::new(vec![]),
            Err(Error::EmptyPatternSet)
        ));

        assert!(matches!(
            PatternSet::new(vec![pattern! {"ok"}, pattern! {""}]),
            Err(Error::EmptyPattern(1))
        ));

        let long = vec![b'x'; MAX_PATTERN_LEN + 1];
        assert!(matches!(
            PatternSet::new(vec![Pattern::new(long)]),
            Err(Error::PatternTooLong { id: 0, .. })
        ));
    }

    #[test]
    fn test_into_caseless() {
        let set = PatternSet::new(vec![pattern! {"root"}])
            .unwrap()
            .into_caseless();

        assert!(set[0].nocase());
    }
}
