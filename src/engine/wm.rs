use crate::analytics::Analytics;
use crate::bloom::{fnv1a, BloomFilter, FNV_OFFSET_BASIS};
use crate::engine::Match;
use crate::set::PatternSet;

/// Chain terminator for the suffix-block hash table.
const NIL: i32 = -1;

/// Direct-indexed tables stop at 24 bits; the 4-byte block key is folded
/// down to that. Folding can only lower a shift or lengthen a chain,
/// never hide a pattern, because every candidate is verified exactly.
const MAX_TABLE_BITS: u32 = 24;

/// Pick the block size from the pattern statistics: short patterns and
/// very large sets want the small key space, long patterns can afford
/// the large one.
fn choose_block_size(set: &PatternSet) -> usize {
    if set.min_length() < 4 || set.len() > 5000 {
        2
    } else if set.avg_length() > 30 {
        4
    } else {
        3
    }
}

/// Pack up to `block` bytes little-endian into a 32-bit key, zero-padding
/// past the end of the slice.
fn block_key(s: &[u8], block: usize) -> u32 {
    let mut k = 0;
    for i in 0..block {
        let v = s.get(i).copied().unwrap_or(0);
        k |= u32::from(v) << (8 * i);
    }
    k
}

/// Wu-Manber shift/hash engine.
///
/// The `block` bytes at the tail of each `window`-byte alignment index a
/// shift table; a zero shift routes the window into a hash bucket of
/// candidate patterns chained by id, each screened by a prefix hash and
/// then verified byte-for-byte over its full length. In probabilistic
/// mode a Bloom filter over pattern prefixes sits between the shift and
/// the chain walk.
pub struct WuManber {
    block: usize,
    window: usize,
    table_bits: u32,
    shift: Vec<u8>,
    hash: Vec<i32>,
    next: Vec<i32>,
    prefix_hash: Vec<u32>,
    prefix_filter: Option<BloomFilter>,
}

impl WuManber {
    /// Preprocess the pattern set. `block_override` pins the block size
    /// instead of deriving it; `bloom_fp_rate` is `Some` in
    /// probabilistic mode and carries the target false-positive rate.
    pub fn new(
        set: &PatternSet,
        block_override: Option<usize>,
        bloom_fp_rate: Option<f64>,
    ) -> WuManber {
        let block = block_override
            .unwrap_or_else(|| choose_block_size(set))
            .clamp(2, 4);
        let window = set.min_length().max(block);

        let table_bits = (8 * block as u32).min(MAX_TABLE_BITS);
        let table_len = 1usize << table_bits;
        let default_shift = (window - block + 1) as u8;

        let mut wm = WuManber {
            block,
            window,
            table_bits,
            shift: vec![default_shift; table_len],
            hash: vec![NIL; table_len],
            next: vec![NIL; set.len()],
            prefix_hash: vec![0; set.len()],
            prefix_filter: bloom_fp_rate.map(|p| BloomFilter::new(set.len(), p)),
        };

        for (pid, pattern) in set.iter().enumerate() {
            let bytes = &pattern.bytes;

            wm.prefix_hash[pid] = fnv1a(&bytes[..bytes.len().min(block)], FNV_OFFSET_BASIS);
            if let Some(filter) = wm.prefix_filter.as_mut() {
                filter.add(&bytes[..bytes.len().min(block)]);
            }

            // Every block inside the window prefix lowers the shift for
            // its key; the tail block also heads the candidate chain.
            for j in 0..=window - block {
                let key = wm.index(block_key(&bytes[j.min(bytes.len())..], block));
                let proposed = (window - block - j) as u8;
                if proposed < wm.shift[key] {
                    wm.shift[key] = proposed;
                }
            }

            let tail = window - block;
            let key = wm.index(block_key(&bytes[tail.min(bytes.len())..], block));
            wm.next[pid] = wm.hash[key];
            wm.hash[key] = pid as i32;
        }

        debug!(
            "wu-manber tables built: B={}, window={}, {} patterns, bloom={}",
            block,
            window,
            set.len(),
            wm.prefix_filter.is_some()
        );

        wm
    }

    /// Block size in use.
    pub fn block_size(&self) -> usize {
        self.block
    }

    /// Scanning window size: the clamped shortest pattern length.
    pub fn window(&self) -> usize {
        self.window
    }

    fn index(&self, key: u32) -> usize {
        ((key ^ (key >> self.table_bits)) & ((1 << self.table_bits) - 1)) as usize
    }

    /// Slide the window over the buffer, shifting on the tail-block key
    /// and verifying hash-bucket candidates whenever the shift is zero.
    pub fn scan<F: FnMut(Match)>(
        &self,
        set: &PatternSet,
        text: &[u8],
        stats: &mut Analytics,
        mut on_match: F,
    ) {
        let n = text.len();
        let m = self.window;
        let b = self.block;

        if n < m {
            return;
        }

        let mut i = m - 1;
        while i < n {
            stats.windows += 1;

            let key = self.index(block_key(&text[i + 1 - b..=i], b));
            let shift = self.shift[key] as usize;
            stats.sum_shift += shift as u64;

            if shift > 0 {
                i += shift;
                continue;
            }

            stats.hash_hits += 1;
            let start = i + 1 - m;

            if let Some(filter) = &self.prefix_filter {
                stats.bloom_checks += 1;
                if !filter.check(&text[start..start + b]) {
                    i += 1;
                    continue;
                }
                stats.bloom_pass += 1;
            }

            let window_hash = fnv1a(&text[start..start + b], FNV_OFFSET_BASIS);

            let mut pid = self.hash[key];
            while pid != NIL {
                stats.chain_steps += 1;
                let p = pid as usize;

                if self.prefix_hash[p] == window_hash {
                    let bytes = &set[p].bytes;
                    if start + bytes.len() <= n && text[start..start + bytes.len()] == bytes[..] {
                        stats.exact_matches += 1;
                        stats.verif_after_bloom += 1;
                        on_match(Match {
                            pattern: p as u32,
                            start,
                            end: start + bytes.len(),
                        });
                    }
                }

                pid = self.next[p];
            }

            i += 1;
        }
    }
}
