use core::f64::consts::LN_2;

pub(crate) const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
pub(crate) const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over `data`, folded from the given seed.
pub(crate) fn fnv1a(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    for &b in data {
        h = (h ^ u32::from(b)).wrapping_mul(FNV_PRIME);
    }
    h
}

/// A double-hashed Bloom filter, used as the Wu-Manber prefix gate.
///
/// The bit-array size `m` and probe count `k` are derived from the
/// expected element count `n` and the target false-positive rate `p` by
/// `m = ⌈-n·ln p / (ln 2)²⌉` and `k = ⌈(m/n)·ln 2⌉`. Probe `i` lands on
/// bit `(h1 + i·h2) mod m`, with `h1`/`h2` two FNV-1a variants under
/// distinct seeds. Elements cannot be removed; a negative answer is
/// always definitive.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    bits: Vec<u8>,
    size: u32,
    num_hashes: u32,
}

impl BloomFilter {
    /// Size the filter for `n` expected elements at false-positive
    /// rate `p`.
    pub fn new(n: usize, p: f64) -> BloomFilter {
        let n = n.max(1) as f64;
        let p = p.clamp(1e-9, 0.5);

        let m = (-(n * p.ln()) / (LN_2 * LN_2)).ceil();
        let k = ((m / n) * LN_2).ceil();

        let size = (m as u32).max(1);

        BloomFilter {
            bits: vec![0; (size as usize + 7) / 8],
            size,
            num_hashes: (k as u32).max(1),
        }
    }

    /// Insert a byte string.
    pub fn add(&mut self, data: &[u8]) {
        let h1 = fnv1a(data, FNV_OFFSET_BASIS);
        let h2 = fnv1a(data, FNV_PRIME);

        for i in 0..self.num_hashes {
            let idx = h1.wrapping_add(i.wrapping_mul(h2)) % self.size;
            self.bits[(idx >> 3) as usize] |= 1 << (idx & 7);
        }
    }

    /// Whether `data` may have been inserted. `false` means the element
    /// was definitely never added; `true` may be a false positive.
    pub fn check(&self, data: &[u8]) -> bool {
        let h1 = fnv1a(data, FNV_OFFSET_BASIS);
        let h2 = fnv1a(data, FNV_PRIME);

        for i in 0..self.num_hashes {
            let idx = h1.wrapping_add(i.wrapping_mul(h2)) % self.size;
            if self.bits[(idx >> 3) as usize] & (1 << (idx & 7)) == 0 {
                return false;
            }
        }
        true
    }

    /// Number of bits in the filter.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of hash probes per element.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing() {
        let bf = BloomFilter::new(1000, 0.01);

        assert_eq!(bf.size(), 9586);
        assert_eq!(bf.num_hashes(), 7);
    }

    #[test]
    fn test_no_false_negatives() {
        let mut bf = BloomFilter::new(100, 0.01);
        let items: Vec<String> = (0..100).map(|i| format!("prefix-{}", i)).collect();

        for item in &items {
            bf.add(item.as_bytes());
        }
        for item in &items {
            assert!(bf.check(item.as_bytes()), "{} went missing", item);
        }
    }

    #[test]
    fn test_false_positive_rate() {
        let mut bf = BloomFilter::new(100, 0.01);

        for i in 0..100 {
            bf.add(format!("in-{}", i).as_bytes());
        }

        let false_positives = (0..1000)
            .filter(|i| bf.check(format!("out-{}", i).as_bytes()))
            .count();

        // p = 1% over 1000 probes; anything near 100 would mean the
        // sizing formulas are broken
        assert!(false_positives < 100, "{} false positives", false_positives);
    }
}
