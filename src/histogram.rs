//! Frequency maps and the per-sample feature keys they are bucketed by.

use crate::config::{BitWidth, MAX_DECIMALS};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

/// Occurrence counts per feature key. Keys are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram<K: Eq + Hash> {
    counts: HashMap<K, u64>,
}

impl<K: Eq + Hash> Default for Histogram<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> Histogram<K> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum over all buckets; equals the sample count after a complete run.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }
}

/// Smaller over larger of the set and unset bit counts, formatted to
/// `decimals` places. Two ratios share a bucket iff their text is equal.
pub fn evenness_bucket(ones: u32, bits: BitWidth, decimals: usize) -> String {
    let total = bits.bits();
    let ones = ones.min(total);
    let zeros = total - ones;

    // NOTE: max(ones, zeros) >= total / 2 >= 1, so this never divides by zero
    let ratio = ones.min(zeros) as f64 / ones.max(zeros) as f64;
    let decimals = decimals.min(MAX_DECIMALS);

    format!("{ratio:.decimals$}")
}

/// Crown signature of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrownKey {
    /// Highest symmetry rank with a nonzero count, and that count.
    Rank { rank: u32, count: u32 },
    /// No symmetry class occurs at all.
    NoSymmetry,
}

impl CrownKey {
    pub const SENTINEL: &'static str = "—";

    /// Picks the highest rank whose occurrence count is nonzero.
    pub fn from_ranks(ranks: &BTreeMap<u32, u32>) -> Self {
        ranks
            .iter()
            .rev()
            .find(|&(_, &count)| count > 0)
            .map(|(&rank, &count)| CrownKey::Rank { rank, count })
            .unwrap_or(CrownKey::NoSymmetry)
    }
}

impl fmt::Display for CrownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrownKey::Rank { rank, count } => write!(f, "{rank}:{count}"),
            CrownKey::NoSymmetry => f.write_str(Self::SENTINEL),
        }
    }
}

/// The three feature histograms of a run, plus the set-bit counts behind the
/// summary statistics. Size is bounded by the number of distinct keys, never
/// by the number of samples.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub evenness: Histogram<String>,
    pub passages: Histogram<u32>,
    pub crown: Histogram<CrownKey>,
    pub ones: Histogram<u32>,
    samples: u64,
}

impl Tally {
    /// Counts one analysed sample with `ones` set bits.
    pub fn record_ones(&mut self, ones: u32) {
        self.ones.increment(ones);
        self.samples += 1;
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Mean and sample standard deviation of the set-bit counts. The standard
    /// deviation needs at least two samples.
    pub fn ones_moments(&self) -> (Option<f64>, Option<f64>) {
        let n = self.ones.total();

        if n == 0 {
            return (None, None);
        }

        // sorted so the float sums do not depend on hash order
        let mut buckets: Vec<(u32, u64)> = self.ones.iter().map(|(&k, c)| (k, c)).collect();
        buckets.sort_unstable();

        let n_f = n as f64;
        let mean = buckets.iter().map(|&(k, c)| k as f64 * c as f64).sum::<f64>() / n_f;

        let std_dev = (n > 1).then(|| {
            let squares: f64 = buckets
                .iter()
                .map(|&(k, c)| {
                    let d = k as f64 - mean;
                    d * d * c as f64
                })
                .sum();

            (squares / (n_f - 1.0)).sqrt()
        });

        (Some(mean), std_dev)
    }
}
