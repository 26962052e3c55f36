//! Feature extraction contract and a reference bit-level analyzer.

use crate::config::BitWidth;
use crate::source::Sample;
use std::collections::BTreeMap;

/// Pure, deterministic feature functions over a well-formed sample.
///
/// Implementations must be total: any valid B-bit sample yields a value, and
/// repeated calls with the same input yield the same value.
pub trait FeatureAnalyzer {
    /// Number of set bits, in `[0, B]`.
    fn ones(&self, sample: &Sample) -> u32;

    /// Structural transition count over the bit sequence.
    fn passages(&self, sample: &Sample, bits: BitWidth) -> u32;

    /// Symmetry rank to occurrence count. Ranks mapped to 0 count as absent.
    fn symmetry_ranks(&self, sample: &Sample, bits: BitWidth) -> BTreeMap<u32, u32>;
}

/// Highest symmetry rank examined; rank `r` looks at blocks of `2^(r+1)` bits.
pub const MAX_SYMMETRY_RANK: u32 = 4;

/// Reference analyzer working directly on the sample bits.
///
/// * passages: the bits form a ring, and every maximal run of set bits is a
///   passage, so the count is the number of cyclic `0 -> 1` transitions.
/// * symmetry: rank `r` splits the value into aligned blocks of `2^(r+1)`
///   bits and counts the blocks that are bit palindromes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitAnalyzer;

impl BitAnalyzer {
    #[inline(always)]
    fn bit(bytes: &[u8], idx: usize) -> bool {
        (bytes[idx / 8] >> (7 - idx % 8)) & 1 == 1
    }

    fn bit_len(sample: &Sample, bits: BitWidth) -> usize {
        (bits.bits() as usize).min(sample.as_bytes().len() * 8)
    }

    fn is_palindrome(bytes: &[u8], start: usize, len: usize) -> bool {
        (0..len / 2).all(|j| Self::bit(bytes, start + j) == Self::bit(bytes, start + len - 1 - j))
    }
}

impl FeatureAnalyzer for BitAnalyzer {
    fn ones(&self, sample: &Sample) -> u32 {
        sample.as_bytes().iter().map(|b| b.count_ones()).sum()
    }

    fn passages(&self, sample: &Sample, bits: BitWidth) -> u32 {
        let bytes = sample.as_bytes();
        let len = Self::bit_len(sample, bits);

        if len == 0 {
            return 0;
        }

        let mut prev = Self::bit(bytes, len - 1);
        let mut count = 0;

        for idx in 0..len {
            let cur = Self::bit(bytes, idx);

            if cur && !prev {
                count += 1;
            }

            prev = cur;
        }

        count
    }

    fn symmetry_ranks(&self, sample: &Sample, bits: BitWidth) -> BTreeMap<u32, u32> {
        let bytes = sample.as_bytes();
        let len = Self::bit_len(sample, bits);

        (1..=MAX_SYMMETRY_RANK)
            .map(|rank| {
                let block = 1usize << (rank + 1);
                let count = (0..len / block)
                    .filter(|b| Self::is_palindrome(bytes, b * block, block))
                    .count() as u32;

                (rank, count)
            })
            .collect()
    }
}
