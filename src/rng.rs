use crate::state::State;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fast, non-cryptographic generator backed by SFMT-19937.
///
/// Never use this for anything that needs unpredictability. It exists so that
/// exploratory runs can trade randomness quality for throughput.
pub struct FastRng {
    state: State,
}

impl FastRng {
    #[inline(always)]
    pub fn new_seeded(seed: u64) -> Self {
        Self {
            state: State::new(seed),
        }
    }

    /// Seeds from the wall clock and the process id.
    pub fn from_clock() -> Self {
        // NOTE: a clock before the epoch only costs us seed quality, never correctness
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        let seed = splitmix64(nanos ^ ((std::process::id() as u64) << 32));
        tracing::debug!(seed, "fast rng seeded from clock");

        Self::new_seeded(seed)
    }

    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        self.state.gen_64()
    }

    #[inline(always)]
    pub fn next_u32(&mut self) -> u32 {
        self.state.gen_32()
    }

    /// Uniform draw from `range`, w/o modulo bias.
    #[inline(always)]
    pub fn range_u32(&mut self, range: core::ops::Range<u32>) -> u32 {
        // sanity check
        assert!(range.start < range.end, "range_u32: empty exclusive range");

        let span = range.end - range.start;

        // rejection sampling to remove bias
        let threshold = span.wrapping_neg() % span;

        loop {
            let m = self.next_u32() as u64 * span as u64;

            if (m as u32) >= threshold {
                return range.start + Self::mulhi_u32(m);
            }
        }
    }

    #[inline(always)]
    fn mulhi_u32(m: u64) -> u32 {
        (m >> 32) as u32
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e3779b97f4a7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);

    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_same_seed() {
        let mut a = FastRng::new_seeded(123456789);
        let mut b = FastRng::new_seeded(123456789);

        let seq_a: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let seq_b: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();

        assert_eq!(seq_a, seq_b, "identical seeds must yield same sequence");
    }

    #[test]
    fn test_different_seeds_produce_different_sequences() {
        let mut a = FastRng::new_seeded(1);
        let mut b = FastRng::new_seeded(2);

        let seq_a: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let seq_b: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();

        assert_ne!(seq_a, seq_b, "different seeds should yield distinct output");
    }

    #[test]
    fn test_can_move_across_threads() {
        let mut rng = FastRng::new_seeded(1234);
        let handle = std::thread::spawn(move || (0..4).map(|_| rng.next_u64()).collect::<Vec<_>>());

        let res = handle.join().expect("thread should run successfully");
        assert!(res.iter().any(|&x| x != 0));
    }

    #[test]
    fn test_range_u32_basic() {
        let mut rng = FastRng::new_seeded(909);

        for _ in 0..1000 {
            let v = rng.range_u32(100..200);
            assert!((100..200).contains(&v));
        }

        for _ in 0..1000 {
            assert!(rng.range_u32(0..16) < 16);
        }
    }

    #[test]
    #[should_panic(expected = "empty exclusive range")]
    fn test_empty_range_panics() {
        let mut rng = FastRng::new_seeded(1);
        let _ = rng.range_u32(10..10);
    }

    #[test]
    fn test_uniformity_rough_check() {
        let mut rng = FastRng::new_seeded(7777);
        let mut hits = [0u64; 16];

        for _ in 0..16_000 {
            hits[rng.range_u32(0..16) as usize] += 1;
        }

        let avg = hits.iter().sum::<u64>() as f64 / 16.0;
        let max_dev = hits.iter().map(|&x| (x as f64 - avg).abs()).fold(0.0, f64::max);

        assert!(max_dev / avg < 0.25, "rough uniformity check failed");
    }
}
