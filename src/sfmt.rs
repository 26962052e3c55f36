//! Portable SFMT-19937 state.
//!
//! Each 128-bit lane is held in a `u128` with word 0 in the low bits, so the
//! whole-lane byte shifts of the SIMD formulation become plain integer shifts
//! and the per-word shifts are done on the unpacked `[u32; 4]`.

pub(crate) const N128: usize = 156;
pub(crate) const STATE32_LEN: usize = N128 * 4;

const POS1: usize = 122;
const SL1: u32 = 18;
const SR1: u32 = 11;

// whole-lane shifts, in bytes
const SL2: u32 = 1;
const SR2: u32 = 1;

const MSK: [u32; 4] = [0xdfffffef, 0xddfecb7f, 0xbffaffff, 0xbffffff6];
const PARITY: [u32; 4] = [0x00000001, 0x00000000, 0x00000000, 0x13c9e684];
const INIT_MULT: u32 = 1812433253;

pub(crate) struct InnerState(pub(crate) [u128; N128]);

impl InnerState {
    pub(crate) fn new(seed: u64) -> Self {
        let mut s = [0u32; STATE32_LEN];

        s[0] = seed as u32;
        s[1] = (seed >> 32) as u32;

        // mersenne twister style state expansion w/ `s[i] = f(s[i-1], i)`
        for i in 2..STATE32_LEN {
            let prev = s[i - 1];

            s[i] = INIT_MULT.wrapping_mul(prev ^ (prev >> 30)).wrapping_add(i as u32);
        }

        // NOTE: period certification to ensure full period
        period_certify(&mut s);

        Self(core::array::from_fn(|idx| {
            let base = idx * 4;
            pack([s[base], s[base + 1], s[base + 2], s[base + 3]])
        }))
    }

    /// Regenerates every lane in place with the SFMT recurrence.
    pub(crate) fn regen(&mut self) {
        let state = &mut self.0;

        let mut c = state[N128 - 2];
        let mut d = state[N128 - 1];

        for i in 0..N128 {
            let b_idx = if i + POS1 >= N128 { i + POS1 - N128 } else { i + POS1 };
            let r = recurrence_relation(state[i], state[b_idx], c, d);

            state[i] = r;
            c = d;
            d = r;
        }
    }

    #[inline(always)]
    pub(crate) fn word(&self, idx: usize) -> u32 {
        // sanity check
        debug_assert!(idx < STATE32_LEN);

        (self.0[idx / 4] >> ((idx % 4) * 32)) as u32
    }
}

/// Performs SFMT recurrence relation
///
/// ## Algo
///
/// ```md
/// w = (a << 128 bits by SL2 bytes)
/// x = ((b >> SR1 per word) & MSK)
/// y = (c >> 128 bits by SR2 bytes)
/// z = (d << SL1 per word)
///
/// out = a ^ w ^ x ^ y ^ z
/// ```
#[inline(always)]
fn recurrence_relation(a: u128, b: u128, c: u128, d: u128) -> u128 {
    let w = a << (SL2 * 8);
    let x = map_words(b, |v| v >> SR1) & pack(MSK);
    let y = c >> (SR2 * 8);
    let z = map_words(d, |v| v << SL1);

    a ^ w ^ x ^ y ^ z
}

#[inline(always)]
fn map_words(lane: u128, f: impl Fn(u32) -> u32) -> u128 {
    pack(unpack(lane).map(f))
}

#[inline(always)]
fn pack(w: [u32; 4]) -> u128 {
    (w[0] as u128) | ((w[1] as u128) << 32) | ((w[2] as u128) << 64) | ((w[3] as u128) << 96)
}

#[inline(always)]
fn unpack(lane: u128) -> [u32; 4] {
    [lane as u32, (lane >> 32) as u32, (lane >> 64) as u32, (lane >> 96) as u32]
}

fn parity_fold(state: &[u32]) -> u32 {
    let mut inner = 0u32;

    for i in 0..4 {
        inner ^= state[i] & PARITY[i];
    }

    inner.count_ones() & 1
}

/// Ensures the seeded state satisfies the period certification condition
/// required for the maximal period `2^19937 - 1`.
fn period_certify(state: &mut [u32; STATE32_LEN]) {
    if parity_fold(&state[..4]) == 1 {
        return;
    }

    // NOTE: parity is even, so flip the lowest order bit found in PARITY
    for i in 0..4 {
        let p = PARITY[i];

        if p != 0 {
            state[i] ^= 1u32 << p.trailing_zeros();

            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_words(state: &InnerState) -> [u32; 4] {
        unpack(state.0[0])
    }

    #[test]
    fn test_seeded_state_is_period_certified() {
        for seed in [0u64, 1, 42, 0x1234, 0xDEADBEEFCAFEBABE, u64::MAX] {
            let s = InnerState::new(seed);

            assert_eq!(parity_fold(&first_words(&s)), 1, "seed {seed:#x} must be certified");
        }
    }

    #[test]
    fn test_regen_mutates_current_state() {
        let mut s = InnerState::new(0x123456789);
        let before = s.0;

        s.regen();

        assert_ne!(s.0, before, "regen should mutate the state");
    }

    #[test]
    fn test_regen_produces_different_values_on_multiple_calls() {
        let mut s = InnerState::new(0xDEADBEEFCAFEBABE);
        let first = s.0;

        s.regen();
        let second = s.0;

        s.regen();
        let third = s.0;

        assert_ne!(first, second, "first refill should change state");
        assert_ne!(second, third, "second refill should further change state");
    }

    #[test]
    fn test_regen_is_deterministic() {
        let mut s1 = InnerState([1u128; N128]);
        let mut s2 = InnerState([1u128; N128]);

        s1.regen();
        s2.regen();

        assert_eq!(s1.0, s2.0, "identical inputs should yield identical outputs");
    }

    #[test]
    fn test_pack_and_word_agree() {
        let s = InnerState::new(7);
        let lane = unpack(s.0[3]);

        for (i, w) in lane.iter().enumerate() {
            assert_eq!(s.word(12 + i), *w);
        }
    }

    #[test]
    fn test_recurrence_relation_shifts_match_wide_arithmetic() {
        let d = pack([1, 2, 3, 4]);
        let z = map_words(d, |v| v << SL1);

        assert_eq!(unpack(z), [1 << SL1, 2 << SL1, 3 << SL1, 4 << SL1]);

        // whole-lane shift carries bytes across word boundaries
        let c = pack([0, 0xAB, 0, 0]);
        assert_eq!(unpack(c >> (SR2 * 8)), [0xAB00_0000, 0, 0, 0]);
    }
}
