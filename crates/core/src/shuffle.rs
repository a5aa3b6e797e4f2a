//! Deterministic, seeded shuffling of the gallery display order.
//!
//! The seed is drawn once per browsing session (see [`new_session_seed`]) so
//! the shuffled order stays stable while more pages stream in and the grid is
//! re-rendered.

// ---------------------------------------------------------------------------
// PRNG
// ---------------------------------------------------------------------------

/// Increment added to the state before every draw.
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32, used to map a `u32` draw onto `[0, 1)`.
const U32_RANGE: f64 = 4_294_967_296.0;

/// The mulberry32 generator: 32 bits of state, one multiply-xorshift per draw.
///
/// Not suitable for anything security related. It exists so the same seed
/// yields the same permutation on every platform.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next output mapped onto `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / U32_RANGE
    }

    /// Uniform index in `0..=max`.
    fn index_up_to(&mut self, max: usize) -> usize {
        let j = (self.next_f64() * (max + 1) as f64) as usize;
        // Guards against float rounding at the very top of the range.
        j.min(max)
    }
}

// ---------------------------------------------------------------------------
// Shuffle
// ---------------------------------------------------------------------------

/// Shuffle `items` in place with a Fisher–Yates pass driven by `seed`.
///
/// Walks from the last index down to 1, swapping each element with a
/// uniformly chosen index at or below it. Slices of length 0 or 1 are left
/// untouched.
pub fn shuffle_in_place<T>(items: &mut [T], seed: u32) {
    if items.len() < 2 {
        return;
    }
    let mut rng = Mulberry32::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.index_up_to(i);
        items.swap(i, j);
    }
}

/// Return a shuffled copy of `items`. Same seed and same input order always
/// produce the same output order.
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: u32) -> Vec<T> {
    let mut out = items.to_vec();
    shuffle_in_place(&mut out, seed);
    out
}

/// Apply the session's display order: shuffled when `shuffle` is on,
/// otherwise the input order verbatim.
pub fn apply_display_order<T: Clone>(items: &[T], shuffle: bool, seed: u32) -> Vec<T> {
    if shuffle {
        seeded_shuffle(items, seed)
    } else {
        items.to_vec()
    }
}

/// Draw a fresh seed for a new browsing session.
pub fn new_session_seed() -> u32 {
    rand::random::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mulberry_matches_reference_sequence() {
        let mut rng = Mulberry32::new(1);
        assert_eq!(rng.next_u32(), 2_693_262_067);
        assert_eq!(rng.next_u32(), 11_749_833);
        assert_eq!(rng.next_u32(), 2_265_367_787);
    }

    #[test]
    fn next_f64_stays_in_unit_interval() {
        let mut rng = Mulberry32::new(0xDEAD_BEEF);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn shuffle_matches_reference_permutation() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(
            seeded_shuffle(&items, 42),
            vec![0, 7, 3, 5, 2, 1, 8, 9, 4, 6]
        );
        assert_eq!(seeded_shuffle(&[0, 1, 2, 3, 4], 7), vec![3, 1, 2, 4, 0]);
    }

    #[test]
    fn same_seed_same_order() {
        let items: Vec<u32> = (0..200).collect();
        for seed in [0, 1, 99, u32::MAX] {
            assert_eq!(seeded_shuffle(&items, seed), seeded_shuffle(&items, seed));
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let items: Vec<u32> = (0..137).map(|i| i % 17).collect();
        for seed in 0..50 {
            let mut shuffled = seeded_shuffle(&items, seed);
            let mut expected = items.clone();
            shuffled.sort_unstable();
            expected.sort_unstable();
            assert_eq!(shuffled, expected, "seed {seed} lost or duplicated items");
        }
    }

    #[test]
    fn short_inputs_are_unchanged() {
        let empty: Vec<u8> = Vec::new();
        assert!(seeded_shuffle(&empty, 5).is_empty());
        for seed in [0, 3, u32::MAX] {
            assert_eq!(seeded_shuffle(&["only"], seed), vec!["only"]);
        }
    }

    #[test]
    fn different_seeds_can_differ() {
        assert_eq!(seeded_shuffle(&['a', 'b'], 0), vec!['b', 'a']);
        assert_eq!(seeded_shuffle(&['a', 'b'], 1), vec!['a', 'b']);
    }

    #[test]
    fn display_order_without_shuffle_is_identity() {
        let items: Vec<u32> = (0..30).collect();
        assert_eq!(apply_display_order(&items, false, 1234), items);
        assert_eq!(
            apply_display_order(&items, true, 1234),
            seeded_shuffle(&items, 1234)
        );
    }
}
