//! Deterministic random number generation for battles.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical battles
//! - **Context streams**: [`BattleStreams`] splits one seed into
//!   independent sequences for damage variance, enemy targeting, and loot
//!   drops, so adding a roll in one domain never shifts another
//!
//! ```
//! use turn_combat::core::BattleStreams;
//!
//! let mut streams = BattleStreams::new(42);
//! let mut again = BattleStreams::new(42);
//!
//! // Extra damage rolls leave the loot sequence untouched
//! let _ = streams.damage.gen_range(0..=100);
//! let _ = streams.damage.gen_range(0..=100);
//! assert_eq!(streams.loot.gen_range(0..=100), again.loot.gen_range(0..=100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};

/// Deterministic RNG for battle rolls.
///
/// Uses ChaCha8 for speed while keeping a well-distributed sequence.
#[derive(Clone, Debug)]
pub struct BattleRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl BattleRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        let context_seed = hasher.finish();

        Self {
            inner: ChaCha8Rng::seed_from_u64(context_seed),
            seed: context_seed,
        }
    }

    /// Generate a random integer in the given inclusive range.
    pub fn gen_range(&mut self, range: std::ops::RangeInclusive<i64>) -> i64 {
        if range.is_empty() {
            return *range.start();
        }
        self.inner.gen_range(range)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}

/// The per-domain streams one battle draws from.
#[derive(Clone, Debug)]
pub struct BattleStreams {
    /// Formula variance.
    pub damage: BattleRng,
    /// Enemy target picks.
    pub targeting: BattleRng,
    /// Loot table draws.
    pub loot: BattleRng,
}

impl BattleStreams {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let root = BattleRng::new(seed);
        Self {
            damage: root.for_context("damage"),
            targeting: root.for_context("targeting"),
            loot: root.for_context("loot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = BattleRng::new(42);
        let mut rng2 = BattleRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range(0..=1000), rng2.gen_range(0..=1000));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = BattleRng::new(1);
        let mut rng2 = BattleRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.gen_range(0..=1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.gen_range(0..=1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_context_produces_different_sequence() {
        let rng = BattleRng::new(42);
        let mut ctx1 = rng.for_context("loot");
        let mut ctx2 = rng.for_context("damage");

        let seq1: Vec<_> = (0..10).map(|_| ctx1.gen_range(0..=1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| ctx2.gen_range(0..=1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_context_is_deterministic() {
        let mut ctx1 = BattleRng::new(42).for_context("enemy");
        let mut ctx2 = BattleRng::new(42).for_context("enemy");

        for _ in 0..10 {
            assert_eq!(ctx1.gen_range(0..=1000), ctx2.gen_range(0..=1000));
        }
    }

    #[test]
    fn test_degenerate_range() {
        let mut rng = BattleRng::new(7);
        assert_eq!(rng.gen_range(3..=3), 3);
        #[allow(clippy::reversed_empty_ranges)]
        let empty = 5..=2;
        assert_eq!(rng.gen_range(empty), 5);
    }

    #[test]
    fn test_streams_do_not_share_rolls() {
        let mut busy = BattleStreams::new(5);
        let mut idle = BattleStreams::new(5);
        for _ in 0..25 {
            busy.damage.gen_range(0..=1000);
            busy.targeting.gen_range(0..=1000);
        }

        let loot: Vec<_> = (0..10).map(|_| busy.loot.gen_range(0..=1000)).collect();
        let expected: Vec<_> = (0..10).map(|_| idle.loot.gen_range(0..=1000)).collect();
        assert_eq!(loot, expected);

        let damage: Vec<_> = (0..10).map(|_| idle.damage.gen_range(0..=1000)).collect();
        let targeting: Vec<_> = (0..10).map(|_| idle.targeting.gen_range(0..=1000)).collect();
        assert_ne!(damage, targeting);
    }

    #[test]
    fn test_choose() {
        let mut rng = BattleRng::new(42);
        let items = vec![1, 2, 3, 4, 5];

        let chosen = rng.choose(&items);
        assert!(chosen.is_some());
        assert!(items.contains(chosen.unwrap()));

        let empty: Vec<i32> = vec![];
        assert!(rng.choose(&empty).is_none());
    }
}
