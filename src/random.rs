//! Injectable uniform random source.
//!
//! Every operation that needs randomness (K-means++ seeding, differential
//! evolution, mixture-model initialisation) takes an explicit `&mut` handle
//! implementing [`UniformRandom`]. There is no process-wide generator: pass a
//! seeded [`rand::rngs::StdRng`] for reproducible runs, or any other
//! [`rand::Rng`].

use rand::prelude::*;

/// Source of uniformly distributed numbers.
pub trait UniformRandom {
    /// Uniform `f64` in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `[0, bound)`. `bound` must be positive.
    fn next_index(&mut self, bound: usize) -> usize;
}

impl<R: Rng + ?Sized> UniformRandom for R {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.random::<f64>()
    }

    #[inline]
    fn next_index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        self.random_range(0..bound)
    }
}

/// A `StdRng` seeded from `seed`, or from OS entropy when `seed` is `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}
