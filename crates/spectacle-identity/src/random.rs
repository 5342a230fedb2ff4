//! Random number capability.

use rand::Rng;

/// Host-provided source of random integers.
pub trait RandomSource: Send + Sync {
    /// Returns a uniformly distributed integer in `min..=max`.
    fn generate(&self, min: u64, max: u64) -> u64;
}

/// [`RandomSource`] backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn generate(&self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}
