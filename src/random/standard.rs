//! This module mimicks the interface of RanfGenerator on top of the
//! abstractions of the standard "random" crate.

use crate::numeric::Float;
use rand::{Rng, SeedableRng};

// Select random number generation engine in use
#[cfg(feature = "f32")]
type Engine = rand_xoshiro::Xoshiro128Plus;
#[cfg(not(feature = "f32"))]
type Engine = rand_xoshiro::Xoshiro256Plus;

/// Seed used when the configuration does not provide one
const DEFAULT_SEED: u64 = 12345;

/// Facade which makes the rand crate look like RanfGenerator
#[derive(Clone)]
pub struct RandGenerator {
    rng: Engine,
}
//
impl RandGenerator {
    /// Spawn a new random number generator with the default seed
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Spawn a new random number generator from a user-provided seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Engine::seed_from_u64(seed),
        }
    }

    /// Generate a random floating-point number between 0 and 1
    pub fn random(&mut self) -> Float {
        self.rng.gen()
    }
}
