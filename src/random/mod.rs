//! Random number generation module. Uses either a port of Knuth's ranf random
//! number generator or the "rand" crate that is the Rust standard for RNGs.
//!
//! Sampling operations never reach for a global generator: they receive the
//! random source explicitly, through the UniformSource trait below.

#[cfg(not(feature = "standard-random"))]
mod ranf;
#[cfg(feature = "standard-random")]
mod standard;

use crate::numeric::Float;

/// Select the RNG implementation in use
#[cfg(not(feature = "standard-random"))]
pub use self::ranf::RanfGenerator as RandomGenerator;
#[cfg(feature = "standard-random")]
pub use self::standard::RandGenerator as RandomGenerator;

/// Source of uniformly distributed random numbers in [0, 1)
pub trait UniformSource {
    /// Draw the next random number
    fn random(&mut self) -> Float;
}

impl UniformSource for RandomGenerator {
    fn random(&mut self) -> Float {
        RandomGenerator::random(self)
    }
}

impl<R: UniformSource + ?Sized> UniformSource for &mut R {
    fn random(&mut self) -> Float {
        (**self).random()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_in_unit_interval() {
        let mut rng = RandomGenerator::with_seed(42);
        for _ in 0..10_000 {
            let x = UniformSource::random(&mut rng);
            assert!((0. ..1.).contains(&x), "{x} is out of [0, 1)");
        }
    }

    #[test]
    fn seeding_is_reproducible() {
        let mut rng1 = RandomGenerator::with_seed(7);
        let mut rng2 = RandomGenerator::with_seed(7);
        let mut rng3 = RandomGenerator::with_seed(8);
        let seq1: Vec<Float> = (0..100).map(|_| rng1.random()).collect();
        let seq2: Vec<Float> = (0..100).map(|_| rng2.random()).collect();
        let seq3: Vec<Float> = (0..100).map(|_| rng3.random()).collect();
        assert_eq!(seq1, seq2);
        assert_ne!(seq1, seq3);
    }
}
