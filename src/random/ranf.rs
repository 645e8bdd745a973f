//! Random number generation, from Knuth's ranf (in Seminumerical Algorithm)

use crate::numeric::Float;

// Generated random numbers will have a granularity of 1/MODULO
type Integer = i32;
const MODULO: Integer = 1_000_000_000;
const INV_MODULO: Float = 1e-9;

/// Seed used when the configuration does not provide one
const DEFAULT_SEED: Integer = 234612947;

/// Random number generator
#[derive(Clone)]
pub struct RanfGenerator {
    /// Current set of random numbers (the lagged Fibonacci state)
    numbers: [Integer; 56],

    /// Index of the next random number to be handed out, counting down
    index: usize,
}
//
impl RanfGenerator {
    // ### CONSTRUCTION ###

    /// Create a new generator with the default seed
    pub fn new() -> Self {
        Self::seeded_new(DEFAULT_SEED)
    }

    /// Create a new generator from a user-provided seed
    ///
    /// The ranf state is only well-defined for seeds in [0, MODULO), larger
    /// seeds are folded into that range.
    ///
    pub fn with_seed(seed: u64) -> Self {
        Self::seeded_new((seed % (MODULO as u64)) as Integer)
    }

    /// Run Knuth's IN55 initialization algorithm
    fn seeded_new(seed: Integer) -> Self {
        // Start by zero-initializing the generator state
        let mut result = RanfGenerator {
            numbers: [0; 56],
            index: 55,
        };

        // Spread the seed over the state
        result.numbers[55] = seed;
        let mut j = seed;
        let mut k = 1;
        for i in 1..55 {
            let ii = (21 * i) % 55;
            result.numbers[ii] = k;
            k = j - k;
            if k < 0 {
                k += MODULO
            };
            j = result.numbers[ii];
        }

        // Warm up the sequence a bit
        for _ in 0..10 {
            result.reset();
        }

        // Return the initialized generator
        result
    }

    // ### RANDOM NUMBER GENERATION ###

    /// Generate a random number between 0 and 1, with INV_MODULO granularity
    pub fn random(&mut self) -> Float {
        if self.index == 0 {
            self.reset();
            self.index = 55;
        }
        let result = (self.numbers[self.index] as Float) * INV_MODULO;
        self.index -= 1;
        result
    }

    /// Generate 55 new random numbers between 0 and MODULO
    fn reset(&mut self) {
        for i in 1..25 {
            self.numbers[i] -= self.numbers[i + 31];
            if self.numbers[i] < 0 {
                self.numbers[i] += MODULO
            };
        }
        for i in 25..56 {
            self.numbers[i] -= self.numbers[i - 24];
            if self.numbers[i] < 0 {
                self.numbers[i] += MODULO
            };
        }
    }
}
