//! Random sources for action sampling.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Source of uniformly distributed indices.
pub trait RandomSource {
    /// Draw an index uniformly from `[0, n)`. `n` is never zero.
    fn uniform_index(&mut self, n: usize) -> usize;
}

/// PCG-backed random source.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Pcg64,
}

impl SeededRandom {
    /// A reproducible source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// A source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg64::from_entropy(),
        }
    }

    /// Seeded when a seed is given, from entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl RandomSource for SeededRandom {
    fn uniform_index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}

/// Replays a fixed sequence of choices, reduced modulo `n`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    choices: Vec<usize>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(choices: Vec<usize>) -> Self {
        Self { choices, cursor: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform_index(&mut self, n: usize) -> usize {
        if self.choices.is_empty() {
            return 0;
        }
        let choice = self.choices[self.cursor % self.choices.len()];
        self.cursor += 1;
        choice % n
    }
}
