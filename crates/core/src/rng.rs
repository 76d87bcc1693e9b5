//! RNG module - the random source behind refills and shuffles
//!
//! The board only needs two primitives: a uniform index into the palette and
//! a uniform permutation of the cells. [`RandomSource`] is implemented for
//! every `rand` generator, so a session can run on `ChaCha8Rng` (seeded,
//! reproducible) or `ThreadRng`. [`ScriptedSource`] replays fixed draws for
//! tests that need to know exactly which colors fall in.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::types::Cell;

/// Source of randomness for a board
pub trait RandomSource {
    /// Uniform index in `[0, bound)`. `bound` is never zero.
    fn next_index(&mut self, bound: usize) -> usize;

    /// Uniformly permute `cells` in place
    fn shuffle_cells(&mut self, cells: &mut [Cell]);
}

impl<R: RngCore> RandomSource for R {
    fn next_index(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }

    fn shuffle_cells(&mut self, cells: &mut [Cell]) {
        cells.shuffle(self);
    }
}

/// Deterministic source that cycles through a fixed list of draws
///
/// Each draw is reduced modulo the requested bound. Shuffles run Fisher-Yates
/// over the same draw sequence, so they are scripted too.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: Vec<usize>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(draws: Vec<usize>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Always draws index 0
    pub fn zeros() -> Self {
        Self::new(vec![0])
    }

    /// Number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_index(&mut self, bound: usize) -> usize {
        if self.draws.is_empty() {
            return 0;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value % bound
    }

    fn shuffle_cells(&mut self, cells: &mut [Cell]) {
        for i in (1..cells.len()).rev() {
            let j = self.next_index(i + 1);
            cells.swap(i, j);
        }
    }
}
