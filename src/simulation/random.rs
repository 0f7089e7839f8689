//! Injectable randomness for the opponent model
//!
//! The opponent model is the only consumer of randomness in the simulator.
//! Production sessions use a ChaCha stream; tests script the exact draws.

use crate::core::error::{NetrError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// A source of uniform draws in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> Result<f64>;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> Result<f64> {
        (**self).next_unit()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> Result<f64> {
        (**self).next_unit()
    }
}

/// Deterministic ChaCha stream. The same seed replays the same session.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeded from OS entropy, for interactive play
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> Result<f64> {
        Ok(self.rng.gen::<f64>())
    }
}

/// Finite, pre-programmed draws for tests
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<f64>,
    drawn: usize,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            drawn: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> Result<f64> {
        let draw = self
            .draws
            .pop_front()
            .ok_or(NetrError::RandomSourceExhausted { drawn: self.drawn })?;
        self.drawn += 1;
        Ok(draw)
    }
}
