//! Injected randomness for the flip rule.
//!
//! The engine never owns or seeds a random generator. Callers hand in a
//! [`RandomSource`] per move, which lets tests replay games exactly.

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::instrument;

/// Capability yielding a uniformly distributed integer in `[low, high)`.
pub trait RandomSource {
    /// Draws the next value in the half-open range `[low, high)`.
    ///
    /// Callers guarantee `low < high`.
    fn next_in_range(&mut self, low: u32, high: u32) -> u32;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        (**self).next_in_range(low, high)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        (**self).next_in_range(low, high)
    }
}

/// [`RandomSource`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wraps a random generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Standard generator seeded from operating system entropy.
    #[instrument]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Standard generator with a fixed seed, for reproducible runs.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        self.rng.random_range(low..high)
    }
}

/// Deterministic source cycling through a fixed sequence of values.
///
/// Values are clamped into the requested range. The number of draws is
/// recorded so tests can check when randomness was consulted.
#[derive(Debug, Clone)]
pub struct FixedRandom {
    values: Vec<u32>,
    draws: usize,
}

impl FixedRandom {
    /// Source that cycles through `values`; an empty list always yields `low`.
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, draws: 0 }
    }

    /// Source that always yields `value`.
    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for FixedRandom {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        let value = if self.values.is_empty() {
            low
        } else {
            self.values[self.draws % self.values.len()]
        };
        self.draws += 1;
        value.clamp(low, high.saturating_sub(1).max(low))
    }
}
