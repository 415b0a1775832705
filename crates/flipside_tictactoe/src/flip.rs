//! Randomized flip rule.
//!
//! On every `period`-th move (1-based, never the first) one sample is
//! drawn from `[0, odds)`; a zero inverts the mark being placed.

use super::error::{ConfigBound, GameError};
use super::random::RandomSource;
use serde::Serialize;
use tracing::{debug, instrument};

/// Default number of moves per flip opportunity.
pub const DEFAULT_FLIP_PERIOD: usize = 3;

/// Default sample range; one in this many eligible moves flips.
pub const DEFAULT_FLIP_ODDS: u32 = 10;

/// Decides whether a placed mark is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlipPolicy {
    period: usize,
    odds: u32,
}

impl FlipPolicy {
    /// Creates a policy flipping with probability `1 / odds` on every
    /// `period`-th move.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] if either value is zero.
    #[instrument]
    pub fn new(period: usize, odds: u32) -> Result<Self, GameError> {
        if period == 0 {
            return Err(ConfigBound::FlipPeriodZero.into());
        }
        if odds == 0 {
            return Err(ConfigBound::FlipOddsZero.into());
        }
        Ok(Self { period, odds })
    }

    /// Moves per flip opportunity.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Size of the sample range.
    pub fn odds(&self) -> u32 {
        self.odds
    }

    /// Checks whether the move played after `moves_applied` earlier moves
    /// may flip.
    pub fn is_eligible(&self, moves_applied: usize) -> bool {
        moves_applied > 0 && (moves_applied + 1) % self.period == 0
    }

    /// Decides whether to flip the next mark.
    ///
    /// Randomness is consulted only on eligible moves.
    #[instrument(skip(self, random))]
    pub fn should_flip(&self, moves_applied: usize, random: &mut dyn RandomSource) -> bool {
        if !self.is_eligible(moves_applied) {
            return false;
        }
        let sample = random.next_in_range(0, self.odds);
        debug!(sample, odds = self.odds, "Flip sample drawn");
        sample == 0
    }
}

impl Default for FlipPolicy {
    fn default() -> Self {
        Self {
            period: DEFAULT_FLIP_PERIOD,
            odds: DEFAULT_FLIP_ODDS,
        }
    }
}
