//! Flipside tic-tac-toe - pure game logic.
//!
//! An N×N board with a configurable run length needed to win, plus a
//! randomized rule that now and then inverts the mark being placed.
//!
//! # Architecture
//!
//! - **Game**: aggregate root; every transition goes through [`Game::make_move`]
//! - **Rules**: generalized win/draw detection over four scan directions
//! - **Flip**: [`FlipPolicy`] deciding when a placed mark is inverted
//! - **Random**: injected [`RandomSource`] so games replay deterministically
//!
//! # Example
//!
//! ```
//! use flipside_tictactoe::{FixedRandom, Game, Move, Player};
//!
//! let mut game = Game::create(3, 3)?;
//! let mut random = FixedRandom::constant(9);
//! game.make_move(Move::new(Player::X, 0, 0), &mut random)?;
//! assert_eq!(game.current_turn(), Player::O);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod config;
mod error;
mod flip;
mod game;
pub mod invariants;
mod random;
pub mod rules;
mod types;

pub use action::{Move, MoveOutcome};
pub use board::Board;
pub use config::{BoardConfig, MAX_BOARD_SIZE, MIN_BOARD_SIZE, MIN_WIN_LENGTH};
pub use error::{ConfigBound, ErrorCategory, GameError};
pub use flip::{DEFAULT_FLIP_ODDS, DEFAULT_FLIP_PERIOD, FlipPolicy};
pub use game::{Game, GameSnapshot, RestoreError};
pub use random::{FixedRandom, RandomSource, RngSource};
pub use types::{GameStatus, Player, Square, UnknownSymbol};
