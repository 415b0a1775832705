//! First-class invariants for flipside games.
//!
//! Invariants are logical properties that must hold after every accepted
//! move. They are checked in debug builds after each transition and always
//! when a game is restored from storage.

use super::game::Game;
use super::rules;
use super::types::Player;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: the move counter equals the number of marks on the board.
///
/// Squares are never cleared, so every accepted move adds exactly one mark.
pub struct MovesMatchBoard;

impl Invariant<Game> for MovesMatchBoard {
    fn holds(game: &Game) -> bool {
        game.moves_applied() == game.board().occupied_count()
            && game.moves_applied() <= game.config().cell_count()
    }

    fn description() -> &'static str {
        "Moves applied must equal occupied squares and fit on the board"
    }
}

/// Invariant: the recorded outcome is what the rules say about the board.
pub struct OutcomeMatchesBoard;

impl Invariant<Game> for OutcomeMatchesBoard {
    fn holds(game: &Game) -> bool {
        game.status() == rules::evaluate(game.board(), game.config().win_length())
    }

    fn description() -> &'static str {
        "Game status must match the board's win/draw evaluation"
    }
}

/// Invariant: turns alternate strictly from X, whatever marks were flipped.
pub struct TurnAlternates;

impl Invariant<Game> for TurnAlternates {
    fn holds(game: &Game) -> bool {
        let expected = if game.moves_applied() % 2 == 0 {
            Player::X
        } else {
            Player::O
        };
        game.current_turn() == expected
    }

    fn description() -> &'static str {
        "Current turn must alternate X, O, X, ... by move count"
    }
}

/// All invariants of a game.
pub type GameInvariants = (MovesMatchBoard, OutcomeMatchesBoard, TurnAlternates);

/// Checks every game invariant, joining violations into one message.
pub fn check_game(game: &Game) -> Result<(), String> {
    GameInvariants::check_all(game).map_err(|violations| {
        violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    })
}
