//! Game service: creation, lookup, and move application over a [`GameStore`].

use crate::config::{ConfigError, GameSettings};
use crate::store::{GameStore, StoreError};
use crate::view;
use derive_getters::Getters;
use derive_more::{Display, From};
use derive_new::new;
use flipside_tictactoe::{
    BoardConfig, ErrorCategory, FlipPolicy, Game, GameError, Move, MoveOutcome, Player,
    RandomSource, UnknownSymbol,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Optional overrides for a new game. Missing fields use the configured
/// defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct CreateGameRequest {
    /// Board side length.
    #[serde(default)]
    pub board_size: Option<usize>,
    /// Run length needed to win.
    #[serde(default)]
    pub win_length: Option<usize>,
}

/// A move submitted against a stored game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct MakeMoveRequest {
    /// Target game.
    pub game_id: Uuid,
    /// Zero-based row.
    #[serde(alias = "x")]
    pub row: i64,
    /// Zero-based column.
    #[serde(alias = "y")]
    pub col: i64,
    /// Player symbol, `x` or `o` in either case.
    pub symbol: char,
}

/// Result of a successful move.
#[derive(Debug, Clone, Getters)]
pub struct AppliedMove {
    /// The game after the move.
    game: Game,
    /// Where the mark landed and whether it flipped.
    outcome: MoveOutcome,
}

/// Service-level failure.
#[derive(Debug, Clone, Display, From)]
pub enum ServiceError {
    /// No game has this id.
    #[display("Game not found.")]
    #[from(ignore)]
    GameNotFound {
        /// Requested id.
        id: Uuid,
    },

    /// The move's symbol is neither `x` nor `o`.
    #[display("{}", _0)]
    SymbolNotRecognized(UnknownSymbol),

    /// The engine rejected the request.
    #[display("{}", _0)]
    Game(GameError),

    /// Storage failed or a concurrent writer won.
    #[display("{}", _0)]
    Store(StoreError),

    /// `If-Match` named a stale version.
    #[display("Game {} has changed (current tag {})", id, current)]
    #[from(ignore)]
    PreconditionFailed {
        /// Game id.
        id: Uuid,
        /// Current entity tag.
        current: String,
    },
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SymbolNotRecognized(e) => Some(e),
            Self::Game(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::GameNotFound { .. } | Self::PreconditionFailed { .. } => None,
        }
    }
}

impl ServiceError {
    /// Stable category for transport mapping.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::GameNotFound { .. } => ErrorCategory::NotFound,
            Self::SymbolNotRecognized(_) => ErrorCategory::RuleViolation,
            Self::Game(e) => e.category(),
            Self::Store(StoreError::Conflict { .. }) | Self::PreconditionFailed { .. } => {
                ErrorCategory::Conflict
            }
            Self::Store(StoreError::Missing { .. }) => ErrorCategory::NotFound,
            Self::Store(_) => ErrorCategory::Internal,
        }
    }
}

/// Coordinates games between callers and a [`GameStore`].
///
/// The flip policy and random source are shared by every game the service
/// touches, so a seeded source replays a whole session.
pub struct GameService {
    store: Arc<dyn GameStore>,
    defaults: BoardConfig,
    policy: FlipPolicy,
    random: Mutex<Box<dyn RandomSource + Send>>,
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("defaults", &self.defaults)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl GameService {
    /// Creates a service over `store`.
    #[instrument(skip(store, random))]
    pub fn new(
        store: Arc<dyn GameStore>,
        defaults: BoardConfig,
        policy: FlipPolicy,
        random: Box<dyn RandomSource + Send>,
    ) -> Self {
        info!("Creating GameService");
        Self {
            store,
            defaults,
            policy,
            random: Mutex::new(random),
        }
    }

    /// Creates a service from validated game settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the settings are out of bounds.
    #[instrument(skip(store, random))]
    pub fn from_settings(
        store: Arc<dyn GameStore>,
        settings: &GameSettings,
        random: Box<dyn RandomSource + Send>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            store,
            settings.board_config()?,
            settings.flip_policy()?,
            random,
        ))
    }

    /// Default dimensions for new games.
    pub fn defaults(&self) -> BoardConfig {
        self.defaults
    }

    /// Creates and stores a new game.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Game`] if the requested dimensions are invalid,
    /// [`ServiceError::Store`] if the game cannot be stored.
    #[instrument(skip(self))]
    pub fn create_game(&self, request: CreateGameRequest) -> Result<Game, ServiceError> {
        let board_size = request.board_size.unwrap_or(self.defaults.board_size());
        let win_length = request.win_length.unwrap_or(self.defaults.win_length());
        let game = Game::create(board_size, win_length)?;

        self.store.create(&game)?;
        info!(game_id = %game.id(), board_size, win_length, "Game stored");
        Ok(game)
    }

    /// Loads a game by id.
    ///
    /// # Errors
    ///
    /// [`ServiceError::GameNotFound`] if no game has this id.
    #[instrument(skip(self))]
    pub fn find_game(&self, id: Uuid) -> Result<Game, ServiceError> {
        self.store.find(id)?.ok_or_else(|| {
            debug!("Game not found");
            ServiceError::GameNotFound { id }
        })
    }

    /// Applies a move and persists the result.
    ///
    /// The symbol is parsed before the game is loaded. When `if_match` is
    /// given it must match the game's current entity tag. The write is a
    /// compare-and-swap on the move count, so concurrent moves on the same
    /// game cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ServiceError`]; nothing is stored on error.
    #[instrument(skip(self), fields(game_id = %request.game_id))]
    pub fn make_move(
        &self,
        request: MakeMoveRequest,
        if_match: Option<&str>,
    ) -> Result<AppliedMove, ServiceError> {
        let player = Player::from_symbol(request.symbol)?;
        let mut game = self.find_game(request.game_id)?;

        if let Some(header) = if_match
            && !view::if_match_satisfied(header, &game)
        {
            warn!(if_match = header, "Stale If-Match");
            return Err(ServiceError::PreconditionFailed {
                id: game.id(),
                current: view::etag(&game),
            });
        }

        let mv = Move::new(player, request.row, request.col);
        let outcome = {
            let mut random = self.random.lock().unwrap_or_else(PoisonError::into_inner);
            game.make_move_with_policy(mv, &self.policy, &mut **random)?
        };

        self.store.update(&game)?;
        debug!(moves = game.moves_applied(), flipped = outcome.flipped, "Move stored");
        Ok(AppliedMove { game, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryGameStore;
    use flipside_tictactoe::{FixedRandom, GameStatus, Square};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn service(random: FixedRandom) -> GameService {
        GameService::new(
            Arc::new(InMemoryGameStore::new()),
            BoardConfig::default(),
            FlipPolicy::default(),
            Box::new(random),
        )
    }

    /// Store where another writer lands a move at (2, 2) right after the
    /// next read, so the reader holds a stale copy.
    #[derive(Default)]
    struct RacingStore {
        inner: InMemoryGameStore,
        armed: AtomicBool,
    }

    impl GameStore for RacingStore {
        fn create(&self, game: &Game) -> Result<(), StoreError> {
            self.inner.create(game)
        }

        fn find(&self, id: Uuid) -> Result<Option<Game>, StoreError> {
            let found = self.inner.find(id)?;
            if let Some(game) = &found
                && self.armed.swap(false, Ordering::SeqCst)
            {
                let mut rival = game.clone();
                rival
                    .make_move(
                        Move::new(rival.current_turn(), 2, 2),
                        &mut FixedRandom::constant(1),
                    )
                    .expect("rival move");
                self.inner.update(&rival)?;
            }
            Ok(found)
        }

        fn update(&self, game: &Game) -> Result<(), StoreError> {
            self.inner.update(game)
        }
    }

    #[test]
    fn test_concurrent_writer_conflicts() {
        let store = Arc::new(RacingStore::default());
        let service = GameService::new(
            store.clone(),
            BoardConfig::default(),
            FlipPolicy::default(),
            Box::new(FixedRandom::constant(1)),
        );
        let game = service
            .create_game(CreateGameRequest::default())
            .expect("created");

        store.armed.store(true, Ordering::SeqCst);
        let err = service
            .make_move(MakeMoveRequest::new(game.id(), 0, 0, 'X'), None)
            .expect_err("lost the race");
        assert!(matches!(err, ServiceError::Store(StoreError::Conflict { .. })));
        assert_eq!(err.category(), ErrorCategory::Conflict);

        let stored = service.find_game(game.id()).expect("stored");
        assert_eq!(stored.moves_applied(), 1);
        assert_eq!(stored.board().get(2, 2), Some(Square::Occupied(Player::X)));
        assert_eq!(stored.board().get(0, 0), Some(Square::Empty));
    }

    #[test]
    fn test_create_uses_defaults_and_overrides() {
        let service = service(FixedRandom::constant(1));

        let game = service
            .create_game(CreateGameRequest::default())
            .expect("created");
        assert_eq!(game.config().board_size(), 3);

        let game = service
            .create_game(CreateGameRequest::new(Some(6), Some(4)))
            .expect("created");
        assert_eq!(game.config().board_size(), 6);
        assert_eq!(game.config().win_length(), 4);
        assert_eq!(service.find_game(game.id()).expect("stored"), game);
    }

    #[test]
    fn test_create_rejects_invalid_dimensions() {
        let service = service(FixedRandom::constant(1));
        let err = service
            .create_game(CreateGameRequest::new(Some(3), Some(5)))
            .expect_err("invalid");
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_unknown_game() {
        let service = service(FixedRandom::constant(1));
        let err = service.find_game(Uuid::now_v7()).expect_err("missing");
        assert_eq!(err.to_string(), "Game not found.");
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_symbol_checked_before_lookup() {
        let service = service(FixedRandom::constant(1));
        let err = service
            .make_move(MakeMoveRequest::new(Uuid::now_v7(), 0, 0, 'z'), None)
            .expect_err("bad symbol");
        assert!(matches!(err, ServiceError::SymbolNotRecognized(_)));
    }

    #[test]
    fn test_move_is_persisted() {
        let service = service(FixedRandom::constant(1));
        let game = service
            .create_game(CreateGameRequest::default())
            .expect("created");

        let applied = service
            .make_move(MakeMoveRequest::new(game.id(), 1, 1, 'x'), None)
            .expect("legal");
        assert_eq!(applied.game().moves_applied(), 1);
        assert!(!applied.outcome().flipped);

        let stored = service.find_game(game.id()).expect("stored");
        assert_eq!(stored.board().get(1, 1), Some(Square::Occupied(Player::X)));
        assert_eq!(stored.current_turn(), Player::O);
    }

    #[test]
    fn test_rule_violation_leaves_store_untouched() {
        let service = service(FixedRandom::constant(1));
        let game = service
            .create_game(CreateGameRequest::default())
            .expect("created");

        let err = service
            .make_move(MakeMoveRequest::new(game.id(), 0, 0, 'O'), None)
            .expect_err("wrong turn");
        assert_eq!(err.to_string(), "X has turn now");
        assert_eq!(err.category(), ErrorCategory::RuleViolation);
        assert_eq!(service.find_game(game.id()).expect("stored"), game);
    }

    #[test]
    fn test_stale_if_match_rejected() {
        let service = service(FixedRandom::constant(1));
        let game = service
            .create_game(CreateGameRequest::default())
            .expect("created");
        let tag = view::etag(&game);

        service
            .make_move(MakeMoveRequest::new(game.id(), 0, 0, 'X'), Some(&tag))
            .expect("fresh tag");
        let err = service
            .make_move(MakeMoveRequest::new(game.id(), 1, 1, 'O'), Some(&tag))
            .expect_err("stale tag");
        assert!(matches!(err, ServiceError::PreconditionFailed { .. }));
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_injected_source_drives_flips() {
        let service = service(FixedRandom::constant(0));
        let game = service
            .create_game(CreateGameRequest::default())
            .expect("created");

        for (row, col, symbol) in [(0, 0, 'X'), (1, 1, 'O')] {
            service
                .make_move(MakeMoveRequest::new(game.id(), row, col, symbol), None)
                .expect("legal");
        }
        let applied = service
            .make_move(MakeMoveRequest::new(game.id(), 2, 2, 'X'), None)
            .expect("legal");

        assert!(applied.outcome().flipped);
        assert_eq!(
            applied.game().board().get(2, 2),
            Some(Square::Occupied(Player::O))
        );
        assert_eq!(applied.game().status(), GameStatus::InProgress);
    }
}
