//! Flipside game server.
//!
//! Wraps the [`flipside_tictactoe`] engine with storage, a service layer,
//! and an HTTP API.
//!
//! # Architecture
//!
//! - **Store**: [`GameStore`] with SQLite ([`SqliteGameStore`]) and in-memory
//!   ([`InMemoryGameStore`]) backends; updates are compare-and-swap on the
//!   move count
//! - **Service**: [`GameService`] creates games, loads them, and applies moves
//! - **API**: axum [`router`] exposing the service as JSON over HTTP
//! - **Config**: [`Settings`] loaded from TOML

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod config;
mod db;
mod play;
mod service;
mod store;
mod view;

pub use api::{ApiError, AppState, ErrorBody, router};
pub use config::{
    ConfigError, GameSettings, RandomSettings, ServerSettings, Settings, StorageBackend,
    StorageSettings,
};
pub use db::{DbError, DbErrorKind, GameRecord, SqliteGameStore};
pub use play::run_local_game;
pub use service::{AppliedMove, CreateGameRequest, GameService, MakeMoveRequest, ServiceError};
pub use store::{GameStore, InMemoryGameStore, StoreError};
pub use view::{DRAW, GameView, etag, if_match_satisfied};
