//! Tests for the SQLite game store.

use diesel::{Connection, RunQueryDsl, SqliteConnection};
use flipside_server::{GameStore, SqliteGameStore, StoreError};
use flipside_tictactoe::{FixedRandom, Game, Move, Player, Square};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Opens a store on a fresh temporary file. The file handle must stay in
/// scope to keep the database alive.
fn setup_test_db() -> (NamedTempFile, SqliteGameStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteGameStore::open(db_path).expect("Failed to open store");
    (db_file, store)
}

fn never_flip() -> FixedRandom {
    FixedRandom::constant(8)
}

#[test]
fn test_create_and_find() {
    let (_db, store) = setup_test_db();
    let game = Game::create(5, 4).expect("valid config");
    store.create(&game).expect("Create failed");

    let found = store
        .find(game.id())
        .expect("Query failed")
        .expect("Game missing");
    assert_eq!(found, game);
}

#[test]
fn test_find_unknown_is_none() {
    let (_db, store) = setup_test_db();
    assert!(store.find(Uuid::now_v7()).expect("Query failed").is_none());
}

#[test]
fn test_duplicate_create_fails() {
    let (_db, store) = setup_test_db();
    let game = Game::create(3, 3).expect("valid config");
    store.create(&game).expect("First create failed");
    assert!(matches!(
        store.create(&game),
        Err(StoreError::Duplicate { .. })
    ));
}

#[test]
fn test_update_persists_moves_and_outcome() {
    let (_db, store) = setup_test_db();
    let mut game = Game::create(3, 3).expect("valid config");
    store.create(&game).expect("Create failed");

    let mut random = never_flip();
    for (player, row, col) in [
        (Player::X, 0, 0),
        (Player::O, 1, 0),
        (Player::X, 1, 1),
        (Player::O, 2, 0),
        (Player::X, 2, 2),
    ] {
        game.make_move(Move::new(player, row, col), &mut random)
            .expect("legal move");
        store.update(&game).expect("Update failed");
    }

    let found = store
        .find(game.id())
        .expect("Query failed")
        .expect("Game missing");
    assert_eq!(found, game);
    assert_eq!(found.winner(), Some(Player::X));
    assert_eq!(found.turn(), None);
    assert_eq!(found.board().get(2, 2), Some(Square::Occupied(Player::X)));
}

#[test]
fn test_concurrent_updates_conflict() {
    let (_db, store) = setup_test_db();
    let game = Game::create(3, 3).expect("valid config");
    store.create(&game).expect("Create failed");

    let mut random = never_flip();
    let mut first = game.clone();
    first
        .make_move(Move::new(Player::X, 0, 0), &mut random)
        .expect("legal move");
    let mut second = game.clone();
    second
        .make_move(Move::new(Player::X, 2, 2), &mut random)
        .expect("legal move");

    store.update(&first).expect("First update failed");
    assert!(matches!(
        store.update(&second),
        Err(StoreError::Conflict { .. })
    ));

    let found = store
        .find(game.id())
        .expect("Query failed")
        .expect("Game missing");
    assert_eq!(found.board().get(2, 2), Some(Square::Empty));
}

#[test]
fn test_update_of_unknown_game_is_missing() {
    let (_db, store) = setup_test_db();
    let mut game = Game::create(3, 3).expect("valid config");
    game.make_move(Move::new(Player::X, 0, 0), &mut never_flip())
        .expect("legal move");
    assert!(matches!(
        store.update(&game),
        Err(StoreError::Missing { .. })
    ));
}

#[test]
fn test_corrupt_row_is_reported() {
    let (db, store) = setup_test_db();
    let id = Uuid::now_v7();

    let mut conn =
        SqliteConnection::establish(db.path().to_str().expect("Invalid path")).expect("connect");
    diesel::sql_query(format!(
        "INSERT INTO games (id, board_size, win_length, cells, current_turn, moves_applied, \
         status, winner, created_at, modified_at) VALUES ('{id}', 3, 3, 'XXXXXXXXX', 'O', 9, \
         'in_progress', NULL, '2025-01-01 00:00:00', '2025-01-01 00:00:00')"
    ))
    .execute(&mut conn)
    .expect("raw insert");

    assert!(matches!(
        store.find(id),
        Err(StoreError::CorruptRecord { .. })
    ));
}

#[test]
fn test_reopen_keeps_games() {
    let (db, store) = setup_test_db();
    let game = Game::create(4, 3).expect("valid config");
    store.create(&game).expect("Create failed");

    let reopened = SqliteGameStore::open(store.db_path()).expect("reopen");
    assert_eq!(reopened.db_path(), db.path().to_str().expect("Invalid path"));
    assert_eq!(
        reopened.find(game.id()).expect("Query failed"),
        Some(game)
    );
}
