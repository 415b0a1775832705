//! Flipside - unified CLI.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use flipside_server::{
    GameService, GameStore, InMemoryGameStore, Settings, SqliteGameStore, StorageBackend,
    run_local_game,
};
use flipside_tictactoe::{BoardConfig, RandomSource, RngSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            database_url,
            memory,
        } => run_server(config, host, port, database_url, memory).await,
        Command::Play {
            config,
            board_size,
            win_length,
            seed,
        } => run_play(config, board_size, win_length, seed),
        Command::CheckConfig { config } => check_config(config),
    }
}

fn random_source(seed: Option<u64>) -> Box<dyn RandomSource + Send> {
    match seed {
        Some(seed) => {
            info!(seed, "Using seeded random source");
            Box::new(RngSource::seeded(seed))
        }
        None => Box::new(RngSource::from_entropy()),
    }
}

/// Run the HTTP game server
#[instrument]
async fn run_server(
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    database_url: Option<String>,
    memory: bool,
) -> Result<()> {
    let settings = Settings::load(config.as_deref())?;

    let mut server = settings.server().clone();
    if let Some(host) = host {
        server = server.with_host(host);
    }
    if let Some(port) = port {
        server = server.with_port(port);
    }
    let mut storage = settings.storage().clone();
    if let Some(database_url) = database_url {
        storage = storage.with_database_url(database_url);
    }
    if memory {
        storage = storage.with_backend(StorageBackend::Memory);
    }

    let store: Arc<dyn GameStore> = match storage.backend() {
        StorageBackend::Sqlite => Arc::new(SqliteGameStore::open(storage.database_url())?),
        StorageBackend::Memory => Arc::new(InMemoryGameStore::new()),
    };
    let service = GameService::from_settings(
        store,
        settings.game(),
        random_source(*settings.random().seed()),
    )?;
    let app = flipside_server::router(Arc::new(service));

    let addr = format!("{}:{}", server.host(), server.port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, backend = ?storage.backend(), "Flipside server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested");
        })
        .await?;
    Ok(())
}

/// Run a local hot-seat game
#[instrument]
fn run_play(
    config: Option<PathBuf>,
    board_size: Option<usize>,
    win_length: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let settings = Settings::load(config.as_deref())?;
    let game = settings.game();
    let board = BoardConfig::new(
        board_size.unwrap_or(*game.board_size()),
        win_length.unwrap_or(*game.win_length()),
    )?;
    let policy = game.flip_policy()?;
    let mut random = random_source(seed.or(*settings.random().seed()));

    let stdin = std::io::stdin();
    run_local_game(stdin.lock(), std::io::stdout(), board, policy, &mut random)?;
    Ok(())
}

/// Validate settings and print them as TOML
#[instrument]
fn check_config(config: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load(config.as_deref())?;
    let rendered = toml::to_string_pretty(&settings).context("Failed to render settings")?;
    println!("{}", rendered);
    info!("Settings are valid");
    Ok(())
}
