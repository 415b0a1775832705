//! Command-line interface for flipside.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flipside - N×N tic-tac-toe where marks sometimes flip
#[derive(Parser, Debug)]
#[command(name = "flipside")]
#[command(about = "Tic-tac-toe server with a randomized flip rule", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database path (created if it doesn't exist)
        #[arg(long)]
        database_url: Option<String>,

        /// Keep games in memory instead of SQLite
        #[arg(long, conflicts_with = "database_url")]
        memory: bool,
    },

    /// Play a local two-player game in the terminal
    Play {
        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Board side length
        #[arg(long)]
        board_size: Option<usize>,

        /// Marks in a row needed to win
        #[arg(long)]
        win_length: Option<usize>,

        /// Seed for reproducible flips
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Validate a settings file and print the effective settings
    CheckConfig {
        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::parse_from(["flipside", "serve", "--port", "8080", "--memory"]);
        match cli.command {
            Command::Serve { port, memory, .. } => {
                assert_eq!(port, Some(8080));
                assert!(memory);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_memory_conflicts_with_database_url() {
        assert!(
            Cli::try_parse_from(["flipside", "serve", "--memory", "--database-url", "x.db"])
                .is_err()
        );
    }
}
