//! Local hot-seat game over a line-oriented terminal.

use flipside_tictactoe::{BoardConfig, FlipPolicy, Game, GameStatus, Move, RandomSource};
use std::io::{BufRead, Write};
use tracing::{debug, info, instrument};

/// Plays one game reading `row col` lines from `input`.
///
/// Each line is a zero-based row and column for the player to move.
/// `quit` ends the session early. Rejected moves are reported and the same
/// player is asked again.
///
/// # Errors
///
/// Returns I/O errors from `input` or `output`.
#[instrument(skip(input, output, random))]
pub fn run_local_game<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    config: BoardConfig,
    policy: FlipPolicy,
    random: &mut dyn RandomSource,
) -> std::io::Result<Game> {
    let mut game = Game::new(config);
    info!(game_id = %game.id(), "Local game started");
    writeln!(
        output,
        "{0}x{0} board, {1} in a row wins. Enter moves as `row col`, or `quit`.",
        config.board_size(),
        config.win_length()
    )?;

    let mut line = String::new();
    while let Some(player) = game.turn() {
        writeln!(output, "\n{}", game.board().display())?;
        write!(output, "{} to move: ", player)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 || line.trim().eq_ignore_ascii_case("quit") {
            debug!("Input closed");
            writeln!(output, "\nGame abandoned.")?;
            return Ok(game);
        }

        let Some((row, col)) = parse_coordinates(&line) else {
            writeln!(output, "Expected two numbers, e.g. `1 2`.")?;
            continue;
        };

        match game.make_move_with_policy(Move::new(player, row, col), &policy, random) {
            Ok(outcome) if outcome.flipped => {
                writeln!(output, "Flip! The mark landed as {}.", outcome.placed)?;
            }
            Ok(_) => {}
            Err(e) => writeln!(output, "{}", e)?,
        }
    }

    writeln!(output, "\n{}", game.board().display())?;
    match game.status() {
        GameStatus::Won(winner) => writeln!(output, "{} wins!", winner)?,
        GameStatus::Draw => writeln!(output, "Draw.")?,
        GameStatus::InProgress => {}
    }
    Ok(game)
}

fn parse_coordinates(line: &str) -> Option<(i64, i64)> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((row, col))
}
