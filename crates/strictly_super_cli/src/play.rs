//! Interactive game loop over any line-based input.

use crate::config::CliConfig;
use anyhow::{Context, Result};
use derive_more::{Display, Error};
use std::io::{BufRead, Write};
use strictly_super::{GameSession, GameState, GameStateDto, Position};
use tracing::{debug, info, instrument, warn};

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Place a mark for the player on turn.
    Move {
        /// Sub-board to play in.
        board: Position,
        /// Cell within the sub-board.
        cell: Position,
    },
    /// List the legal moves.
    Moves,
    /// Start over with a fresh game.
    Reset,
    /// Print the current state as JSON.
    Json,
    /// Print the command summary.
    Help,
    /// Leave the game.
    Quit,
}

/// A line that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum InputError {
    /// Unrecognized command word(s).
    #[display("Unknown command {_0:?}, type help")]
    Unknown(#[error(not(source))] String),
    /// A board or cell that names no position.
    #[display("{_0:?} is not a position: use 0-8 or a label like top-left")]
    BadPosition(#[error(not(source))] String),
}

impl Input {
    /// Parses a line of input.
    ///
    /// A move is two tokens, board then cell, each a number or a label
    /// such as `center` or `top-left`.
    pub fn parse(line: &str) -> Result<Input, InputError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [word] => match word.to_lowercase().as_str() {
                "moves" | "m" => Ok(Input::Moves),
                "reset" => Ok(Input::Reset),
                "json" => Ok(Input::Json),
                "help" | "?" => Ok(Input::Help),
                "quit" | "q" | "exit" => Ok(Input::Quit),
                _ => Err(InputError::Unknown(line.trim().to_string())),
            },
            [board, cell] => Ok(Input::Move {
                board: parse_position(board)?,
                cell: parse_position(cell)?,
            }),
            _ => Err(InputError::Unknown(line.trim().to_string())),
        }
    }
}

fn parse_position(token: &str) -> Result<Position, InputError> {
    Position::from_label_or_number(token).ok_or_else(|| InputError::BadPosition(token.to_string()))
}

const HELP: &str = "\
Commands:
  <board> <cell>  place a mark (0-8 or labels, e.g. `4 0` or `center top-left`)
  moves           list legal moves
  reset           start a new game
  json            print the game state as JSON
  quit            leave";

/// Drives one session from `input`, writing everything to `output`.
pub struct Repl<'a> {
    session: GameSession,
    config: &'a CliConfig,
}

impl<'a> Repl<'a> {
    /// Creates a loop around a fresh game.
    pub fn new(config: &'a CliConfig) -> Self {
        Self {
            session: GameSession::starting_with(*config.starting_player()),
            config,
        }
    }

    /// The game being played.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Reads commands until `quit` or end of input.
    #[instrument(skip_all, fields(game_id = %self.session.state().id()))]
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<()> {
        info!("Starting interactive game");
        writeln!(output, "{HELP}\n")?;
        self.show(output)?;

        for line in input.lines() {
            let line = line.context("Failed to read input")?;
            if line.trim().is_empty() {
                continue;
            }
            match Input::parse(&line) {
                Ok(Input::Quit) => break,
                Ok(command) => self.handle(command, output)?,
                Err(e) => writeln!(output, "{e}")?,
            }
            write!(output, "> ")?;
            output.flush()?;
        }

        info!(moves = self.session().state().history().len(), "Leaving interactive game");
        Ok(())
    }

    fn handle<W: Write>(&mut self, command: Input, output: &mut W) -> Result<()> {
        debug!(?command, "Handling command");
        match command {
            Input::Move { board, cell } => {
                let player = self.session.state().current_player();
                match self.session.apply_move(board.to_index(), cell.to_index(), player) {
                    Ok(_) => self.show(output)?,
                    Err(e) => {
                        warn!(error = %e, "Illegal move entered");
                        writeln!(output, "Illegal move: {e}")?;
                    }
                }
            }
            Input::Moves => writeln!(output, "{}", legal_moves_line(self.session.state()))?,
            Input::Reset => {
                self.session.reset();
                self.show(output)?;
            }
            Input::Json => {
                let dto = GameStateDto::from(self.session.state());
                writeln!(output, "{}", serde_json::to_string_pretty(&dto)?)?;
            }
            Input::Help => writeln!(output, "{HELP}")?,
            Input::Quit => {}
        }
        Ok(())
    }

    fn show<W: Write>(&self, output: &mut W) -> Result<()> {
        let state = self.session.state();
        write!(output, "{}", state.meta_board().render())?;
        writeln!(output, "{}", state.status_text())?;
        if state.is_terminal() {
            writeln!(output, "Game over. Type reset to play again or quit to leave.")?;
        } else if *self.config.show_legal_moves() {
            writeln!(output, "{}", legal_moves_line(state))?;
        }
        Ok(())
    }
}

/// Legal moves as `board:cell` pairs.
fn legal_moves_line(state: &GameState) -> String {
    let moves = state.legal_moves();
    if moves.is_empty() {
        return "No legal moves".to_string();
    }
    let pairs: Vec<String> = moves
        .iter()
        .map(|m| format!("{}:{}", m.board.to_index(), m.cell.to_index()))
        .collect();
    format!("Legal moves: {}", pairs.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use strictly_super::{ActiveBoard, Player};

    fn run<'a>(config: &'a CliConfig, script: &str) -> (Repl<'a>, String) {
        let mut repl = Repl::new(config);
        let mut out = Vec::new();
        repl.run(Cursor::new(script.to_string()), &mut out).unwrap();
        (repl, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_numbers_and_labels() {
        assert_eq!(
            Input::parse("4 0").unwrap(),
            Input::Move {
                board: Position::Center,
                cell: Position::TopLeft
            }
        );
        assert_eq!(
            Input::parse("  center  Bottom-right ").unwrap(),
            Input::Move {
                board: Position::Center,
                cell: Position::BottomRight
            }
        );
        assert_eq!(Input::parse("QUIT").unwrap(), Input::Quit);
        assert_eq!(Input::parse("moves").unwrap(), Input::Moves);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Input::parse("9 0"), Err(InputError::BadPosition("9".to_string())));
        assert!(matches!(Input::parse("dance"), Err(InputError::Unknown(_))));
        assert!(matches!(Input::parse("1 2 3"), Err(InputError::Unknown(_))));
    }

    #[test]
    fn test_moves_are_played_by_player_on_turn() {
        let config = CliConfig::default();
        let (repl, out) = run(&config, "0 4\n4 0\nquit\n");
        let state = repl.session().state();
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.current_player(), Player::X);
        assert_eq!(state.active_board(), ActiveBoard::Board(Position::TopLeft));
        assert!(out.contains("O's turn, board 4"));
        assert!(out.contains("X's turn, board 0"));
    }

    #[test]
    fn test_illegal_move_is_reported_not_fatal() {
        let config = CliConfig::default();
        let (repl, out) = run(&config, "0 4\n0 0\n4 4\n");
        assert!(out.contains("Illegal move: Board 0 is not playable: must play in board 4"));
        assert_eq!(repl.session().state().history().len(), 2);
    }

    #[test]
    fn test_reset_and_json() {
        let config = CliConfig::default();
        let (repl, out) = run(&config, "4 4\nreset\njson\n");
        assert_eq!(repl.session().state().meta_board().mark_count(), 0);
        assert!(out.contains("\"current_player\": \"X\""));
        assert!(out.contains("\"active_board\": null"));
    }

    #[test]
    fn test_config_controls_first_player_and_hints() {
        let file: CliConfig =
            toml::from_str("starting_player = \"O\"\nshow_legal_moves = false\n").unwrap();
        let (repl, out) = run(&file, "quit\n");
        assert_eq!(repl.session().state().current_player(), Player::O);
        assert!(out.contains("O's turn, any board"));
        assert!(!out.contains("Legal moves:"));
    }
}
