//! First-class action types for super tic-tac-toe.
//!
//! Moves are domain events, not side effects. They represent
//! the player's intent and can be validated independently of execution.

use crate::turn::ActiveBoard;
use crate::{Player, Position};
use serde::{Deserialize, Serialize};

/// A move: a player placing their mark in one cell of one sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// The sub-board played in.
    pub board: Position,
    /// The cell within that sub-board.
    pub cell: Position,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> board {} cell {}",
            self.player,
            self.board.to_index(),
            self.cell.to_index()
        )
    }
}

/// Reason a move was rejected.
///
/// Every variant is recoverable: the game state the move was checked
/// against is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The game already has a winner or is drawn.
    #[display("Game is already over")]
    GameAlreadyOver,

    /// The acting player is not the one on turn.
    #[display("It's not {actual}'s turn, waiting for {expected}")]
    NotYourTurn {
        /// Player on turn.
        expected: Player,
        /// Player that tried to move.
        actual: Player,
    },

    /// The requested sub-board may not be played right now.
    #[display("Board {requested} is not playable: must play in {active}")]
    IllegalBoardChoice {
        /// Sub-board index that was requested.
        requested: usize,
        /// Constraint in force.
        active: ActiveBoard,
    },

    /// The sub-board is already won or drawn.
    #[display("Board {} is already closed", _0.to_index())]
    BoardAlreadyClosed(#[error(not(source))] Position),

    /// The target cell already holds a mark.
    #[display("Cell already occupied: board {} cell {}", board.to_index(), cell.to_index())]
    CellOccupied {
        /// Sub-board of the target cell.
        board: Position,
        /// The occupied cell.
        cell: Position,
    },

    /// The cell index is outside 0-8.
    #[display("Cell index {_0} must be in range [0, 8]")]
    InvalidCellIndex(#[error(not(source))] usize),
}
