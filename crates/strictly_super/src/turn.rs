//! Turn controller: who moves next and where.

use crate::{MetaBoard, Player, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Constraint on which sub-board the player on turn may play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActiveBoard {
    /// Any currently open sub-board.
    #[default]
    AnyOpen,
    /// Exactly this sub-board.
    Board(Position),
}

impl ActiveBoard {
    /// The forced sub-board, `None` for [`ActiveBoard::AnyOpen`].
    pub fn board(self) -> Option<Position> {
        match self {
            ActiveBoard::AnyOpen => None,
            ActiveBoard::Board(board) => Some(board),
        }
    }
}

impl From<Option<Position>> for ActiveBoard {
    fn from(board: Option<Position>) -> Self {
        board.map_or(ActiveBoard::AnyOpen, ActiveBoard::Board)
    }
}

impl std::fmt::Display for ActiveBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveBoard::AnyOpen => write!(f, "any open board"),
            ActiveBoard::Board(board) => write!(f, "board {}", board.to_index()),
        }
    }
}

/// Outcome of the turn controller for one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters, derive_new::new)]
pub struct Turn {
    /// Player to move next.
    next_player: Player,
    /// Where that player may move.
    next_active: ActiveBoard,
}

/// Computes the next player and active sub-board after a move.
///
/// The cell just played names the sub-board the opponent is sent to. If
/// that sub-board is already won or drawn, the opponent may pick any open
/// one. Players always alternate.
#[instrument(skip(meta), fields(cell = cell_played.to_index(), player = %player_moved))]
pub fn next_turn(meta: &MetaBoard, cell_played: Position, player_moved: Player) -> Turn {
    let next_active = if meta.sub_board(cell_played).is_open() {
        ActiveBoard::Board(cell_played)
    } else {
        ActiveBoard::AnyOpen
    };
    debug!(%next_active, "Next active board");
    Turn::new(player_moved.opponent(), next_active)
}
