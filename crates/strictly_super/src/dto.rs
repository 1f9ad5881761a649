//! Serialized form of a game snapshot for a boundary layer.
//!
//! Besides the raw cells the DTO carries every derived flag, so a client
//! can render without re-running the rules. Converting back re-derives
//! those flags and refuses a DTO that disagrees with its own cells.

use crate::action::Move;
use crate::invariants::{
    HistoryConsistentInvariant, Invariant, InvariantSet, InvariantViolation, SuperInvariants,
};
use crate::state::GameStatus;
use crate::turn::ActiveBoard;
use crate::{GameId, GameState, Mark, MetaBoard, Player, Position, SubBoard};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// One sub-board as sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBoardDto {
    /// Cells in row-major order, `null` when empty.
    pub cells: [Option<Player>; 9],
    /// Winner of this sub-board.
    pub winner: Option<Player>,
    /// True if full without a winner.
    pub is_draw: bool,
}

impl From<&SubBoard> for SubBoardDto {
    fn from(board: &SubBoard) -> Self {
        Self {
            cells: (*board.cells()).map(Mark::player),
            winner: board.winner(),
            is_draw: board.is_draw(),
        }
    }
}

/// A game snapshot as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateDto {
    /// Opaque game identifier.
    pub id: GameId,
    /// The nine sub-boards in row-major order.
    pub boards: [SubBoardDto; 9],
    /// Player to move.
    pub current_player: Player,
    /// Forced sub-board, `null` for any open board.
    pub active_board: Option<usize>,
    /// Winner of the whole game.
    pub global_winner: Option<Player>,
    /// True if the whole game is drawn.
    pub is_global_draw: bool,
    /// Human-readable status line.
    pub status: String,
    /// Moves applied so far.
    #[serde(default)]
    pub moves: Vec<Move>,
}

impl GameStateDto {
    /// The 81 cells as a 9x9 grid in visual row/column order.
    pub fn grid_9x9(&self) -> [[Option<Player>; 9]; 9] {
        let mut grid = [[None; 9]; 9];
        for (row, line) in grid.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let board = (row / 3) * 3 + col / 3;
                let index = (row % 3) * 3 + col % 3;
                *cell = self.boards[board].cells[index];
            }
        }
        grid
    }

    /// Parses JSON and checks the result into a [`GameState`].
    ///
    /// # Errors
    ///
    /// [`DtoError::Json`] for malformed input, otherwise see
    /// [`GameState::try_from`].
    #[instrument(skip(json), fields(len = json.len()))]
    pub fn parse_state(json: &str) -> Result<GameState, DtoError> {
        let dto: GameStateDto = serde_json::from_str(json)?;
        GameState::try_from(dto)
    }
}

impl From<GameState> for GameStateDto {
    fn from(state: GameState) -> Self {
        Self::from(&state)
    }
}

impl From<&GameState> for GameStateDto {
    fn from(state: &GameState) -> Self {
        let meta = state.meta_board();
        Self {
            id: state.id(),
            boards: meta.boards().each_ref().map(SubBoardDto::from),
            current_player: state.current_player(),
            active_board: state.active_board().board().map(Position::to_index),
            global_winner: meta.meta_winner(),
            is_global_draw: meta.is_global_draw(),
            status: state.status_text(),
            moves: state.history().to_vec(),
        }
    }
}

/// A serialized snapshot that does not describe a reachable state.
#[derive(Debug, Display, Error, From)]
pub enum DtoError {
    /// The input was not valid JSON for a snapshot.
    #[display("Malformed game state: {_0}")]
    #[from]
    Json(serde_json::Error),

    /// A sub-board's winner/draw flags disagree with its cells.
    #[display("Sub-board {board} flags disagree with its cells")]
    SubBoardMismatch {
        /// Index of the offending sub-board.
        board: usize,
    },

    /// The global winner/draw flags disagree with the sub-boards.
    #[display("Global winner/draw flags disagree with the sub-boards")]
    MetaMismatch,

    /// The active board index is out of range.
    #[display("Active board {_0} must be in range [0, 8]")]
    InvalidActiveBoard(#[error(not(source))] usize),

    /// The status line disagrees with the derived status.
    #[display("Status {found:?} does not match derived {expected:?}")]
    StatusMismatch {
        /// Status text derived from the cells.
        expected: String,
        /// Status text received.
        found: String,
    },

    /// A recorded move is not on the board.
    #[display("Move history disagrees with the board")]
    HistoryMismatch,

    /// The snapshot is not one the rules can reach, e.g. the wrong player
    /// on turn or a forced sub-board that is closed.
    #[display("Unreachable game state: {_0}")]
    InvariantViolated(#[error(not(source))] InvariantViolation),
}

impl TryFrom<GameStateDto> for GameState {
    type Error = DtoError;

    #[instrument(skip(dto), fields(game_id = %dto.id))]
    fn try_from(dto: GameStateDto) -> Result<Self, Self::Error> {
        let mut boards = [SubBoard::new(); 9];
        for (index, (board, wire)) in boards.iter_mut().zip(dto.boards.iter()).enumerate() {
            *board = SubBoard::from_cells(wire.cells.map(Mark::from));
            if board.winner() != wire.winner || board.is_draw() != wire.is_draw {
                warn!(board = index, "Sub-board flags mismatch");
                return Err(DtoError::SubBoardMismatch { board: index });
            }
        }

        let meta_board = MetaBoard::from_boards(boards);
        if meta_board.meta_winner() != dto.global_winner
            || meta_board.is_global_draw() != dto.is_global_draw
        {
            warn!("Meta flags mismatch");
            return Err(DtoError::MetaMismatch);
        }

        let active_board = match dto.active_board {
            None => ActiveBoard::AnyOpen,
            Some(index) => Position::from_index(index)
                .map(ActiveBoard::Board)
                .ok_or(DtoError::InvalidActiveBoard(index))?,
        };

        let status = GameStatus::from(meta_board.status());
        let state = GameState::from_parts(
            dto.id,
            meta_board,
            dto.current_player,
            active_board,
            status,
            dto.moves,
        );

        let expected = state.status_text();
        if expected != dto.status {
            warn!(%expected, found = %dto.status, "Status text mismatch");
            return Err(DtoError::StatusMismatch {
                expected,
                found: dto.status,
            });
        }

        if !HistoryConsistentInvariant::holds(&state) {
            warn!("History mismatch");
            return Err(DtoError::HistoryMismatch);
        }

        if let Err(violations) = SuperInvariants::check_all(&state) {
            warn!(?violations, "Snapshot breaks game invariants");
            if let Some(first) = violations.into_iter().next() {
                return Err(DtoError::InvariantViolated(first));
            }
        }

        Ok(state)
    }
}

/// Request body for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct MoveRequest {
    /// Sub-board index (0-8).
    pub board_index: usize,
    /// Cell index within the sub-board (0-8).
    pub cell_index: usize,
}
