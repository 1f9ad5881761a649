//! Immutable game snapshots.

use crate::action::{Move, MoveError};
use crate::board::BoardStatus;
use crate::turn::ActiveBoard;
use crate::{GameId, MetaBoard, Player, Position, validator};
use crate::dto::GameStateDto;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// A player won a meta line.
    Won(Player),
    /// Every sub-board closed without a meta line.
    Drawn,
}

impl GameStatus {
    /// Returns true once no further moves are accepted.
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }

    /// Returns the winner if there is one.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameStatus::Won(player) => Some(player),
            GameStatus::InProgress | GameStatus::Drawn => None,
        }
    }
}

impl From<BoardStatus> for GameStatus {
    fn from(status: BoardStatus) -> Self {
        match status {
            BoardStatus::Open => GameStatus::InProgress,
            BoardStatus::Won(player) => GameStatus::Won(player),
            BoardStatus::Drawn => GameStatus::Drawn,
        }
    }
}

/// Complete game state.
///
/// A snapshot is never modified after construction. Applying a move
/// produces a new snapshot and leaves this one as it was. Serde goes
/// through [`GameStateDto`], so deserializing checks the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameStateDto", into = "GameStateDto")]
pub struct GameState {
    id: GameId,
    meta_board: MetaBoard,
    current_player: Player,
    active_board: ActiveBoard,
    status: GameStatus,
    history: Vec<Move>,
}

impl GameState {
    /// Creates a new game: empty boards, X to move, any board playable.
    #[instrument]
    pub fn new() -> Self {
        Self::starting_with(Player::X)
    }

    /// Creates a new game where `first` makes the opening move.
    #[instrument]
    pub fn starting_with(first: Player) -> Self {
        let id = GameId::generate();
        debug!(%id, "New game");
        Self {
            id,
            meta_board: MetaBoard::new(),
            current_player: first,
            active_board: ActiveBoard::AnyOpen,
            status: GameStatus::InProgress,
            history: Vec::new(),
        }
    }

    /// Builds a snapshot from an arbitrary position.
    ///
    /// The status is derived from `meta_board`. The history is left empty,
    /// so this is meant for set-up positions rather than replays. A forced
    /// `active_board` that is already closed leaves no legal moves.
    #[instrument(skip(meta_board))]
    pub fn from_position(
        meta_board: MetaBoard,
        current_player: Player,
        active_board: ActiveBoard,
    ) -> Self {
        let status = GameStatus::from(meta_board.status());
        Self {
            id: GameId::generate(),
            meta_board,
            current_player,
            active_board,
            status,
            history: Vec::new(),
        }
    }

    /// Assembles a snapshot from already-checked parts.
    pub(crate) fn from_parts(
        id: GameId,
        meta_board: MetaBoard,
        current_player: Player,
        active_board: ActiveBoard,
        status: GameStatus,
        history: Vec<Move>,
    ) -> Self {
        Self {
            id,
            meta_board,
            current_player,
            active_board,
            status,
            history,
        }
    }

    /// Rebuilds a game by validating `moves` in order from a fresh start.
    ///
    /// The first mover is taken from the first move (X for an empty list).
    ///
    /// # Errors
    ///
    /// Returns the first [`MoveError`] encountered.
    #[instrument(skip(moves), fields(count = moves.len()))]
    pub fn replay(moves: &[Move]) -> Result<Self, MoveError> {
        let first = moves.first().map_or(Player::X, |m| m.player);
        moves.iter().try_fold(Self::starting_with(first), |state, mv| {
            validator::validate(&state, mv.board.to_index(), mv.cell.to_index(), mv.player)
        })
    }

    /// Validates and applies a move, returning the next snapshot.
    ///
    /// # Errors
    ///
    /// See [`validator::validate`].
    pub fn apply(
        &self,
        board_index: usize,
        cell_index: usize,
        player: Player,
    ) -> Result<Self, MoveError> {
        validator::validate(self, board_index, cell_index, player)
    }

    /// Returns the opaque game identifier.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Returns the meta-board.
    pub fn meta_board(&self) -> &MetaBoard {
        &self.meta_board
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the active sub-board constraint.
    pub fn active_board(&self) -> ActiveBoard {
        self.active_board
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns true once the game is won or drawn.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the applied moves in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the most recent move.
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Sub-boards the player on turn may choose from.
    pub fn playable_boards(&self) -> Vec<Position> {
        if self.is_terminal() {
            return Vec::new();
        }
        match self.active_board {
            ActiveBoard::Board(board) if self.meta_board.sub_board(board).is_open() => vec![board],
            ActiveBoard::Board(_) => Vec::new(),
            ActiveBoard::AnyOpen => self.meta_board.open_boards(),
        }
    }

    /// Every legal move for the player on turn.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.playable_boards()
            .into_iter()
            .flat_map(|board| {
                self.meta_board
                    .sub_board(board)
                    .empty_cells()
                    .into_iter()
                    .map(move |cell| Move::new(self.current_player, board, cell))
            })
            .collect()
    }

    /// Human-readable status line.
    pub fn status_text(&self) -> String {
        match self.status {
            GameStatus::Won(player) => format!("{player} wins"),
            GameStatus::Drawn => "draw".to_string(),
            GameStatus::InProgress => match self.active_board {
                ActiveBoard::AnyOpen => format!("{}'s turn, any board", self.current_player),
                ActiveBoard::Board(board) => {
                    format!("{}'s turn, board {}", self.current_player, board.to_index())
                }
            },
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_initial_state() {
        let state = GameState::new();
        assert_eq!(state.current_player(), Player::X);
        assert_eq!(state.active_board(), ActiveBoard::AnyOpen);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.meta_board().mark_count(), 0);
        assert_eq!(state.legal_moves().len(), 81);
        assert_eq!(state.status_text(), "X's turn, any board");
    }

    #[test]
    fn test_starting_with_o() {
        let state = GameState::starting_with(Player::O);
        assert_eq!(state.current_player(), Player::O);
        let next = state.apply(0, 4, Player::O).unwrap();
        assert_eq!(next.current_player(), Player::X);
    }

    #[test]
    fn test_legal_moves_follow_active_board() {
        let state = GameState::new().apply(0, 4, Player::X).unwrap();
        assert_eq!(state.playable_boards(), vec![Position::Center]);
        let moves = state.legal_moves();
        assert_eq!(moves.len(), 9);
        assert!(moves.iter().all(|m| m.board == Position::Center && m.player == Player::O));
        assert_eq!(state.status_text(), "O's turn, board 4");
    }

    #[test]
    fn test_closed_forced_board_offers_nothing() {
        let x = crate::Mark::Occupied(Player::X);
        let e = crate::Mark::Empty;
        let won = crate::SubBoard::from_cells([x, x, x, e, e, e, e, e, e]);
        let meta = MetaBoard::new().with_sub_board(Position::TopLeft, won);
        let state =
            GameState::from_position(meta, Player::O, ActiveBoard::Board(Position::TopLeft));

        assert!(state.playable_boards().is_empty());
        assert!(state.legal_moves().is_empty());
        for board in 0..9 {
            for cell in 0..9 {
                assert!(state.apply(board, cell, Player::O).is_err());
            }
        }
    }

    #[test]
    fn test_replay_matches_direct_play() {
        let direct = GameState::new()
            .apply(0, 4, Player::X)
            .and_then(|s| s.apply(4, 0, Player::O))
            .and_then(|s| s.apply(0, 8, Player::X))
            .unwrap();
        let replayed = GameState::replay(direct.history()).unwrap();
        assert_eq!(replayed.meta_board(), direct.meta_board());
        assert_eq!(replayed.current_player(), direct.current_player());
        assert_eq!(replayed.active_board(), direct.active_board());
        assert_ne!(replayed.id(), direct.id());
    }

    #[test]
    fn test_replay_stops_at_first_error() {
        let moves = [
            Move::new(Player::X, Position::TopLeft, Position::Center),
            Move::new(Player::O, Position::TopLeft, Position::TopLeft),
        ];
        assert!(matches!(
            GameState::replay(&moves),
            Err(MoveError::IllegalBoardChoice { requested: 0, .. })
        ));
    }
}
