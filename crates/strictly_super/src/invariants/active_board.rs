//! Active-board invariant: the constraint follows the last cell played.

use super::Invariant;
use crate::GameState;
use crate::turn::ActiveBoard;

/// Invariant: while the game runs, a forced sub-board is open, and after a
/// move the constraint points at the sub-board named by the cell just
/// played (or is any-open if that sub-board is closed).
pub struct ActiveBoardInvariant;

impl Invariant<GameState> for ActiveBoardInvariant {
    const DESCRIPTION: &'static str = "Active board follows the last cell played";

    fn holds(state: &GameState) -> bool {
        if state.is_terminal() {
            return true;
        }

        let meta = state.meta_board();
        if let ActiveBoard::Board(board) = state.active_board()
            && !meta.sub_board(board).is_open()
        {
            return false;
        }

        match state.last_move() {
            Some(last) => {
                let expected = if meta.sub_board(last.cell).is_open() {
                    ActiveBoard::Board(last.cell)
                } else {
                    ActiveBoard::AnyOpen
                };
                state.active_board() == expected
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MetaBoard, Player, Position, SubBoard};

    #[test]
    fn test_after_move_holds() {
        let state = GameState::new().apply(0, 7, Player::X).unwrap();
        assert_eq!(state.active_board(), ActiveBoard::Board(Position::BottomCenter));
        assert!(ActiveBoardInvariant::holds(&state));
    }

    #[test]
    fn test_forced_closed_board_violates() {
        let drawn = SubBoard::from_cells(
            [
                Player::X,
                Player::O,
                Player::X,
                Player::O,
                Player::X,
                Player::X,
                Player::O,
                Player::X,
                Player::O,
            ]
            .map(Into::into),
        );
        let meta = MetaBoard::new().with_sub_board(Position::Center, drawn);
        let state = GameState::from_position(meta, Player::X, ActiveBoard::Board(Position::Center));
        assert!(!ActiveBoardInvariant::holds(&state));
    }
}
