//! Move validator: the single pure transition function of the game.

use crate::Player;
use crate::action::{Move, MoveError};
use crate::contracts::{Contract, MoveAttempt, MoveContract};
use crate::state::{GameState, GameStatus};
use crate::turn::next_turn;
use tracing::{info, instrument};

/// Validates a move against `state` and returns the resulting snapshot.
///
/// Checks run in order and stop at the first failure: game not over,
/// player on turn, sub-board allowed by the active constraint, sub-board
/// open, cell in range and empty. On success the mark is placed, the
/// sub-board and meta-board status are re-derived and the turn controller
/// picks the next player and active sub-board.
///
/// `state` is only borrowed, so on failure the caller still holds the
/// unchanged snapshot next to the error.
///
/// # Errors
///
/// Returns the first failing check as a [`MoveError`].
pub fn validate(
    state: &GameState,
    board_index: usize,
    cell_index: usize,
    player: Player,
) -> Result<GameState, MoveError> {
    transition(state, board_index, cell_index, player).map(|(_, next)| next)
}

/// [`validate`], also returning the resolved move.
#[instrument(skip(state), fields(game_id = %state.id()))]
pub(crate) fn transition(
    state: &GameState,
    board_index: usize,
    cell_index: usize,
    player: Player,
) -> Result<(Move, GameState), MoveError> {
    let attempt = MoveAttempt::new(board_index, cell_index, player);
    let mv = MoveContract::pre(state, &attempt)?;

    let sub_board = state
        .meta_board()
        .sub_board(mv.board)
        .place_mark(mv.cell.to_index(), player)
        .map_err(|e| e.on_board(mv.board))?;
    let meta_board = state.meta_board().with_sub_board(mv.board, sub_board);
    let status = GameStatus::from(meta_board.status());
    let turn = next_turn(&meta_board, mv.cell, player);

    let mut history = state.history().to_vec();
    history.push(mv);

    let next = GameState::from_parts(
        state.id(),
        meta_board,
        *turn.next_player(),
        *turn.next_active(),
        status,
        history,
    );

    #[cfg(debug_assertions)]
    {
        let post = MoveContract::post(state, &next);
        debug_assert!(post.is_ok(), "Postcondition failed after {mv}: {post:?}");
    }

    info!(
        board = board_index,
        cell = cell_index,
        %player,
        board_status = ?sub_board.status(),
        status = ?next.status(),
        active = %next.active_board(),
        "Move applied"
    );

    Ok((mv, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::ActiveBoard;
    use crate::{Mark, Position};

    fn play(state: &GameState, moves: &[(usize, usize)]) -> GameState {
        moves.iter().fold(state.clone(), |s, &(b, c)| {
            let player = s.current_player();
            validate(&s, b, c, player).unwrap()
        })
    }

    #[test]
    fn test_first_move() {
        let state = validate(&GameState::new(), 0, 0, Player::X).unwrap();
        assert_eq!(
            state.meta_board().get(Position::TopLeft, Position::TopLeft),
            Mark::Occupied(Player::X)
        );
        assert_eq!(state.current_player(), Player::O);
        assert_eq!(state.active_board(), ActiveBoard::Board(Position::TopLeft));
        assert_eq!(state.meta_board().mark_count(), 1);
    }

    #[test]
    fn test_forced_board_rejects_others() {
        let state = play(&GameState::new(), &[(0, 4)]);
        let err = validate(&state, 0, 0, Player::O).unwrap_err();
        assert_eq!(
            err,
            MoveError::IllegalBoardChoice {
                requested: 0,
                active: ActiveBoard::Board(Position::Center)
            }
        );
        assert!(err.to_string().contains("must play in board 4"));
    }

    #[test]
    fn test_occupied_cell_rejected_and_state_kept() {
        // X 4/0 sends O to board 0; O plays 0/4 sending X back to board 4,
        // where cell 0 is already X's.
        let state = play(&GameState::new(), &[(4, 0), (0, 4)]);
        let before = state.clone();
        let err = validate(&state, 4, 0, Player::X).unwrap_err();
        assert_eq!(
            err,
            MoveError::CellOccupied {
                board: Position::Center,
                cell: Position::TopLeft
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_winning_sub_board_frees_next_choice() {
        // X takes cells 1 and 2 of board 0; O answers with cell 0 elsewhere,
        // sending X back each time.
        let state = play(&GameState::new(), &[(0, 1), (1, 0), (0, 2), (2, 0)]);
        assert!(state.meta_board().sub_board(Position::TopLeft).is_open());
        assert_eq!(state.active_board(), ActiveBoard::Board(Position::TopLeft));
        assert_eq!(state.current_player(), Player::X);

        // Cell 0 completes the top row and points at board 0 itself.
        let state = play(&state, &[(0, 0)]);
        assert_eq!(state.meta_board().sub_board(Position::TopLeft).winner(), Some(Player::X));
        assert_eq!(state.active_board(), ActiveBoard::AnyOpen);
        assert_eq!(state.current_player(), Player::O);
        assert_eq!(state.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_closed_board_rejected_under_any_open() {
        let x = Mark::Occupied(Player::X);
        let won = top_row(x);
        let meta = crate::MetaBoard::new().with_sub_board(Position::TopLeft, won);
        let state = GameState::from_position(meta, Player::O, ActiveBoard::AnyOpen);
        assert!(matches!(
            validate(&state, 0, 5, Player::O),
            Err(MoveError::IllegalBoardChoice { requested: 0, .. })
        ));
    }

    #[test]
    fn test_forced_board_closed_reports_board_closed() {
        let x = Mark::Occupied(Player::X);
        let won = top_row(x);
        let meta = crate::MetaBoard::new().with_sub_board(Position::TopLeft, won);
        // A constraint pointing at a closed board can only come from
        // outside the validator, e.g. a malformed remote snapshot.
        let state =
            GameState::from_position(meta, Player::O, ActiveBoard::Board(Position::TopLeft));
        assert_eq!(
            validate(&state, 0, 5, Player::O),
            Err(MoveError::BoardAlreadyClosed(Position::TopLeft))
        );
    }

    fn top_row(mark: Mark) -> crate::SubBoard {
        let e = Mark::Empty;
        crate::SubBoard::from_cells([mark, mark, mark, e, e, e, e, e, e])
    }
}
