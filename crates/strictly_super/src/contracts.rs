//! Move legality as explicit pre- and postconditions.
//!
//! Each rule of a legal move is its own precondition type with a `check`
//! that either resolves part of the move or names the broken rule.
//! [`LegalMove`] runs them in a fixed order so the first failure decides
//! the error a player sees.

use crate::action::{Move, MoveError};
use crate::invariants::{InvariantSet, InvariantViolation, SuperInvariants};
use crate::turn::ActiveBoard;
use crate::{GameState, Mark, Player, Position};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract
// ─────────────────────────────────────────────────────────────

/// Conditions around a transition of `S` driven by an `A`.
///
/// `pre` runs before the transition and turns the raw action into a
/// checked one. `post` compares the snapshots on either side.
pub trait Contract<S, A> {
    /// The action once its preconditions are known to hold.
    type Checked;

    /// Resolves `action` against `state`, or names the rule it breaks.
    fn pre(state: &S, action: &A) -> Result<Self::Checked, MoveError>;

    /// Reports every property the transition from `before` to `after` broke.
    fn post(before: &S, after: &S) -> Result<(), Vec<InvariantViolation>>;
}

/// A move as submitted: raw indices, not yet known to be on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct MoveAttempt {
    /// Sub-board index requested.
    pub board_index: usize,
    /// Cell index requested.
    pub cell_index: usize,
    /// Player claiming the move.
    pub player: Player,
}

// ─────────────────────────────────────────────────────────────
//  Preconditions, in checking order
// ─────────────────────────────────────────────────────────────

/// The game is still in progress.
pub struct GameNotOver;

impl GameNotOver {
    /// Fails with [`MoveError::GameAlreadyOver`] on a terminal state.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), MoveError> {
        if state.is_terminal() {
            warn!(status = ?state.status(), "Move attempted on finished game");
            Err(MoveError::GameAlreadyOver)
        } else {
            Ok(())
        }
    }
}

/// The acting player is the one on turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with [`MoveError::NotYourTurn`] when someone else is on turn.
    #[instrument(skip(state))]
    pub fn check(attempt: &MoveAttempt, state: &GameState) -> Result<(), MoveError> {
        if attempt.player != state.current_player() {
            warn!(expected = %state.current_player(), "Move out of turn");
            Err(MoveError::NotYourTurn {
                expected: state.current_player(),
                actual: attempt.player,
            })
        } else {
            Ok(())
        }
    }
}

/// The requested sub-board exists and the active-board rule permits it.
pub struct BoardChoiceAllowed;

impl BoardChoiceAllowed {
    /// Resolves the requested sub-board or fails with
    /// [`MoveError::IllegalBoardChoice`].
    #[instrument(skip(state))]
    pub fn check(attempt: &MoveAttempt, state: &GameState) -> Result<Position, MoveError> {
        let active = state.active_board();
        let board = Position::from_index(attempt.board_index);
        let allowed = match (active, board) {
            (ActiveBoard::Board(forced), Some(board)) => forced == board,
            (ActiveBoard::AnyOpen, Some(board)) => state.meta_board().sub_board(board).is_open(),
            (_, None) => false,
        };

        match board {
            Some(board) if allowed => Ok(board),
            _ => {
                warn!(%active, "Illegal board choice");
                Err(MoveError::IllegalBoardChoice {
                    requested: attempt.board_index,
                    active,
                })
            }
        }
    }
}

/// The chosen sub-board is neither won nor drawn.
pub struct BoardIsOpen;

impl BoardIsOpen {
    /// Fails with [`MoveError::BoardAlreadyClosed`].
    #[instrument(skip(state))]
    pub fn check(board: Position, state: &GameState) -> Result<(), MoveError> {
        if state.meta_board().sub_board(board).is_open() {
            Ok(())
        } else {
            warn!("Board already closed");
            Err(MoveError::BoardAlreadyClosed(board))
        }
    }
}

/// The requested cell exists and holds no mark.
pub struct CellIsEmpty;

impl CellIsEmpty {
    /// Resolves the cell or fails with [`MoveError::InvalidCellIndex`] /
    /// [`MoveError::CellOccupied`].
    #[instrument(skip(state))]
    pub fn check(
        attempt: &MoveAttempt,
        board: Position,
        state: &GameState,
    ) -> Result<Position, MoveError> {
        let cell = Position::from_index(attempt.cell_index)
            .ok_or(MoveError::InvalidCellIndex(attempt.cell_index))?;
        if state.meta_board().sub_board(board).is_empty(cell) {
            Ok(cell)
        } else {
            warn!("Cell already occupied");
            Err(MoveError::CellOccupied { board, cell })
        }
    }
}

/// Every precondition above, stopping at the first failure.
pub struct LegalMove;

impl LegalMove {
    /// Resolves a raw attempt into a [`Move`] that can be applied.
    #[instrument(skip(state))]
    pub fn check(attempt: &MoveAttempt, state: &GameState) -> Result<Move, MoveError> {
        GameNotOver::check(state)?;
        PlayersTurn::check(attempt, state)?;
        let board = BoardChoiceAllowed::check(attempt, state)?;
        BoardIsOpen::check(board, state)?;
        let cell = CellIsEmpty::check(attempt, board, state)?;
        Ok(Move::new(attempt.player, board, cell))
    }
}

// ─────────────────────────────────────────────────────────────
//  Whole-move contract
// ─────────────────────────────────────────────────────────────

/// The contract the validator enforces for every move.
///
/// Before: [`LegalMove`]. After: [`SingleCellChanged`] between the two
/// snapshots, and [`SuperInvariants`] on the new one.
pub struct MoveContract;

impl Contract<GameState, MoveAttempt> for MoveContract {
    type Checked = Move;

    fn pre(state: &GameState, attempt: &MoveAttempt) -> Result<Move, MoveError> {
        LegalMove::check(attempt, state)
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !SingleCellChanged::holds(before, after) {
            violations.push(InvariantViolation::new(SingleCellChanged::DESCRIPTION));
        }
        if let Err(mut found) = SuperInvariants::check_all(after) {
            violations.append(&mut found);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Frame condition: a move changes exactly one cell, and that cell now
/// holds the mover's mark.
pub struct SingleCellChanged;

impl SingleCellChanged {
    /// Human-readable description.
    pub const DESCRIPTION: &'static str = "A move changes exactly one cell";

    /// Checks the frame condition between two consecutive snapshots.
    pub fn holds(before: &GameState, after: &GameState) -> bool {
        let changed: Vec<(Position, Position)> = Position::ALL
            .iter()
            .flat_map(|b| Position::ALL.iter().map(move |c| (*b, *c)))
            .filter(|(b, c)| before.meta_board().get(*b, *c) != after.meta_board().get(*b, *c))
            .collect();

        match (changed.as_slice(), after.last_move()) {
            ([(board, cell)], Some(mv)) => {
                mv.board == *board
                    && mv.cell == *cell
                    && after.meta_board().get(*board, *cell) == Mark::Occupied(mv.player)
                    && before.meta_board().get(*board, *cell).is_empty()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;

    #[test]
    fn test_precondition_passes_on_fresh_game() {
        let state = GameState::new();
        let attempt = MoveAttempt::new(3, 5, Player::X);
        let mv = MoveContract::pre(&state, &attempt).unwrap();
        assert_eq!(mv, Move::new(Player::X, Position::MiddleLeft, Position::MiddleRight));
    }

    #[test]
    fn test_precondition_wrong_turn() {
        let state = GameState::new();
        let attempt = MoveAttempt::new(0, 0, Player::O);
        assert!(matches!(
            MoveContract::pre(&state, &attempt),
            Err(MoveError::NotYourTurn { expected: Player::X, actual: Player::O })
        ));
    }

    #[test]
    fn test_turn_checked_before_board() {
        let state = validate(&GameState::new(), 0, 4, Player::X).unwrap();
        // Wrong player and wrong board: the turn check wins.
        let attempt = MoveAttempt::new(0, 0, Player::X);
        assert!(matches!(
            MoveContract::pre(&state, &attempt),
            Err(MoveError::NotYourTurn { .. })
        ));
    }

    #[test]
    fn test_out_of_range_board_is_illegal_choice() {
        let attempt = MoveAttempt::new(9, 0, Player::X);
        assert!(matches!(
            MoveContract::pre(&GameState::new(), &attempt),
            Err(MoveError::IllegalBoardChoice { requested: 9, active: ActiveBoard::AnyOpen })
        ));
    }

    #[test]
    fn test_out_of_range_cell() {
        let attempt = MoveAttempt::new(0, 99, Player::X);
        assert_eq!(
            MoveContract::pre(&GameState::new(), &attempt),
            Err(MoveError::InvalidCellIndex(99))
        );
    }

    #[test]
    fn test_postcondition_holds_after_move() {
        let before = GameState::new();
        let after = validate(&before, 4, 4, Player::X).unwrap();
        assert!(MoveContract::post(&before, &after).is_ok());
    }

    #[test]
    fn test_postcondition_detects_unchanged_board() {
        let before = validate(&GameState::new(), 4, 4, Player::X).unwrap();
        // Same board on both sides: nothing changed.
        let violations = MoveContract::post(&before, &before).unwrap_err();
        assert!(violations.iter().any(|v| v.description == SingleCellChanged::DESCRIPTION));
    }
}
