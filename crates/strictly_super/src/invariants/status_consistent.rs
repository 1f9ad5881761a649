//! Status consistency: the stored status matches the board.

use super::Invariant;
use crate::{GameState, GameStatus};

/// Invariant: the stored status equals the status derived from the
/// meta-board.
pub struct StatusConsistentInvariant;

impl Invariant<GameState> for StatusConsistentInvariant {
    const DESCRIPTION: &'static str = "Stored status matches the meta-board";

    fn holds(state: &GameState) -> bool {
        state.status() == GameStatus::from(state.meta_board().status())
    }
}
