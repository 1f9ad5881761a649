//! History consistency: every recorded move is visible on the board.

use super::Invariant;
use crate::{GameState, Mark};

/// Invariant: each move in the history holds its player's mark, and there
/// are no more moves than marks.
///
/// Set-up positions may carry marks without history, so extra marks are
/// allowed.
pub struct HistoryConsistentInvariant;

impl Invariant<GameState> for HistoryConsistentInvariant {
    const DESCRIPTION: &'static str = "Every recorded move's mark is on the board";

    fn holds(state: &GameState) -> bool {
        let meta = state.meta_board();
        state.history().len() <= meta.mark_count()
            && state
                .history()
                .iter()
                .all(|mv| meta.get(mv.board, mv.cell) == Mark::Occupied(mv.player))
    }
}
