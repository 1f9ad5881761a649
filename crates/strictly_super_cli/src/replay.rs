//! Batch replay of recorded moves.

use derive_more::{Display, Error};
use strictly_super::{GameSession, GameState, MoveError, MoveRequest, Player};
use tracing::{info, instrument, warn};

/// A recorded move the rules refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Move {index} ({board_index}, {cell_index}) rejected: {source}")]
pub struct ReplayError {
    /// Zero-based position of the move in the file.
    pub index: usize,
    /// Requested sub-board.
    pub board_index: usize,
    /// Requested cell.
    pub cell_index: usize,
    /// Why it was refused.
    pub source: MoveError,
}

/// Applies `requests` in order, alternating players from `first`.
///
/// Stops at the first illegal move.
#[instrument(skip(requests), fields(count = requests.len()))]
pub fn replay(first: Player, requests: &[MoveRequest]) -> Result<GameState, ReplayError> {
    let mut session = GameSession::starting_with(first);
    for (index, request) in requests.iter().enumerate() {
        let player = session.state().current_player();
        session
            .apply_move(request.board_index, request.cell_index, player)
            .map_err(|source| {
                warn!(index, error = %source, "Replay stopped");
                ReplayError {
                    index,
                    board_index: request.board_index,
                    cell_index: request.cell_index,
                    source,
                }
            })?;
    }
    let state = session.state().clone();
    info!(status = %state.status_text(), "Replay finished");
    Ok(state)
}
