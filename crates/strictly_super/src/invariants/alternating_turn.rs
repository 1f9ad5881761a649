//! Alternating turn invariant: players alternate X, O, X, O, ...

use super::Invariant;
use crate::GameState;

/// Invariant: Players alternate turns.
///
/// No two consecutive history entries share a player, and the player on
/// turn is the opponent of whoever moved last.
pub struct AlternatingTurnInvariant;

impl Invariant<GameState> for AlternatingTurnInvariant {
    const DESCRIPTION: &'static str = "Players alternate turns";

    fn holds(state: &GameState) -> bool {
        let history = state.history();

        if history.windows(2).any(|w| w[0].player == w[1].player) {
            return false;
        }

        match history.last() {
            Some(last) => state.current_player() == last.player.opponent(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Player;

    #[test]
    fn test_empty_game_holds() {
        assert!(AlternatingTurnInvariant::holds(&GameState::new()));
    }

    #[test]
    fn test_alternating_sequence_holds() {
        let state = GameState::new()
            .apply(0, 1, Player::X)
            .and_then(|s| s.apply(1, 2, Player::O))
            .and_then(|s| s.apply(2, 0, Player::X))
            .unwrap();
        assert!(AlternatingTurnInvariant::holds(&state));
        assert_eq!(state.current_player(), Player::O);
    }
}
