//! Properties every snapshot produced by the validator satisfies.
//!
//! Each invariant is a zero-sized type so sets of them can be named as
//! tuple types and checked in one call.

/// A property of a game state.
pub trait Invariant<S> {
    /// Short statement of the property, used in violation reports.
    const DESCRIPTION: &'static str;

    /// True if `state` satisfies the property.
    fn holds(state: &S) -> bool;
}

/// A property that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("invariant violated: {description}")]
pub struct InvariantViolation {
    /// The property that failed.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a violation report.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Invariants checked together, reporting every failure rather than the first.
pub trait InvariantSet<S> {
    /// Checks each member against `state`.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv),+> InvariantSet<S> for ($($inv,)+)
        where
            $($inv: Invariant<S>,)+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let failed: Vec<InvariantViolation> = [$(($inv::holds(state), $inv::DESCRIPTION)),+]
                    .into_iter()
                    .filter(|(held, _)| !held)
                    .map(|(_, description)| InvariantViolation::new(description))
                    .collect();
                if failed.is_empty() { Ok(()) } else { Err(failed) }
            }
        }
    };
}

impl_invariant_set!(I1, I2);
impl_invariant_set!(I1, I2, I3);
impl_invariant_set!(I1, I2, I3, I4);

pub mod active_board;
pub mod alternating_turn;
pub mod history_consistent;
pub mod status_consistent;

pub use active_board::ActiveBoardInvariant;
pub use alternating_turn::AlternatingTurnInvariant;
pub use history_consistent::HistoryConsistentInvariant;
pub use status_consistent::StatusConsistentInvariant;

/// Everything the validator guarantees about a snapshot.
pub type SuperInvariants = (
    HistoryConsistentInvariant,
    AlternatingTurnInvariant,
    ActiveBoardInvariant,
    StatusConsistentInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameState, Move, Player, Position};

    #[test]
    fn test_invariant_set_holds_for_empty_game() {
        assert!(SuperInvariants::check_all(&GameState::new()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_moves() {
        let moves = [
            Move::new(Player::X, Position::TopLeft, Position::Center),
            Move::new(Player::O, Position::Center, Position::TopLeft),
            Move::new(Player::X, Position::TopLeft, Position::BottomRight),
        ];
        let state = GameState::replay(&moves).unwrap();
        assert!(SuperInvariants::check_all(&state).is_ok());
    }

    #[test]
    fn test_violation_lists_each_failure() {
        // Current player X after X moved breaks alternation only.
        let moved = GameState::new().apply(4, 4, Player::X).unwrap();
        let broken = GameState::from_parts(
            moved.id(),
            moved.meta_board().clone(),
            Player::X,
            moved.active_board(),
            moved.status(),
            moved.history().to_vec(),
        );
        let violations = SuperInvariants::check_all(&broken).unwrap_err();
        assert_eq!(
            violations,
            vec![InvariantViolation::new(AlternatingTurnInvariant::DESCRIPTION)]
        );
        assert_eq!(violations[0].to_string(), "invariant violated: Players alternate turns");
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (HistoryConsistentInvariant, AlternatingTurnInvariant);
        assert!(TwoInvariants::check_all(&GameState::new()).is_ok());
    }
}
