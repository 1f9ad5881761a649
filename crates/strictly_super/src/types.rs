//! Core domain types for super tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Player {
    /// Player X (player A, goes first).
    #[display("X")]
    X,
    /// Player O (player B, goes second).
    #[display("O")]
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// The content of a single cell: empty or holding a player's mark.
///
/// The meta-board reuses this type for its virtual cells, where a
/// sub-board won by a player reads as that player's mark and every other
/// sub-board reads as [`Mark::Empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mark {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a player.
    Occupied(Player),
}

impl Mark {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Mark::Empty => None,
            Mark::Occupied(player) => Some(player),
        }
    }

    /// Returns true if no player occupies this cell.
    pub fn is_empty(self) -> bool {
        self == Mark::Empty
    }
}

impl From<Option<Player>> for Mark {
    fn from(player: Option<Player>) -> Self {
        player.map_or(Mark::Empty, Mark::Occupied)
    }
}

impl From<Player> for Mark {
    fn from(player: Player) -> Self {
        Mark::Occupied(player)
    }
}

/// Opaque identifier of one game.
///
/// A fresh identifier is assigned whenever a game is created or reset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct GameId(uuid::Uuid);

impl GameId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl std::str::FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_alternates() {
        assert_eq!(Player::X.opponent(), Player::O);
        assert_eq!(Player::O.opponent(), Player::X);
    }

    #[test]
    fn test_mark_from_option() {
        assert_eq!(Mark::from(None), Mark::Empty);
        assert_eq!(Mark::from(Some(Player::O)), Mark::Occupied(Player::O));
        assert_eq!(Mark::Occupied(Player::X).player(), Some(Player::X));
    }

    #[test]
    fn test_game_ids_are_unique_and_parse() {
        let a = GameId::generate();
        let b = GameId::generate();
        assert_ne!(a, b);
        let parsed: GameId = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }
}
