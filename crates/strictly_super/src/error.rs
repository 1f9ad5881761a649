//! Session-level error types.

use crate::GameId;
use crate::action::MoveError;
use crate::sync::Ticket;
use derive_more::{Display, Error, From};

/// Failure of a session operation.
///
/// Game-rule rejections are kept apart from boundary failures so a caller
/// can never mistake a failed request for an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// The move broke a game rule.
    #[display("Move rejected: {_0}")]
    #[from]
    Rule(MoveError),

    /// The request never produced an answer (network error, server fault).
    #[display("Transport failure: {_0}")]
    Transport(#[error(not(source))] String),

    /// A response arrived for a request that is no longer current.
    #[display("Discarded stale response for request {ticket}")]
    Stale {
        /// The request the response belonged to.
        ticket: Ticket,
    },

    /// The snapshot was replaced between read and write.
    #[display("Version conflict: expected {expected}, found {actual}")]
    Conflict {
        /// Version the caller computed from.
        expected: u64,
        /// Version actually held.
        actual: u64,
    },

    /// No game with this identifier.
    #[display("Game not found: {_0}")]
    NotFound(#[error(not(source))] GameId),
}

impl SessionError {
    /// Returns true if the error is a game-rule rejection.
    pub fn is_rule(&self) -> bool {
        matches!(self, SessionError::Rule(_))
    }

    /// Returns the rule violation, if that is what this is.
    pub fn move_error(&self) -> Option<MoveError> {
        match self {
            SessionError::Rule(err) => Some(*err),
            _ => None,
        }
    }
}
