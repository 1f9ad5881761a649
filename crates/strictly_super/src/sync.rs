//! Reconciliation with a remote authority.
//!
//! When a server decides moves, the local core only predicts. A prediction
//! lives in a separate [`Pending`] overlay and is thrown away once the
//! authoritative answer arrives. It is never merged into confirmed state,
//! and a confirmed snapshot is only ever replaced by a server response or
//! a server push.

use crate::action::{Move, MoveError};
use crate::error::SessionError;
use crate::session::GameSession;
use crate::{GameState, Player, validator};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Identifies one outstanding move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("#{_0}")]
pub struct Ticket(u64);

/// A move sent to the authority and not yet answered.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Pending {
    /// Request identifier.
    ticket: Ticket,
    /// The submitted move.
    mv: Move,
    /// Locally predicted result, for display only.
    predicted: GameState,
}

/// Why the authority did not return a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RemoteFailure {
    /// The authority refused the move on game-rule grounds.
    #[display("rejected: {_0}")]
    Rejected(MoveError),
    /// The request failed before the authority could answer.
    #[display("transport: {_0}")]
    Transport(String),
}

/// What a renderer should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    /// The last confirmed snapshot.
    Confirmed(&'a GameState),
    /// A prediction awaiting confirmation.
    Pending(&'a GameState),
}

impl<'a> View<'a> {
    /// The state to render, whichever kind it is.
    pub fn state(self) -> &'a GameState {
        match self {
            View::Confirmed(state) | View::Pending(state) => state,
        }
    }

    /// True while showing an unconfirmed prediction.
    pub fn is_pending(self) -> bool {
        matches!(self, View::Pending(_))
    }
}

/// A game whose authoritative state comes from elsewhere.
#[derive(Debug, Clone)]
pub struct RemoteGame {
    session: GameSession,
    pending: Option<Pending>,
    next_ticket: u64,
}

impl RemoteGame {
    /// Starts tracking the authority's initial snapshot.
    #[instrument(skip(initial), fields(game_id = %initial.id()))]
    pub fn new(initial: GameState) -> Self {
        Self {
            session: GameSession::with_state(initial),
            pending: None,
            next_ticket: 0,
        }
    }

    /// The confirmed session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The last confirmed snapshot.
    pub fn confirmed(&self) -> Arc<GameState> {
        self.session.snapshot()
    }

    /// The outstanding request, if any.
    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    /// The state to display: the prediction while a request is open,
    /// otherwise the confirmed snapshot.
    pub fn view(&self) -> View<'_> {
        match &self.pending {
            Some(pending) => View::Pending(&pending.predicted),
            None => View::Confirmed(self.session.state()),
        }
    }

    /// Checks a move locally and records it as the outstanding request.
    ///
    /// Rule violations are reported at once and nothing is recorded. A new
    /// submission cancels any older outstanding request; its response will
    /// be discarded as stale.
    ///
    /// # Errors
    ///
    /// [`SessionError::Rule`] if the move is illegal on the confirmed state.
    #[instrument(skip(self))]
    pub fn submit(
        &mut self,
        board_index: usize,
        cell_index: usize,
        player: Player,
    ) -> Result<Ticket, SessionError> {
        let (mv, predicted) =
            validator::transition(self.session.state(), board_index, cell_index, player)?;

        if let Some(old) = self.pending.take() {
            info!(cancelled = %old.ticket, "Superseding outstanding request");
        }

        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        debug!(%ticket, %mv, "Request outstanding");
        self.pending = Some(Pending { ticket, mv, predicted });
        Ok(ticket)
    }

    /// Applies the authority's answer to request `ticket`.
    ///
    /// The overlay is dropped in every case where `ticket` is current. A
    /// successful answer replaces the confirmed snapshot; failures leave it
    /// as it was.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Stale`] if `ticket` is not the outstanding request,
    ///   or the answer belongs to another game. Nothing changes.
    /// - [`SessionError::Rule`] if the authority rejected the move.
    /// - [`SessionError::Transport`] if the request failed.
    #[instrument(skip(self, response))]
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        response: Result<GameState, RemoteFailure>,
    ) -> Result<Arc<GameState>, SessionError> {
        let pending = match self.pending.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.pending = other;
                warn!("Discarding response to a request that is no longer current");
                return Err(SessionError::Stale { ticket });
            }
        };

        if let Ok(state) = &response
            && state.id() != self.session.state().id()
        {
            warn!(response_id = %state.id(), "Response belongs to another game");
            self.pending = Some(pending);
            return Err(SessionError::Stale { ticket });
        }

        match response {
            Ok(state) => {
                // Every replacement clears `pending`, so the confirmed state
                // is still the one the prediction started from.
                let snapshot = self.session.replace(state);
                if snapshot.as_ref() != &pending.predicted {
                    info!("Authority differs from local prediction");
                }
                Ok(snapshot)
            }
            Err(RemoteFailure::Rejected(err)) => {
                warn!(error = %err, "Authority rejected move");
                Err(SessionError::Rule(err))
            }
            Err(RemoteFailure::Transport(message)) => {
                warn!(%message, "Move request failed");
                Err(SessionError::Transport(message))
            }
        }
    }

    /// Installs a snapshot pushed by the authority, dropping any overlay.
    #[instrument(skip(self, state), fields(game_id = %state.id()))]
    pub fn accept_authoritative(&mut self, state: GameState) -> Arc<GameState> {
        if let Some(old) = self.pending.take() {
            info!(cancelled = %old.ticket, "Authoritative update cancels outstanding request");
        }
        self.session.replace(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use crate::turn::ActiveBoard;

    fn game() -> (RemoteGame, GameState) {
        let initial = GameState::new();
        (RemoteGame::new(initial.clone()), initial)
    }

    #[test]
    fn test_submit_shows_pending_overlay() {
        let (mut remote, initial) = game();
        let ticket = remote.submit(0, 4, Player::X).unwrap();
        let view = remote.view();
        assert!(view.is_pending());
        assert_eq!(view.state().meta_board().mark_count(), 1);
        assert_eq!(*remote.pending().unwrap().ticket(), ticket);
        assert_eq!(remote.confirmed().as_ref(), &initial);
    }

    #[test]
    fn test_pending_records_resolved_move() {
        let (mut remote, _) = game();
        remote.submit(2, 6, Player::X).unwrap();
        let pending = remote.pending().unwrap();
        assert_eq!(*pending.mv(), Move::new(Player::X, Position::TopRight, Position::BottomLeft));
        assert_eq!(pending.predicted().last_move(), Some(pending.mv()));
    }

    #[test]
    fn test_local_rule_error_records_nothing() {
        let (mut remote, _) = game();
        let err = remote.submit(0, 4, Player::O).unwrap_err();
        assert!(matches!(err, SessionError::Rule(MoveError::NotYourTurn { .. })));
        assert!(remote.pending().is_none());
    }

    #[test]
    fn test_confirmed_response_replaces_overlay() {
        let (mut remote, initial) = game();
        let ticket = remote.submit(0, 4, Player::X).unwrap();
        let authoritative = initial.apply(0, 4, Player::X).unwrap();
        let snapshot = remote.resolve(ticket, Ok(authoritative.clone())).unwrap();
        assert_eq!(snapshot.as_ref(), &authoritative);
        assert!(!remote.view().is_pending());
        assert_eq!(remote.view().state().active_board(), ActiveBoard::Board(Position::Center));
    }

    #[test]
    fn test_transport_failure_is_not_applied() {
        let (mut remote, initial) = game();
        let ticket = remote.submit(0, 4, Player::X).unwrap();
        let err = remote
            .resolve(ticket, Err(RemoteFailure::Transport("connection reset".into())))
            .unwrap_err();
        assert_eq!(err, SessionError::Transport("connection reset".into()));
        assert!(!err.is_rule());
        assert_eq!(remote.view(), View::Confirmed(&initial));
        assert_eq!(remote.session().version(), 0);
    }

    #[test]
    fn test_remote_rejection_surfaces_as_rule_error() {
        let (mut remote, _) = game();
        let ticket = remote.submit(0, 4, Player::X).unwrap();
        let err = remote
            .resolve(ticket, Err(RemoteFailure::Rejected(MoveError::GameAlreadyOver)))
            .unwrap_err();
        assert_eq!(err.move_error(), Some(MoveError::GameAlreadyOver));
        assert!(remote.pending().is_none());
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let (mut remote, initial) = game();
        let first = remote.submit(0, 4, Player::X).unwrap();
        let second = remote.submit(8, 0, Player::X).unwrap();
        assert_ne!(first, second);

        let late = initial.apply(0, 4, Player::X).unwrap();
        assert_eq!(remote.resolve(first, Ok(late)), Err(SessionError::Stale { ticket: first }));
        assert_eq!(remote.session().version(), 0);
        assert!(remote.view().is_pending());

        let answer = initial.apply(8, 0, Player::X).unwrap();
        remote.resolve(second, Ok(answer.clone())).unwrap();
        assert_eq!(remote.confirmed().as_ref(), &answer);
    }

    #[test]
    fn test_duplicate_response_is_discarded() {
        let (mut remote, initial) = game();
        let ticket = remote.submit(0, 4, Player::X).unwrap();
        let answer = initial.apply(0, 4, Player::X).unwrap();
        remote.resolve(ticket, Ok(answer.clone())).unwrap();
        assert_eq!(remote.resolve(ticket, Ok(answer)), Err(SessionError::Stale { ticket }));
        assert_eq!(remote.session().version(), 1);
    }

    #[test]
    fn test_response_for_other_game_is_discarded() {
        let (mut remote, _) = game();
        let ticket = remote.submit(0, 4, Player::X).unwrap();
        let foreign = GameState::new().apply(0, 4, Player::X).unwrap();
        assert_eq!(remote.resolve(ticket, Ok(foreign)), Err(SessionError::Stale { ticket }));
        assert!(remote.view().is_pending());
    }

    #[test]
    fn test_push_cancels_pending() {
        let (mut remote, initial) = game();
        let ticket = remote.submit(0, 4, Player::X).unwrap();
        let pushed = initial.apply(3, 3, Player::X).unwrap();
        remote.accept_authoritative(pushed.clone());
        assert_eq!(remote.view(), View::Confirmed(&pushed));
        assert!(matches!(
            remote.resolve(ticket, Ok(pushed)),
            Err(SessionError::Stale { .. })
        ));
    }
}
