//! Game session: the only place where "current" state is replaced.

use crate::action::MoveError;
use crate::error::SessionError;
use crate::{GameId, GameState, Player};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Holds the current snapshot of one game.
///
/// Snapshots are shared as `Arc<GameState>` so renderers can keep a
/// read-only reference while the session moves on. Every replacement bumps
/// [`GameSession::version`], which makes read-compute-replace cycles
/// checkable with [`GameSession::compare_and_swap`].
#[derive(Debug, Clone)]
pub struct GameSession {
    current: Arc<GameState>,
    version: u64,
}

impl GameSession {
    /// Creates a session holding a fresh game.
    #[instrument]
    pub fn new() -> Self {
        Self::with_state(GameState::new())
    }

    /// Creates a session whose first move belongs to `first`.
    #[instrument]
    pub fn starting_with(first: Player) -> Self {
        Self::with_state(GameState::starting_with(first))
    }

    /// Creates a session around an existing snapshot.
    #[instrument(skip(state), fields(game_id = %state.id()))]
    pub fn with_state(state: GameState) -> Self {
        info!("Creating game session");
        Self {
            current: Arc::new(state),
            version: 0,
        }
    }

    /// Returns the latest snapshot.
    pub fn snapshot(&self) -> Arc<GameState> {
        Arc::clone(&self.current)
    }

    /// Borrows the latest snapshot.
    pub fn state(&self) -> &GameState {
        &self.current
    }

    /// Returns the number of replacements so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Validates a move and, on success, installs the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns the [`MoveError`]; the held snapshot is left untouched.
    #[instrument(skip(self), fields(game_id = %self.current.id(), version = self.version))]
    pub fn apply_move(
        &mut self,
        board_index: usize,
        cell_index: usize,
        player: Player,
    ) -> Result<Arc<GameState>, MoveError> {
        let next = self.current.apply(board_index, cell_index, player).inspect_err(|e| {
            warn!(error = %e, "Move rejected");
        })?;
        Ok(self.replace(next))
    }

    /// Replaces the held game with a fresh one under a new identifier.
    #[instrument(skip(self), fields(old_id = %self.current.id()))]
    pub fn reset(&mut self) -> Arc<GameState> {
        let fresh = self.replace(GameState::new());
        info!(new_id = %fresh.id(), "Game reset");
        fresh
    }

    /// Installs `next` only if no replacement happened since `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Conflict`] when the version moved on.
    #[instrument(skip(self, next), fields(game_id = %self.current.id()))]
    pub fn compare_and_swap(
        &mut self,
        expected: u64,
        next: GameState,
    ) -> Result<Arc<GameState>, SessionError> {
        if expected != self.version {
            warn!(expected, actual = self.version, "Snapshot replaced concurrently");
            return Err(SessionError::Conflict {
                expected,
                actual: self.version,
            });
        }
        Ok(self.replace(next))
    }

    /// Installs `next` unconditionally.
    pub(crate) fn replace(&mut self, next: GameState) -> Arc<GameState> {
        self.current = Arc::new(next);
        self.version += 1;
        debug!(version = self.version, status = ?self.current.status(), "Snapshot installed");
        self.snapshot()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Manages many games, keyed by their identifier.
///
/// This is the registry a boundary layer drives: create, look up, move,
/// reset and discard games by id. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<GameId, GameSession>>>,
}

impl SessionManager {
    /// Creates an empty session manager.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<GameId, GameSession>> {
        // Sessions are replaced whole, so a poisoned map is still consistent.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new game and returns its first snapshot.
    #[instrument(skip(self))]
    pub fn create_game(&self, first: Player) -> Arc<GameState> {
        let session = GameSession::starting_with(first);
        let snapshot = session.snapshot();
        self.lock().insert(snapshot.id(), session);
        info!(game_id = %snapshot.id(), "Created game");
        snapshot
    }

    /// Returns the latest snapshot of a game.
    #[instrument(skip(self))]
    pub fn get(&self, id: GameId) -> Option<Arc<GameState>> {
        let snapshot = self.lock().get(&id).map(GameSession::snapshot);
        if snapshot.is_none() {
            debug!("Game not found");
        }
        snapshot
    }

    /// Applies a move to a game.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] for an unknown id, [`SessionError::Rule`]
    /// when the move is illegal.
    #[instrument(skip(self))]
    pub fn apply_move(
        &self,
        id: GameId,
        board_index: usize,
        cell_index: usize,
        player: Player,
    ) -> Result<Arc<GameState>, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        Ok(session.apply_move(board_index, cell_index, player)?)
    }

    /// Resets a game. The fresh game is stored under its new identifier.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn reset(&self, id: GameId) -> Result<Arc<GameState>, SessionError> {
        let mut sessions = self.lock();
        let mut session = sessions.remove(&id).ok_or(SessionError::NotFound(id))?;
        let fresh = session.reset();
        sessions.insert(fresh.id(), session);
        Ok(fresh)
    }

    /// Discards a game. Returns false if it did not exist.
    #[instrument(skip(self))]
    pub fn remove(&self, id: GameId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        info!(removed, "Remove game");
        removed
    }

    /// Lists the identifiers of all held games.
    #[instrument(skip(self))]
    pub fn list(&self) -> Vec<GameId> {
        self.lock().keys().copied().collect()
    }
}
