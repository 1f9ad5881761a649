//! Strictly Super - type-safe super tic-tac-toe game logic
//!
//! A 3x3 grid of 3x3 sub-boards where the cell you play picks the sub-board
//! your opponent must play next.
//!
//! # Architecture
//!
//! - **Boards**: [`SubBoard`] and [`MetaBoard`] store marks; status is derived
//! - **Validator**: [`validate`] is the pure transition function
//! - **Turn controller**: [`next_turn`] picks the next player and sub-board
//! - **Session**: [`GameSession`] owns the current snapshot and is the only
//!   place it is replaced; [`SessionManager`] keys sessions by [`GameId`]
//! - **Sync**: [`RemoteGame`] reconciles with a remote authority
//! - **DTO**: [`GameStateDto`] is the lossless wire form
//!
//! # Example
//!
//! ```
//! use strictly_super::{ActiveBoard, GameSession, Player, Position};
//!
//! let mut session = GameSession::new();
//! let state = session.apply_move(0, 4, Player::X)?;
//! assert_eq!(state.current_player(), Player::O);
//! assert_eq!(state.active_board(), ActiveBoard::Board(Position::Center));
//! # Ok::<(), strictly_super::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
pub mod contracts;
mod dto;
mod error;
pub mod invariants;
mod position;
pub mod rules;
mod session;
mod state;
mod sync;
mod turn;
mod types;
mod validator;

pub use action::{Move, MoveError};
pub use board::{BoardStatus, MetaBoard, PlaceError, SubBoard};
pub use dto::{DtoError, GameStateDto, MoveRequest, SubBoardDto};
pub use error::SessionError;
pub use position::Position;
pub use rules::evaluate_lines;
pub use session::{GameSession, SessionManager};
pub use state::{GameState, GameStatus};
pub use sync::{Pending, RemoteFailure, RemoteGame, Ticket, View};
pub use turn::{ActiveBoard, Turn, next_turn};
pub use types::{GameId, Mark, Player};
pub use validator::validate;
