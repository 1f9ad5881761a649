//! Game rules for super tic-tac-toe.
//!
//! Pure functions over nine marks. The same line check decides a single
//! sub-board and, applied to the sub-board winners, the meta-board.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, evaluate_lines};
