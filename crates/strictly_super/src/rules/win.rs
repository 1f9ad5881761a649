//! Win detection over a 3x3 grid of marks.

use crate::{Mark, Position};
use tracing::instrument;

/// The 8 winning lines, in evaluation order.
///
/// Rows top-to-bottom, then columns left-to-right, then the two diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Returns the mark filling the first complete line, or [`Mark::Empty`].
///
/// Lines are checked in the fixed order of [`LINES`].
#[instrument(level = "trace")]
pub fn evaluate_lines(marks: &[Mark; 9]) -> Mark {
    for [a, b, c] in LINES {
        let mark = marks[a.to_index()];
        if mark != Mark::Empty && mark == marks[b.to_index()] && mark == marks[c.to_index()] {
            return mark;
        }
    }

    Mark::Empty
}
