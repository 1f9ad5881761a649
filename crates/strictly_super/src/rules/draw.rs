//! Draw detection logic.

use crate::Mark;

/// Checks if every cell is occupied.
///
/// A full grid with no winning line is a draw.
pub fn is_full(marks: &[Mark; 9]) -> bool {
    marks.iter().all(|m| *m != Mark::Empty)
}
