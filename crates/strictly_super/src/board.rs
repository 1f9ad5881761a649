//! Sub-boards and the meta-board.
//!
//! Boards store only marks. Winner, draw and open status are derived on
//! every read, so a board can never disagree with its own cells.

use crate::action::MoveError;
use crate::rules::{evaluate_lines, is_full};
use crate::{Mark, Player, Position};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Derived status of a 3x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardStatus {
    /// No winner and at least one move still possible.
    Open,
    /// A player completed a line.
    Won(Player),
    /// Full with no winning line.
    Drawn,
}

impl BoardStatus {
    /// Returns the winner, if any.
    pub fn winner(self) -> Option<Player> {
        match self {
            BoardStatus::Won(player) => Some(player),
            BoardStatus::Open | BoardStatus::Drawn => None,
        }
    }

    /// Returns true for a full board without a winner.
    pub fn is_draw(self) -> bool {
        self == BoardStatus::Drawn
    }

    /// Returns true while the board can still take moves.
    pub fn is_open(self) -> bool {
        self == BoardStatus::Open
    }

    /// Returns true once the board is won or drawn.
    pub fn is_closed(self) -> bool {
        !self.is_open()
    }
}

/// Derives winner/draw/open status from nine marks.
fn derive_status(marks: &[Mark; 9]) -> BoardStatus {
    match evaluate_lines(marks) {
        Mark::Occupied(player) => BoardStatus::Won(player),
        Mark::Empty if is_full(marks) => BoardStatus::Drawn,
        Mark::Empty => BoardStatus::Open,
    }
}

/// One ordinary 3x3 tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SubBoard {
    /// Cells in row-major order (0-8).
    cells: [Mark; 9],
}

impl SubBoard {
    /// Creates a new empty sub-board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sub-board from raw cells.
    ///
    /// Any combination of marks is accepted; use this to rebuild boards
    /// from storage or to set up test positions.
    pub fn from_cells(cells: [Mark; 9]) -> Self {
        Self { cells }
    }

    /// Gets the mark at the given cell.
    pub fn get(&self, cell: Position) -> Mark {
        self.cells[cell.to_index()]
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, cell: Position) -> bool {
        self.get(cell).is_empty()
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Mark; 9] {
        &self.cells
    }

    /// Returns a new board with `player`'s mark at `cell_index`.
    ///
    /// # Errors
    ///
    /// - [`PlaceError::InvalidCellIndex`] if `cell_index` is not in 0-8.
    /// - [`PlaceError::CellOccupied`] if the cell already holds a mark.
    pub fn place_mark(&self, cell_index: usize, player: Player) -> Result<SubBoard, PlaceError> {
        let cell =
            Position::from_index(cell_index).ok_or(PlaceError::InvalidCellIndex(cell_index))?;
        if !self.is_empty(cell) {
            return Err(PlaceError::CellOccupied(cell));
        }

        let mut next = *self;
        next.cells[cell.to_index()] = Mark::Occupied(player);
        Ok(next)
    }

    /// Derived status of this board.
    pub fn status(&self) -> BoardStatus {
        derive_status(&self.cells)
    }

    /// The player holding a complete line, if any.
    pub fn winner(&self) -> Option<Player> {
        self.status().winner()
    }

    /// True iff all cells are filled and nobody won.
    pub fn is_draw(&self) -> bool {
        self.status().is_draw()
    }

    /// True iff there is no winner and no draw.
    pub fn is_open(&self) -> bool {
        self.status().is_open()
    }

    /// Empty cells in index order.
    pub fn empty_cells(&self) -> Vec<Position> {
        Position::ALL.iter().copied().filter(|cell| self.is_empty(*cell)).collect()
    }

    /// Number of placed marks.
    pub fn mark_count(&self) -> usize {
        self.cells.iter().filter(|m| !m.is_empty()).count()
    }
}

/// Failure of a single placement on a sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlaceError {
    /// The index does not name a cell.
    #[display("Cell index {_0} must be in range [0, 8]")]
    InvalidCellIndex(#[error(not(source))] usize),
    /// The cell already holds a mark.
    #[display("Cell {_0} is already occupied")]
    CellOccupied(#[error(not(source))] Position),
}

impl PlaceError {
    /// Lifts the placement failure into a move error on `board`.
    pub fn on_board(self, board: Position) -> MoveError {
        match self {
            PlaceError::InvalidCellIndex(index) => MoveError::InvalidCellIndex(index),
            PlaceError::CellOccupied(cell) => MoveError::CellOccupied { board, cell },
        }
    }
}

/// The 3x3 arrangement of sub-boards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MetaBoard {
    /// Sub-boards in row-major order (0-8).
    boards: [SubBoard; 9],
}

impl MetaBoard {
    /// Creates a meta-board of nine empty sub-boards.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a meta-board from existing sub-boards.
    pub fn from_boards(boards: [SubBoard; 9]) -> Self {
        Self { boards }
    }

    /// Returns the sub-board at `board`.
    pub fn sub_board(&self, board: Position) -> &SubBoard {
        &self.boards[board.to_index()]
    }

    /// Returns all sub-boards.
    pub fn boards(&self) -> &[SubBoard; 9] {
        &self.boards
    }

    /// Returns a copy with `board` replaced.
    pub fn with_sub_board(&self, board: Position, sub_board: SubBoard) -> MetaBoard {
        let mut next = self.clone();
        next.boards[board.to_index()] = sub_board;
        next
    }

    /// Mark at (`board`, `cell`).
    pub fn get(&self, board: Position, cell: Position) -> Mark {
        self.sub_board(board).get(cell)
    }

    /// Each sub-board's winner as a virtual mark.
    pub fn virtual_marks(&self) -> [Mark; 9] {
        self.boards.map(|b| Mark::from(b.winner()))
    }

    /// Derived status of the whole game grid.
    ///
    /// A meta line of won sub-boards wins. Otherwise the meta-board is
    /// drawn only once every sub-board is closed.
    #[instrument(level = "debug", skip(self))]
    pub fn status(&self) -> BoardStatus {
        if let Mark::Occupied(player) = evaluate_lines(&self.virtual_marks()) {
            return BoardStatus::Won(player);
        }
        if self.boards.iter().all(|b| b.status().is_closed()) {
            BoardStatus::Drawn
        } else {
            BoardStatus::Open
        }
    }

    /// The player who won a meta line, if any.
    pub fn meta_winner(&self) -> Option<Player> {
        self.status().winner()
    }

    /// True iff every sub-board is closed and there is no meta winner.
    pub fn is_global_draw(&self) -> bool {
        self.status().is_draw()
    }

    /// Sub-boards that can still take moves.
    pub fn open_boards(&self) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|board| self.sub_board(*board).is_open())
            .collect()
    }

    /// Total number of placed marks across all sub-boards.
    pub fn mark_count(&self) -> usize {
        self.boards.iter().map(SubBoard::mark_count).sum()
    }

    /// Renders the 81 cells as a 9x9 text grid.
    ///
    /// Empty cells show as `.`; sub-boards are separated by `|` and `-`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..9 {
            if row > 0 && row % 3 == 0 {
                out.push_str("------+-------+------\n");
            }
            for col in 0..9 {
                if col > 0 && col % 3 == 0 {
                    out.push_str("| ");
                }
                let board = Position::ALL[(row / 3) * 3 + col / 3];
                let cell = Position::ALL[(row % 3) * 3 + col % 3];
                let symbol = match self.get(board, cell) {
                    Mark::Empty => '.',
                    Mark::Occupied(Player::X) => 'X',
                    Mark::Occupied(Player::O) => 'O',
                };
                out.push(symbol);
                if col < 8 {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}
