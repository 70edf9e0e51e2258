//! The 3x3 grid.

use pairplay_protocol::{BoardView, CellView, Mark};

/// Width and height of the board.
pub const BOARD_SIZE: usize = 3;

/// A 3x3 tic-tac-toe board. `None` is an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Option<Mark>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell at `(row, col)`, or `None` if the coordinates are
    /// off the board. The inner `Option` is the cell's content.
    pub fn get(&self, row: usize, col: usize) -> Option<Option<Mark>> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Writes `mark` at `(row, col)`.
    ///
    /// Returns `false` and leaves the board untouched if the coordinates
    /// are off the board or the cell is already taken.
    pub fn place(&mut self, row: usize, col: usize, mark: Mark) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) if cell.is_none() => {
                *cell = Some(mark);
                true
            }
            _ => false,
        }
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells = Default::default();
    }

    /// Row-major access to the raw cells.
    pub fn cells(&self) -> &[[Option<Mark>; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Builds the wire snapshot of this board.
    pub fn view(&self) -> BoardView {
        BoardView(self.cells.map(|row| row.map(CellView::from)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert!(!board.is_full());
        assert_eq!(board.occupied(), 0);
    }

    #[test]
    fn test_place_writes_empty_cell() {
        let mut board = Board::new();
        assert!(board.place(1, 2, Mark::X));
        assert_eq!(board.get(1, 2), Some(Some(Mark::X)));
        assert_eq!(board.occupied(), 1);
    }

    #[test]
    fn test_place_refuses_occupied_cell() {
        let mut board = Board::new();
        board.place(0, 0, Mark::X);
        assert!(!board.place(0, 0, Mark::O));
        assert_eq!(board.get(0, 0), Some(Some(Mark::X)));
    }

    #[test]
    fn test_place_refuses_out_of_range() {
        let mut board = Board::new();
        assert!(!board.place(3, 0, Mark::X));
        assert!(!board.place(0, 3, Mark::X));
        assert_eq!(board.get(3, 3), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_full_and_clear() {
        let mut board = Board::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                board.place(row, col, Mark::O);
            }
        }
        assert!(board.is_full());
        board.clear();
        assert!(board.is_empty());
    }

    #[test]
    fn test_view_maps_cells() {
        let mut board = Board::new();
        board.place(2, 1, Mark::O);
        let view = board.view();
        assert_eq!(view.cell(2, 1), Some(CellView::O));
        assert_eq!(view.cell(0, 0), Some(CellView::Empty));
    }
}
