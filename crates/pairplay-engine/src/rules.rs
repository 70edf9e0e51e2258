//! Tic-tac-toe rules that don't depend on who is asking.

use pairplay_protocol::Mark;
use pairplay_session::{Board, Player};

/// The eight winning lines: three rows, three columns, two diagonals.
pub const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Returns the mark that owns a complete line, if any.
///
/// Only one mark moves per turn, so at most one winner can appear on any
/// given move; scan order does not matter.
pub fn winning_mark(board: &Board) -> Option<Mark> {
    let cells = board.cells();
    LINES.iter().find_map(|line| {
        let [a, b, c] = line.map(|(row, col)| cells[row][col]);
        match a {
            Some(mark) if b == a && c == a => Some(mark),
            _ => None,
        }
    })
}

/// The mark the next joiner receives: `X` unless a seated player holds it.
pub fn next_mark(players: &[Player]) -> Mark {
    if players.iter().any(|p| p.mark == Mark::X) {
        Mark::O
    } else {
        Mark::X
    }
}
