//! Draw detection logic.

use super::win::check_winner;
use crate::board::Board;
use tracing::instrument;

/// Checks if the board is full (all cells occupied).
///
/// A full board with no winner indicates a draw.
#[instrument(skip(board), fields(size = board.size()))]
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

/// Checks for a full board without a completed line.
#[instrument(skip(board), fields(size = board.size()))]
pub fn is_draw(board: &Board, run_length: usize) -> bool {
    is_full(board) && check_winner(board, run_length).is_none()
}
