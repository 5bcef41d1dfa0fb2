//! Move validation.
//!
//! Every move, whether typed by a human or produced by an AI provider, goes
//! through [`validate_move`] before it is trusted.

use crate::board::Board;
use crate::types::{Coordinate, coords_to_index};
use derive_more::{Display, Error};
use tracing::{debug, instrument};

/// Why a proposed move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveViolation {
    /// Row or column outside `[0, size)`.
    #[display("position ({row}, {col}) is outside the {size}x{size} board")]
    OutOfBounds {
        /// Proposed row.
        row: i64,
        /// Proposed column.
        col: i64,
        /// Board size.
        size: usize,
    },
    /// Target cell already holds a stone.
    #[display("position ({row}, {col}) is already occupied")]
    Occupied {
        /// Proposed row.
        row: usize,
        /// Proposed column.
        col: usize,
    },
}

/// Checks a proposed move and returns the in-bounds coordinate on success.
///
/// Coordinates are signed so that untrusted sources can be represented
/// faithfully and rejected.
///
/// # Errors
///
/// Returns [`MoveViolation`] when the position is out of bounds or occupied.
#[instrument(skip(board), fields(size = board.size()))]
pub fn validate_move(row: i64, col: i64, board: &Board) -> Result<Coordinate, MoveViolation> {
    let size = board.size();
    let in_range = |value: i64| usize::try_from(value).ok().filter(|&v| v < size);

    let (Some(r), Some(c)) = (in_range(row), in_range(col)) else {
        debug!("Move out of bounds");
        return Err(MoveViolation::OutOfBounds { row, col, size });
    };

    if !board.is_empty(coords_to_index(r, c, size)) {
        debug!("Move targets occupied cell");
        return Err(MoveViolation::Occupied { row: r, col: c });
    }

    Ok(Coordinate::new(r, c))
}

/// True iff `0 <= row < size`, `0 <= col < size` and the cell is empty.
pub fn is_valid_move(row: i64, col: i64, board: &Board) -> bool {
    validate_move(row, col, board).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;

    #[test]
    fn test_empty_in_bounds_is_valid() {
        let board = Board::new(15).unwrap();
        assert!(is_valid_move(0, 0, &board));
        assert!(is_valid_move(14, 14, &board));
        assert_eq!(validate_move(7, 3, &board), Ok(Coordinate::new(7, 3)));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let board = Board::new(15).unwrap();
        for (row, col) in [(-1, 0), (0, -1), (15, 0), (0, 15), (i64::MAX, 0), (i64::MIN, 3)] {
            assert!(!is_valid_move(row, col, &board), "({row}, {col})");
        }
        assert_eq!(
            validate_move(15, 2, &board),
            Err(MoveViolation::OutOfBounds {
                row: 15,
                col: 2,
                size: 15
            })
        );
    }

    #[test]
    fn test_occupied_rejected() {
        let mut board = Board::new(3).unwrap();
        board.place(4, Player::O).unwrap();
        assert!(!is_valid_move(1, 1, &board));
        assert_eq!(
            validate_move(1, 1, &board),
            Err(MoveViolation::Occupied { row: 1, col: 1 })
        );
    }
}
