//! Square Gomoku board stored in row-major order.

use crate::error::{BoardError, BoardErrorKind};
use crate::types::{Cell, Coordinate, Player, coords_to_index};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// Largest accepted board edge.
pub const MAX_BOARD_SIZE: usize = 1024;

/// N×N board.
///
/// Invariant: `cells.len() == size * size` and `size > 0`. Cells can only
/// change through [`Board::place`], which refuses occupied cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Errors
    ///
    /// Returns a `ZeroSize` error when `size` is zero, `TooLarge` above
    /// [`MAX_BOARD_SIZE`].
    #[instrument]
    pub fn new(size: usize) -> Result<Self, BoardError> {
        let count = cell_count(size)?;
        Self::from_cells(vec![Cell::Empty; count], size)
    }

    /// Builds a board from already-typed cells.
    ///
    /// # Errors
    ///
    /// Returns a malformed-board error when `size` is zero or too large, or
    /// the cell count is not `size * size`.
    #[instrument(skip(cells), fields(len = cells.len()))]
    pub fn from_cells(cells: Vec<Cell>, size: usize) -> Result<Self, BoardError> {
        let expected = cell_count(size)?;
        if cells.len() != expected {
            return Err(BoardError::new(BoardErrorKind::LengthMismatch {
                actual: cells.len(),
                expected,
            }));
        }
        Ok(Self { size, cells })
    }

    /// Builds a board from raw JSON cell values (`null`, `"X"` or `"O"`).
    ///
    /// # Errors
    ///
    /// Returns a malformed-board error naming the first offending index, or a
    /// length mismatch.
    #[instrument(skip(values), fields(len = values.len()))]
    pub fn from_json(values: &[Value], size: usize) -> Result<Self, BoardError> {
        let expected = cell_count(size)?;
        if values.len() != expected {
            return Err(BoardError::new(BoardErrorKind::LengthMismatch {
                actual: values.len(),
                expected,
            }));
        }

        let cells = values
            .iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Null => Ok(Cell::Empty),
                Value::String(marker) => Player::from_marker(marker)
                    .map(Cell::Occupied)
                    .ok_or_else(|| invalid_cell(index, value)),
                other => Err(invalid_cell(index, other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(size, "Board parsed from JSON");
        Self::from_cells(cells, size)
    }

    /// Board edge length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Gets the cell at a linear index.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Gets the cell at a coordinate.
    pub fn get_at(&self, coordinate: Coordinate) -> Option<Cell> {
        if coordinate.row >= self.size || coordinate.col >= self.size {
            return None;
        }
        self.get(coords_to_index(coordinate.row, coordinate.col, self.size))
    }

    /// Checks if the cell at `index` exists and is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Linear indices of every empty cell, ascending.
    pub fn empty_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(index, _)| index)
            .collect()
    }

    /// True when no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Cell::Empty)
    }

    /// Number of occupied cells.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != Cell::Empty).count()
    }

    /// Places a stone into an empty cell.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` or `Occupied`; the board is left untouched.
    #[instrument(skip(self), fields(size = self.size))]
    pub fn place(&mut self, index: usize, player: Player) -> Result<(), BoardError> {
        let cells = self.cells.len();
        match self.cells.get_mut(index) {
            None => Err(BoardError::new(BoardErrorKind::OutOfBounds { index, cells })),
            Some(Cell::Occupied(_)) => Err(BoardError::new(BoardErrorKind::Occupied { index })),
            Some(cell) => {
                *cell = Cell::Occupied(player);
                Ok(())
            }
        }
    }

    /// Returns a copy of the board with `player` placed at `coordinate`.
    ///
    /// # Errors
    ///
    /// Same as [`Board::place`].
    pub fn with_move(&self, coordinate: Coordinate, player: Player) -> Result<Self, BoardError> {
        let mut next = self.clone();
        if coordinate.row >= self.size || coordinate.col >= self.size {
            return Err(BoardError::new(BoardErrorKind::OutOfBounds {
                index: coords_to_index(coordinate.row, coordinate.col, self.size),
                cells: self.cells.len(),
            }));
        }
        next.place(coords_to_index(coordinate.row, coordinate.col, self.size), player)?;
        Ok(next)
    }

    /// Formats the board with row and column labels.
    pub fn display(&self) -> String {
        let mut result = String::from("   ");
        for col in 0..self.size {
            result.push_str(&format!("{:>3}", col));
        }
        result.push('\n');
        for (row, chunk) in self.cells.chunks(self.size).enumerate() {
            result.push_str(&format!("{:>3}", row));
            for cell in chunk {
                result.push_str(&format!("{:>3}", cell.symbol()));
            }
            result.push('\n');
        }
        result
    }
}

#[track_caller]
fn invalid_cell(index: usize, value: &Value) -> BoardError {
    BoardError::new(BoardErrorKind::InvalidCell {
        index,
        value: value.to_string(),
    })
}

/// `size * size`, for sizes in `1..=MAX_BOARD_SIZE`.
fn cell_count(size: usize) -> Result<usize, BoardError> {
    if size == 0 {
        return Err(BoardError::new(BoardErrorKind::ZeroSize));
    }
    size.checked_mul(size)
        .filter(|_| size <= MAX_BOARD_SIZE)
        .ok_or_else(|| {
            BoardError::new(BoardErrorKind::TooLarge {
                size,
                max: MAX_BOARD_SIZE,
            })
        })
}
