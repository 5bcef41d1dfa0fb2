//! Board error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong while building or mutating a board.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BoardErrorKind {
    /// Cell count differs from size².
    #[display("Board length {actual} does not match expected size {expected}")]
    LengthMismatch {
        /// Cells supplied.
        actual: usize,
        /// size * size.
        expected: usize,
    },
    /// A cell held something other than null, "X" or "O".
    #[display("Invalid board value at index {index}: {value}")]
    InvalidCell {
        /// Offending index.
        index: usize,
        /// JSON rendering of the offending value.
        value: String,
    },
    /// Board size of zero.
    #[display("Board size must be a positive number")]
    ZeroSize,
    /// Board edge above the supported maximum.
    #[display("Board size {size} exceeds the maximum of {max}")]
    TooLarge {
        /// Requested edge length.
        size: usize,
        /// Largest accepted edge length.
        max: usize,
    },
    /// Write outside the board.
    #[display("Index {index} is outside a board of {cells} cells")]
    OutOfBounds {
        /// Requested index.
        index: usize,
        /// Total cells on the board.
        cells: usize,
    },
    /// Write into an occupied cell.
    #[display("Cell {index} is already occupied")]
    Occupied {
        /// Requested index.
        index: usize,
    },
}

/// Board error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Board error: {} at {}:{}", kind, file, line)]
pub struct BoardError {
    /// Error kind.
    pub kind: BoardErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BoardError {
    /// Creates a new board error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: BoardErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// True for shape errors raised while constructing a board.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.kind,
            BoardErrorKind::LengthMismatch { .. }
                | BoardErrorKind::InvalidCell { .. }
                | BoardErrorKind::ZeroSize
                | BoardErrorKind::TooLarge { .. }
        )
    }
}
