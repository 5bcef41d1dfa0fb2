//! Gomoku rules - board model, win detection and move validation
//!
//! Pure game logic with no I/O. The same code checks human moves and
//! polices moves coming from untrusted AI providers.
//!
//! # Example
//!
//! ```
//! use gomoku_rules::{Board, Player, evaluate};
//!
//! let mut board = Board::new(3).unwrap();
//! for index in 0..3 {
//!     board.place(index, Player::X).unwrap();
//! }
//! let evaluation = evaluate(&board, 3);
//! assert_eq!(evaluation.winner(), Some(Player::X));
//! assert_eq!(evaluation.winning_line().indices(), &[0, 1, 2]);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod rules;
mod types;

/// Stones in a row needed to win a standard Gomoku game.
pub const GOMOKU_RUN_LENGTH: usize = 5;

pub use board::{Board, MAX_BOARD_SIZE};
pub use error::{BoardError, BoardErrorKind};
pub use rules::{
    Evaluation, GameStatus, MoveViolation, WinningLine, check_winner, evaluate,
    expected_line_count, find_winning_line, generate_winning_lines, is_draw, is_full,
    is_valid_move, validate_move, winning_lines,
};
pub use types::{Cell, Coordinate, Player, coords_to_index, index_to_coords};
