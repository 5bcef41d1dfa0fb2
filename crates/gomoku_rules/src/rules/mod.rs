//! Game rules for Gomoku.
//!
//! Pure functions for evaluating board state. Rules are separated from
//! board storage so they can be reused by any move source.

pub mod draw;
pub mod lines;
pub mod validate;
pub mod win;

pub use draw::{is_draw, is_full};
pub use lines::{WinningLine, expected_line_count, generate_winning_lines, winning_lines};
pub use validate::{MoveViolation, is_valid_move, validate_move};
pub use win::{Evaluation, GameStatus, check_winner, evaluate, find_winning_line};
