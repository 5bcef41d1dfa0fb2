//! Core domain types for Gomoku.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Player in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Player {
    /// Player X (player A).
    X,
    /// Player O (player B).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Parses the wire marker (`"X"` or `"O"`), rejecting anything else.
    pub fn from_marker(marker: &str) -> Option<Self> {
        marker.parse().ok()
    }
}

/// Occupancy of a single board cell.
///
/// Serialized as `null` for an empty cell and `"X"`/`"O"` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Player>", into = "Option<Player>")]
pub enum Cell {
    /// Empty cell.
    Empty,
    /// Cell occupied by a player.
    Occupied(Player),
}

impl Cell {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }

    /// Single-character rendering used by board displays.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Occupied(Player::X) => 'X',
            Cell::Occupied(Player::O) => 'O',
        }
    }
}

impl From<Option<Player>> for Cell {
    fn from(value: Option<Player>) -> Self {
        value.map_or(Cell::Empty, Cell::Occupied)
    }
}

impl From<Cell> for Option<Player> {
    fn from(cell: Cell) -> Self {
        cell.player()
    }
}

/// A (row, col) position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl Coordinate {
    /// Creates a coordinate.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Converts a (row, col) pair into a row-major linear index.
pub fn coords_to_index(row: usize, col: usize, size: usize) -> usize {
    row * size + col
}

/// Converts a row-major linear index back into a coordinate.
pub fn index_to_coords(index: usize, size: usize) -> Coordinate {
    Coordinate::new(index / size, index % size)
}
