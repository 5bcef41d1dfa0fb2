//! Random empty-cell fallback used when a provider fails.

use super::ProviderMove;
use gomoku_rules::{Board, index_to_coords};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

/// Rationale attached to every fallback move.
pub const FALLBACK_THOUGHT: &str = "I had a momentary lapse of judgment and chose a random spot.";

/// Picks a uniformly random empty cell, or `None` on a full board.
#[instrument(skip(board, rng), fields(size = board.size()))]
pub fn fallback_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<ProviderMove> {
    let empties = board.empty_indices();
    let index = *empties.choose(rng)?;
    let coordinate = index_to_coords(index, board.size());
    debug!(index, "Fallback picked random cell");

    // Board edges are bounded well below i64::MAX, so the casts are lossless.
    Some(ProviderMove::new(
        coordinate.row as i64,
        coordinate.col as i64,
        FALLBACK_THOUGHT.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomoku_rules::{Cell, Player, is_valid_move};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_fallback_targets_empty_cell() {
        let mut board = Board::new(5).unwrap();
        for index in [0, 6, 12, 18, 24, 3, 9] {
            board.place(index, Player::X).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let mv = fallback_move(&board, &mut rng).unwrap();
            assert!(is_valid_move(mv.row, mv.col, &board));
            assert_eq!(mv.thought, FALLBACK_THOUGHT);
        }
    }

    #[test]
    fn test_fallback_single_empty_cell() {
        let mut cells = vec![Cell::Occupied(Player::O); 9];
        cells[5] = Cell::Empty;
        let board = Board::from_cells(cells, 3).unwrap();
        let mv = fallback_move(&board, &mut rand::rng()).unwrap();
        assert_eq!((mv.row, mv.col), (1, 2));
    }

    #[test]
    fn test_fallback_full_board() {
        let board = Board::from_cells(vec![Cell::Occupied(Player::X); 4], 2).unwrap();
        assert!(fallback_move(&board, &mut rand::rng()).is_none());
    }
}
