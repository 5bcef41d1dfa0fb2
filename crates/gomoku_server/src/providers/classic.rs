//! Heuristic AI that scores empty cells by the winning lines through them.

use super::{AiKind, MoveProvider, ProviderMove};
use crate::error::{ProviderError, ProviderErrorKind};
use gomoku_rules::{Board, Cell, Player, index_to_coords, winning_lines};
use tracing::{debug, instrument};

const CENTER_THOUGHT: &str = "Taking the center to keep every direction open.";
const WIN_THOUGHT: &str = "This completes my line. Game over!";
const BLOCK_THOUGHT: &str = "I must block your line before you complete it.";
const ATTACK_THOUGHT: &str = "Extending my strongest line while it is still open.";
const DEFEND_THOUGHT: &str = "Cutting into your most promising shape.";

/// Deterministic local heuristic.
#[derive(Debug, Clone)]
pub struct ClassicProvider {
    run_length: usize,
}

/// Per-cell accumulated scores.
#[derive(Debug, Clone, Copy, Default)]
struct CellScore {
    attack: u64,
    defense: u64,
}

impl CellScore {
    fn total(self) -> u64 {
        self.attack.saturating_add(self.defense)
    }
}

impl ClassicProvider {
    /// Creates a heuristic player for `run_length`-in-a-row.
    pub fn new(run_length: usize) -> Self {
        Self { run_length }
    }

    /// Chooses a cell index and rationale, or `None` on a full board.
    #[instrument(skip(self, board), fields(size = board.size()))]
    pub fn choose(&self, board: &Board, ai_player: Player) -> Option<(usize, &'static str)> {
        let empties = board.empty_indices();
        if empties.is_empty() {
            return None;
        }

        let size = board.size();
        let center = index_of_center(size);
        if board.stone_count() == 0 {
            return Some((center, CENTER_THOUGHT));
        }

        let lines = winning_lines(size, self.run_length);
        let opponent = ai_player.opponent();
        let mut scores = vec![CellScore::default(); board.cells().len()];
        let mut block = None;

        for line in lines.iter() {
            let mut own = 0u32;
            let mut theirs = 0u32;
            let mut open = Vec::with_capacity(line.len());
            for &index in line.indices() {
                match board.get(index) {
                    Some(Cell::Occupied(p)) if p == ai_player => own += 1,
                    Some(Cell::Occupied(_)) => theirs += 1,
                    _ => open.push(index),
                }
            }

            if open.len() == 1 {
                if theirs == 0 {
                    debug!(index = open[0], "Winning move found");
                    return Some((open[0], WIN_THOUGHT));
                }
                if own == 0 && block.is_none() {
                    block = Some(open[0]);
                }
            }

            if theirs == 0 {
                for &index in &open {
                    scores[index].attack = scores[index].attack.saturating_add(weight(own, 10));
                }
            } else if own == 0 {
                for &index in &open {
                    scores[index].defense =
                        scores[index].defense.saturating_add(weight(theirs, 9));
                }
            }
        }

        if let Some(index) = block {
            debug!(index, ?opponent, "Blocking opponent win");
            return Some((index, BLOCK_THOUGHT));
        }

        let best = empties.into_iter().max_by(|&a, &b| {
            scores[a]
                .total()
                .cmp(&scores[b].total())
                .then_with(|| distance(b, center, size).cmp(&distance(a, center, size)))
                .then_with(|| b.cmp(&a))
        })?;

        let score = scores[best];
        debug!(index = best, attack = score.attack, defense = score.defense, "Heuristic pick");
        let thought = if score.defense > score.attack {
            DEFEND_THOUGHT
        } else {
            ATTACK_THOUGHT
        };
        Some((best, thought))
    }
}

#[async_trait::async_trait]
impl MoveProvider for ClassicProvider {
    fn kind(&self) -> AiKind {
        AiKind::Classic
    }

    #[instrument(skip(self, board), fields(size = board.size()))]
    async fn select_move(
        &self,
        board: &Board,
        ai_player: Player,
    ) -> Result<ProviderMove, ProviderError> {
        let (index, thought) = self.choose(board, ai_player).ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::NoMove, "No empty cell to play")
        })?;
        let coordinate = index_to_coords(index, board.size());
        Ok(ProviderMove::new(
            coordinate.row as i64,
            coordinate.col as i64,
            thought.to_string(),
        ))
    }
}

/// `base * 10^stones`, saturating.
fn weight(stones: u32, base: u64) -> u64 {
    10u64.saturating_pow(stones).saturating_mul(base)
}

fn index_of_center(size: usize) -> usize {
    (size / 2) * size + size / 2
}

/// Chebyshev distance between two cells.
fn distance(a: usize, b: usize, size: usize) -> usize {
    let a = index_to_coords(a, size);
    let b = index_to_coords(b, size);
    a.row.abs_diff(b.row).max(a.col.abs_diff(b.col))
}
