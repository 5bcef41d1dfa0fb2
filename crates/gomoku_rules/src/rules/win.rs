//! Win detection and board evaluation.

use super::draw::is_full;
use super::lines::{WinningLine, winning_lines};
use crate::board::Board;
use crate::types::{Cell, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended in a win.
    Won(Player),
    /// Game ended in a draw.
    Draw,
}

/// Result of scanning a board.
///
/// Serializes as `{ "winner": "X" | "O" | "Draw" | null, "winningLine": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EvaluationWire", from = "EvaluationWire")]
pub struct Evaluation {
    status: GameStatus,
    winning_line: WinningLine,
}

impl Evaluation {
    fn won(player: Player, line: WinningLine) -> Self {
        Self {
            status: GameStatus::Won(player),
            winning_line: line,
        }
    }

    fn unfinished(status: GameStatus) -> Self {
        Self {
            status,
            winning_line: WinningLine::new(Vec::new()),
        }
    }

    /// Game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The winner, if any.
    pub fn winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Won(player) => Some(player),
            _ => None,
        }
    }

    /// Winning line; empty unless somebody won.
    pub fn winning_line(&self) -> &WinningLine {
        &self.winning_line
    }

    /// True once the game is won or drawn.
    pub fn is_over(&self) -> bool {
        self.status != GameStatus::InProgress
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationWire {
    winner: Option<String>,
    winning_line: Vec<usize>,
}

impl From<Evaluation> for EvaluationWire {
    fn from(evaluation: Evaluation) -> Self {
        let winner = match evaluation.status {
            GameStatus::InProgress => None,
            GameStatus::Won(player) => Some(player.to_string()),
            GameStatus::Draw => Some("Draw".to_string()),
        };
        Self {
            winner,
            winning_line: evaluation.winning_line.into(),
        }
    }
}

impl From<EvaluationWire> for Evaluation {
    fn from(wire: EvaluationWire) -> Self {
        let status = match wire.winner.as_deref() {
            Some("Draw") => GameStatus::Draw,
            Some(marker) => Player::from_marker(marker)
                .map(GameStatus::Won)
                .unwrap_or(GameStatus::InProgress),
            None => GameStatus::InProgress,
        };
        Self {
            status,
            winning_line: WinningLine::new(wire.winning_line),
        }
    }
}

/// Returns the first completed line in generation order and its owner.
pub fn find_winning_line<'a>(
    board: &Board,
    lines: &'a [WinningLine],
) -> Option<(Player, &'a WinningLine)> {
    lines.iter().find_map(|line| {
        let (&first, rest) = line.indices().split_first()?;
        let Some(Cell::Occupied(player)) = board.get(first) else {
            return None;
        };
        rest.iter()
            .all(|&index| board.get(index) == Some(Cell::Occupied(player)))
            .then_some((player, line))
    })
}

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` if the player has `run_length` in a row,
/// `None` otherwise.
#[instrument(skip(board), fields(size = board.size()))]
pub fn check_winner(board: &Board, run_length: usize) -> Option<Player> {
    let lines = winning_lines(board.size(), run_length);
    find_winning_line(board, &lines).map(|(player, _)| player)
}

/// Evaluates the board: first won line, otherwise draw or in progress.
#[instrument(skip(board), fields(size = board.size()))]
pub fn evaluate(board: &Board, run_length: usize) -> Evaluation {
    let lines = winning_lines(board.size(), run_length);

    if let Some((player, line)) = find_winning_line(board, &lines) {
        debug!(winner = %player, line = ?line.indices(), "Winning line found");
        return Evaluation::won(player, line.clone());
    }

    if is_full(board) {
        debug!("Board full with no winner");
        Evaluation::unfinished(GameStatus::Draw)
    } else {
        Evaluation::unfinished(GameStatus::InProgress)
    }
}
