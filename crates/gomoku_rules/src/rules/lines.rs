//! Winning line generation.
//!
//! Lines are emitted in a fixed order (rows, columns, down-right diagonals,
//! down-left diagonals). The evaluator reports the first completed line in
//! this order, so the order is part of the contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, instrument};

/// One candidate set of board indices that wins when uniformly occupied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinningLine(Vec<usize>);

impl WinningLine {
    /// Wraps a list of linear indices.
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Indices in line order.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of cells in the line.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty line used when nobody has won.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the line passes through `index`.
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }
}

impl From<WinningLine> for Vec<usize> {
    fn from(line: WinningLine) -> Self {
        line.0
    }
}

type LineKey = (usize, usize);

static LINE_CACHE: OnceLock<Mutex<HashMap<LineKey, Arc<[WinningLine]>>>> = OnceLock::new();

/// Number of lines [`generate_winning_lines`] yields for these parameters.
pub fn expected_line_count(size: usize, run_length: usize) -> usize {
    if run_length == 0 || size < run_length {
        return 0;
    }
    let starts = size - run_length + 1;
    2 * size * starts + 2 * starts * starts
}

/// Generates every winning line for a `size`×`size` board.
///
/// Returns an empty list when no line fits (`size < run_length`) or when
/// `run_length` is zero.
#[instrument]
pub fn generate_winning_lines(size: usize, run_length: usize) -> Vec<WinningLine> {
    if run_length == 0 || size < run_length {
        debug!("No winning line fits on this board");
        return Vec::new();
    }

    let span = size - run_length;
    let line = |start: usize, step: usize| {
        WinningLine((0..run_length).map(|i| start + i * step).collect())
    };

    let mut lines = Vec::with_capacity(expected_line_count(size, run_length));

    // Rows
    for r in 0..size {
        for c in 0..=span {
            lines.push(line(r * size + c, 1));
        }
    }

    // Columns
    for c in 0..size {
        for r in 0..=span {
            lines.push(line(r * size + c, size));
        }
    }

    // Diagonals, top-left to bottom-right
    for r in 0..=span {
        for c in 0..=span {
            lines.push(line(r * size + c, size + 1));
        }
    }

    // Diagonals, top-right to bottom-left
    for r in 0..=span {
        for c in (run_length - 1..size).rev() {
            lines.push(line(r * size + c, size - 1));
        }
    }

    debug!(count = lines.len(), "Generated winning lines");
    lines
}

/// Memoized [`generate_winning_lines`], shared across threads.
///
/// The lock is held only for lookup and insert. Two callers racing on a new
/// key may both compute the list; the first insert wins.
#[instrument]
pub fn winning_lines(size: usize, run_length: usize) -> Arc<[WinningLine]> {
    let cache = LINE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = (size, run_length);

    if let Some(lines) = cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Arc::clone(lines);
    }

    let computed: Arc<[WinningLine]> = generate_winning_lines(size, run_length).into();
    let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(guard.entry(key).or_insert(computed))
}
