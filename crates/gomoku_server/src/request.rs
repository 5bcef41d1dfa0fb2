//! Boundary validation for loosely-typed JSON request bodies.
//!
//! Nothing about the incoming body is trusted: field presence, JSON types
//! and board shape are all checked here before any game logic runs.

use crate::error::MoveError;
use gomoku_rules::{Board, Player};
use serde_json::Value;
use tracing::{debug, instrument};

/// A validated request for an AI move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    board: Board,
    ai_player: Player,
}

impl MoveRequest {
    /// Creates a request from already-validated parts.
    pub fn new(board: Board, ai_player: Player) -> Self {
        Self { board, ai_player }
    }

    /// Validates `{ board, size, aiPlayer }`.
    ///
    /// # Errors
    ///
    /// Returns a malformed-request error naming the offending field.
    #[instrument(skip(body))]
    pub fn from_json(body: &Value, max_board_size: usize) -> Result<Self, MoveError> {
        let fields = require_object(body)?;
        let values = require_board(fields.get("board"))?;
        let size = require_size(fields.get("size"), "Size", max_board_size)?;

        let ai_player = fields
            .get("aiPlayer")
            .and_then(Value::as_str)
            .and_then(Player::from_marker)
            .ok_or_else(|| MoveError::malformed("aiPlayer must be \"X\" or \"O\""))?;

        let board = parse_board(values, size)?;
        debug!(size, ai_player = %ai_player, "Move request validated");
        Ok(Self { board, ai_player })
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side the AI plays.
    pub fn ai_player(&self) -> Player {
        self.ai_player
    }

    /// Splits into parts.
    pub fn into_parts(self) -> (Board, Player) {
        (self.board, self.ai_player)
    }
}

/// A validated request to evaluate a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluateRequest {
    /// Board to evaluate.
    pub board: Board,
    /// Explicit run length, if the caller sent one.
    pub run_length: Option<usize>,
}

impl EvaluateRequest {
    /// Validates `{ board, size, runLength? }`.
    ///
    /// # Errors
    ///
    /// Returns a malformed-request error naming the offending field.
    #[instrument(skip(body))]
    pub fn from_json(body: &Value, max_board_size: usize) -> Result<Self, MoveError> {
        let fields = require_object(body)?;
        let values = require_board(fields.get("board"))?;
        let size = require_size(fields.get("size"), "Size", max_board_size)?;
        let run_length = match fields.get("runLength") {
            None | Some(Value::Null) => None,
            Some(value) => Some(require_size(Some(value), "runLength", max_board_size)?),
        };

        let board = parse_board(values, size)?;
        Ok(Self { board, run_length })
    }
}

fn require_object(body: &Value) -> Result<&serde_json::Map<String, Value>, MoveError> {
    body.as_object()
        .ok_or_else(|| MoveError::malformed("Request body must be a JSON object"))
}

fn require_board(value: Option<&Value>) -> Result<&[Value], MoveError> {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| MoveError::malformed("Board must be an array"))
}

fn require_size(value: Option<&Value>, field: &str, max: usize) -> Result<usize, MoveError> {
    let size = value
        .and_then(Value::as_u64)
        .filter(|&n| n > 0)
        .ok_or_else(|| MoveError::malformed(format!("{} must be a positive integer", field)))?;

    usize::try_from(size)
        .ok()
        .filter(|&n| n <= max)
        .ok_or_else(|| MoveError::malformed(format!("{} must not exceed {}", field, max)))
}

fn parse_board(values: &[Value], size: usize) -> Result<Board, MoveError> {
    Board::from_json(values, size).map_err(|e| MoveError::malformed(e.kind.to_string()))
}
