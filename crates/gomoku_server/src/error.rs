//! Error types for the move service.

use crate::llm_client::LlmError;
use derive_more::{Display, Error};
use gomoku_rules::MoveViolation;
use tracing::{instrument, warn};

/// Failure categories surfaced to callers of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveErrorKind {
    /// The request failed schema or invariant checks.
    #[display("{_0}")]
    MalformedRequest(String),
    /// The requested provider has no credential.
    #[display("{provider} AI service not configured: {message}")]
    NotConfigured {
        /// Provider display name.
        provider: String,
        /// What is missing.
        message: String,
    },
    /// The board has no empty cell.
    #[display("No valid moves available")]
    NoValidMoves,
    /// A provider returned a move that failed validation.
    #[display("AI generated an invalid move: {violation}")]
    InvalidProviderMove {
        /// Why the move was rejected.
        violation: MoveViolation,
    },
    /// Anything else (for example a provider task that panicked).
    #[display("Internal error: {_0}")]
    Internal(String),
}

/// Orchestrator error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Move error: {} at {}:{}", kind, file, line)]
pub struct MoveError {
    /// Error kind.
    pub kind: MoveErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl MoveError {
    /// Creates a new move error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: MoveErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a malformed request.
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(MoveErrorKind::MalformedRequest(message.into()))
    }

    /// True when the caller sent something unusable.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self.kind,
            MoveErrorKind::MalformedRequest(_) | MoveErrorKind::NoValidMoves
        )
    }
}

/// Why a provider call did not produce a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProviderErrorKind {
    /// Network or HTTP failure.
    #[display("transport failure")]
    Transport,
    /// Reply could not be turned into a move.
    #[display("malformed response")]
    MalformedResponse,
    /// The call exceeded its time budget.
    #[display("timed out")]
    Timeout,
    /// The provider found nothing to play.
    #[display("no move produced")]
    NoMove,
}

/// Provider failure. Never shown to callers; the orchestrator absorbs it.
#[derive(Debug, Clone, Display, Error)]
#[display("Provider error ({}): {} at {}:{}", kind, message, file, line)]
pub struct ProviderError {
    /// Failure category.
    pub kind: ProviderErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ProviderError {
    /// Creates a new provider error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        warn!(kind = %kind, error_message = %message, "Provider error created");
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<LlmError> for ProviderError {
    #[track_caller]
    fn from(err: LlmError) -> Self {
        let kind = if err.timed_out {
            ProviderErrorKind::Timeout
        } else {
            ProviderErrorKind::Transport
        };
        Self::new(kind, err.message)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
