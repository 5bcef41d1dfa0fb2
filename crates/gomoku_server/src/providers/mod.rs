//! Move provider trait and implementations.

mod classic;
mod external;
mod fallback;

pub use classic::ClassicProvider;
pub use external::{ExternalProvider, parse_move_reply};
pub use fallback::{FALLBACK_THOUGHT, fallback_move};

use crate::error::ProviderError;
use derive_new::new;
use gomoku_rules::{Board, Player};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which kind of AI a caller asked for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AiKind {
    /// Local heuristic engine, always available.
    Classic,
    /// Remote language-model provider, needs a credential.
    External,
}

/// A move as proposed by a provider, before validation.
///
/// Coordinates are signed because providers are untrusted and may return
/// anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ProviderMove {
    /// Proposed row.
    pub row: i64,
    /// Proposed column.
    pub col: i64,
    /// Provider's explanation.
    pub thought: String,
}

/// Trait for sources of AI moves.
#[async_trait::async_trait]
pub trait MoveProvider: Send + Sync + std::fmt::Debug {
    /// Kind reported in responses.
    fn kind(&self) -> AiKind;

    /// Picks a move for `ai_player`.
    ///
    /// Implementations may return anything; the orchestrator validates the
    /// result before trusting it.
    async fn select_move(
        &self,
        board: &Board,
        ai_player: Player,
    ) -> Result<ProviderMove, ProviderError>;
}
