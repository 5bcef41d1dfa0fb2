//! AI move orchestration.
//!
//! A request moves through fixed stages:
//! `Received → Validated → Dispatched → ProviderResult → PostValidated → Responded`.
//! Provider failures are absorbed into a random fallback move and recorded on
//! the outcome as [`MoveSource::Fallback`]; everything else leaves through a
//! typed [`MoveError`].

use crate::config::ServerConfig;
use crate::error::{ConfigError, MoveError, MoveErrorKind, ProviderError, ProviderErrorKind};
use crate::llm_client::LlmClient;
use crate::providers::{
    AiKind, ClassicProvider, ExternalProvider, MoveProvider, ProviderMove, fallback_move,
};
use crate::request::{EvaluateRequest, MoveRequest};
use gomoku_rules::{Board, Coordinate, Evaluation, GameStatus, Player, evaluate, validate_move};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use strum::Display;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Orchestration stages, used for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    /// Raw body received.
    Received,
    /// Schema and invariants checked.
    Validated,
    /// Provider selected and invoked.
    Dispatched,
    /// Provider answered, failed, or was replaced by fallback.
    ProviderResult,
    /// Move passed the validator.
    PostValidated,
    /// Outcome handed back.
    Responded,
}

/// Tunables for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Stones in a row needed to win.
    pub run_length: usize,
    /// Largest accepted board edge.
    pub max_board_size: usize,
    /// Budget for one provider call.
    pub provider_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            run_length: gomoku_rules::GOMOKU_RUN_LENGTH,
            max_board_size: 25,
            provider_timeout: Duration::from_secs(15),
        }
    }
}

/// The external provider slot.
#[derive(Debug, Clone)]
pub enum ExternalSlot {
    /// A credential is configured.
    Configured(Arc<dyn MoveProvider>),
    /// No credential; requests get a service-unavailable error.
    Missing {
        /// What is missing, e.g. `GEMINI_API_KEY environment variable not set`.
        reason: String,
    },
}

/// Availability of one provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    /// Ready to serve.
    Available,
    /// Missing configuration.
    NotConfigured,
}

/// Availability of every provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    /// Classic heuristic.
    pub classic: Availability,
    /// External LLM.
    pub external: Availability,
}

/// A provider failure that was absorbed by the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsorbedFailure {
    /// Failure category.
    pub kind: ProviderErrorKind,
    /// Failure detail, for logs.
    pub message: String,
}

impl From<ProviderError> for AbsorbedFailure {
    fn from(err: ProviderError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
        }
    }
}

/// Where the returned move came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveSource {
    /// The requested provider.
    Provider,
    /// Random fallback after the provider failed.
    Fallback(AbsorbedFailure),
}

/// A validated AI move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The move; always an empty in-bounds cell of the request board.
    pub coordinate: Coordinate,
    /// Rationale text.
    pub thought: String,
    /// Provider kind that was requested.
    pub kind: AiKind,
    /// Provider or fallback.
    pub source: MoveSource,
    /// Board evaluation after the move.
    pub evaluation: Evaluation,
}

impl MoveOutcome {
    /// True when the fallback produced the move.
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, MoveSource::Fallback(_))
    }
}

/// Provider call failures, split by whether fallback may absorb them.
#[derive(Debug)]
enum DispatchFailure {
    Absorbed(AbsorbedFailure),
    Crashed(String),
}

/// Aborts the wrapped task when dropped, so an abandoned request stops its
/// provider call.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Validates requests, dispatches to providers, polices their output.
#[derive(Debug, Clone)]
pub struct AiOrchestrator {
    settings: OrchestratorSettings,
    classic: Arc<dyn MoveProvider>,
    external: ExternalSlot,
}

impl AiOrchestrator {
    /// Creates an orchestrator over explicit providers.
    #[instrument(skip(classic, external))]
    pub fn new(
        settings: OrchestratorSettings,
        classic: Arc<dyn MoveProvider>,
        external: ExternalSlot,
    ) -> Self {
        info!(
            external_configured = matches!(external, ExternalSlot::Configured(_)),
            "Creating AI orchestrator"
        );
        Self {
            settings,
            classic,
            external,
        }
    }

    /// Wires the classic heuristic and, when a credential exists, the LLM provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the LLM HTTP client cannot be built.
    #[instrument(skip(config))]
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let settings = OrchestratorSettings {
            run_length: *config.run_length(),
            max_board_size: *config.max_board_size(),
            provider_timeout: config.provider_timeout(),
        };

        let classic: Arc<dyn MoveProvider> = Arc::new(ClassicProvider::new(settings.run_length));

        let external = match config.llm_config() {
            Some(llm) => {
                let client = LlmClient::new(llm, settings.provider_timeout)
                    .map_err(|e| ConfigError::new(e.message))?;
                ExternalSlot::Configured(Arc::new(ExternalProvider::new(
                    client,
                    settings.run_length,
                )))
            }
            None => ExternalSlot::Missing {
                reason: format!(
                    "{} environment variable not set",
                    config.llm_provider().api_key_var()
                ),
            },
        };

        Ok(Self::new(settings, classic, external))
    }

    /// Settings in use.
    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Reports which providers can serve requests.
    pub fn status(&self) -> ProviderStatus {
        ProviderStatus {
            classic: Availability::Available,
            external: match self.external {
                ExternalSlot::Configured(_) => Availability::Available,
                ExternalSlot::Missing { .. } => Availability::NotConfigured,
            },
        }
    }

    /// Full pipeline from a raw JSON body.
    ///
    /// # Errors
    ///
    /// See [`AiOrchestrator::request_move`]; additionally returns a malformed
    /// request error when the body fails validation.
    #[instrument(skip(self, body))]
    pub async fn handle(&self, kind: AiKind, body: &Value) -> Result<MoveOutcome, MoveError> {
        debug!(stage = %Stage::Received, "Move request received");
        let request = MoveRequest::from_json(body, self.settings.max_board_size)?;
        self.request_move(kind, request).await
    }

    /// Runs a validated request through dispatch, fallback and post-validation.
    ///
    /// # Errors
    ///
    /// - `MalformedRequest` if the board already holds a completed line.
    /// - `NotConfigured` if `kind` is external without a credential.
    /// - `NoValidMoves` if the board is full.
    /// - `InvalidProviderMove` if the provider's move fails validation.
    /// - `Internal` if the provider task crashed.
    #[instrument(skip(self, request), fields(size = request.board().size(), ai_player = %request.ai_player()))]
    pub async fn request_move(
        &self,
        kind: AiKind,
        request: MoveRequest,
    ) -> Result<MoveOutcome, MoveError> {
        let (board, ai_player) = request.into_parts();
        let run_length = self.settings.run_length;

        if let GameStatus::Won(winner) = evaluate(&board, run_length).status() {
            return Err(MoveError::malformed(format!(
                "Game is already over: {} has won",
                winner
            )));
        }
        debug!(stage = %Stage::Validated, "Request validated");

        let provider = self.select_provider(kind)?;
        if board.is_full() {
            info!("Board is full, no move to make");
            return Err(MoveError::new(MoveErrorKind::NoValidMoves));
        }

        debug!(stage = %Stage::Dispatched, provider = %provider.kind(), "Dispatching to provider");
        let (proposal, source) = match self.dispatch(provider, &board, ai_player).await {
            Ok(proposal) => (proposal, MoveSource::Provider),
            Err(DispatchFailure::Absorbed(failure)) => {
                warn!(
                    kind = %failure.kind,
                    error = %failure.message,
                    "Provider failed, using random fallback"
                );
                let proposal = {
                    let mut rng = rand::rng();
                    fallback_move(&board, &mut rng)
                }
                .ok_or_else(|| MoveError::new(MoveErrorKind::NoValidMoves))?;
                (proposal, MoveSource::Fallback(failure))
            }
            Err(DispatchFailure::Crashed(detail)) => {
                error!(detail = %detail, "Provider task crashed");
                return Err(MoveError::new(MoveErrorKind::Internal(detail)));
            }
        };
        debug!(
            stage = %Stage::ProviderResult,
            row = proposal.row,
            col = proposal.col,
            fallback = matches!(source, MoveSource::Fallback(_)),
            "Provider result"
        );

        let coordinate = validate_move(proposal.row, proposal.col, &board).map_err(|violation| {
            error!(
                provider = %kind,
                row = proposal.row,
                col = proposal.col,
                violation = %violation,
                "Provider returned an invalid move"
            );
            MoveError::new(MoveErrorKind::InvalidProviderMove { violation })
        })?;
        debug!(stage = %Stage::PostValidated, %coordinate, "Move validated");

        let after = board
            .with_move(coordinate, ai_player)
            .map_err(|e| MoveError::new(MoveErrorKind::Internal(e.to_string())))?;
        let evaluation = evaluate(&after, run_length);

        info!(
            stage = %Stage::Responded,
            %coordinate,
            status = ?evaluation.status(),
            "AI move ready"
        );
        Ok(MoveOutcome {
            coordinate,
            thought: proposal.thought,
            kind,
            source,
            evaluation,
        })
    }

    /// Evaluates a board with the request's run length or the configured one.
    #[instrument(skip(self, request), fields(size = request.board.size()))]
    pub fn evaluate(&self, request: &EvaluateRequest) -> Evaluation {
        evaluate(
            &request.board,
            request.run_length.unwrap_or(self.settings.run_length),
        )
    }

    fn select_provider(&self, kind: AiKind) -> Result<Arc<dyn MoveProvider>, MoveError> {
        match (kind, &self.external) {
            (AiKind::Classic, _) => Ok(Arc::clone(&self.classic)),
            (AiKind::External, ExternalSlot::Configured(provider)) => Ok(Arc::clone(provider)),
            (AiKind::External, ExternalSlot::Missing { reason }) => {
                warn!(reason = %reason, "External AI requested but not configured");
                Err(MoveError::new(MoveErrorKind::NotConfigured {
                    provider: "External".to_string(),
                    message: reason.clone(),
                }))
            }
        }
    }

    /// Runs the provider on its own task under the configured timeout.
    async fn dispatch(
        &self,
        provider: Arc<dyn MoveProvider>,
        board: &Board,
        ai_player: Player,
    ) -> Result<ProviderMove, DispatchFailure> {
        let board = board.clone();
        let mut task = AbortOnDrop(tokio::spawn(async move {
            provider.select_move(&board, ai_player).await
        }));

        match tokio::time::timeout(self.settings.provider_timeout, &mut task.0).await {
            Err(_) => Err(DispatchFailure::Absorbed(AbsorbedFailure {
                kind: ProviderErrorKind::Timeout,
                message: format!(
                    "Provider did not answer within {:?}",
                    self.settings.provider_timeout
                ),
            })),
            Ok(Err(join_error)) => Err(DispatchFailure::Crashed(join_error.to_string())),
            Ok(Ok(Err(provider_error))) => Err(DispatchFailure::Absorbed(provider_error.into())),
            Ok(Ok(Ok(proposal))) => Ok(proposal),
        }
    }
}
