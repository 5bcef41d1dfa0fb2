//! Gomoku move service.
//!
//! Validates incoming boards, asks a move provider for the AI's reply, and
//! polices the answer before it leaves the server.
//!
//! # Architecture
//!
//! - **Request**: schema checks for loosely-typed JSON bodies
//! - **Providers**: classic heuristic, external LLM, random fallback
//! - **Orchestrator**: dispatch, timeout, fallback, post-validation
//! - **Server**: axum routes under `/api`
//!
//! # Example
//!
//! ```no_run
//! use gomoku_server::{AiKind, AiOrchestrator, ServerConfig};
//! use serde_json::{Value, json};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let orchestrator = AiOrchestrator::from_config(&config)?;
//!
//! let board = vec![Value::Null; 225];
//! let body = json!({ "board": board, "size": 15, "aiPlayer": "O" });
//! let outcome = orchestrator.handle(AiKind::Classic, &body).await?;
//! println!("{} ({})", outcome.coordinate, outcome.thought);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod llm_client;
mod orchestrator;
mod providers;
mod request;
mod server;

// Crate-level exports - Configuration
pub use config::{Environment, ServerConfig};

// Crate-level exports - Errors
pub use error::{
    ConfigError, MoveError, MoveErrorKind, ProviderError, ProviderErrorKind,
};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Orchestration
pub use orchestrator::{
    AbsorbedFailure, AiOrchestrator, Availability, ExternalSlot, MoveOutcome, MoveSource,
    OrchestratorSettings, ProviderStatus, Stage,
};

// Crate-level exports - Providers
pub use providers::{
    AiKind, ClassicProvider, ExternalProvider, FALLBACK_THOUGHT, MoveProvider, ProviderMove,
    fallback_move, parse_move_reply,
};

// Crate-level exports - Requests
pub use request::{EvaluateRequest, MoveRequest};

// Crate-level exports - HTTP
pub use server::{ApiError, AppState, MovePosition, MoveResponse, router};
