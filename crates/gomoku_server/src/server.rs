//! HTTP routes for the move service.

use crate::error::{MoveError, MoveErrorKind};
use crate::orchestrator::{AiOrchestrator, MoveOutcome};
use crate::providers::AiKind;
use crate::request::EvaluateRequest;
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info, instrument, warn};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    orchestrator: Arc<AiOrchestrator>,
    production: bool,
}

impl AppState {
    /// Creates handler state. `production` hides internal error detail.
    pub fn new(orchestrator: AiOrchestrator, production: bool) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            production,
        }
    }

    /// The orchestrator.
    pub fn orchestrator(&self) -> &AiOrchestrator {
        &self.orchestrator
    }
}

/// Zero-based move coordinates on the wire.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MovePosition {
    /// Row.
    pub row: usize,
    /// Column.
    pub col: usize,
}

/// Successful move response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    /// Always `true`.
    pub success: bool,
    /// The chosen cell.
    #[serde(rename = "move")]
    pub position: MovePosition,
    /// Provider rationale.
    pub thought: String,
    /// `classic` or `external`.
    pub ai_type: AiKind,
    /// Board evaluation after the move.
    pub evaluation: gomoku_rules::Evaluation,
    /// Whether the random fallback produced the move.
    pub fallback: bool,
}

impl From<MoveOutcome> for MoveResponse {
    fn from(outcome: MoveOutcome) -> Self {
        let fallback = outcome.is_fallback();
        Self {
            success: true,
            position: MovePosition {
                row: outcome.coordinate.row,
                col: outcome.coordinate.col,
            },
            thought: outcome.thought,
            ai_type: outcome.kind,
            evaluation: outcome.evaluation,
            fallback,
        }
    }
}

/// A [`MoveError`] rendered for a given deployment mode.
#[derive(Debug)]
pub struct ApiError {
    error: MoveError,
    production: bool,
}

impl ApiError {
    /// Wraps an orchestrator error.
    pub fn new(error: MoveError, production: bool) -> Self {
        Self { error, production }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.error.kind {
            MoveErrorKind::MalformedRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            MoveErrorKind::NoValidMoves => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "No valid moves available",
                    "move": null,
                    "thought": "The board is full or no valid moves found.",
                }),
            ),
            MoveErrorKind::NotConfigured { provider, message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": format!("{} AI service not configured", provider),
                    "message": message,
                }),
            ),
            MoveErrorKind::InvalidProviderMove { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "AI generated an invalid move",
                    "move": null,
                    "thought": "Internal error: AI suggested an invalid position.",
                }),
            ),
            MoveErrorKind::Internal(detail) => {
                let message = if self.production {
                    "AI calculation failed".to_string()
                } else {
                    detail
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "message": message }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the application router.
#[instrument(skip(state), fields(production = state.production))]
pub fn router(state: AppState) -> Router {
    info!("Building HTTP router");

    let api = Router::new()
        .route("/ai/classic", post(classic_move))
        .route("/ai/external", post(external_move))
        .route("/ai/gemini", post(external_move))
        .route("/ai/status", get(ai_status))
        .route("/health", get(health))
        .route("/game/evaluate", post(evaluate_board))
        .fallback(not_found);

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

async fn classic_move(State(state): State<AppState>, body: Bytes) -> Response {
    request_move(state, AiKind::Classic, body).await
}

async fn external_move(State(state): State<AppState>, body: Bytes) -> Response {
    request_move(state, AiKind::External, body).await
}

#[instrument(skip(state, body), fields(body_len = body.len()))]
async fn request_move(state: AppState, kind: AiKind, body: Bytes) -> Response {
    let result = match parse_body(&body) {
        Ok(value) => state.orchestrator.handle(kind, &value).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => (StatusCode::OK, Json(MoveResponse::from(outcome))).into_response(),
        Err(e) => {
            if e.is_caller_error() {
                warn!(error = %e, "Rejected move request");
            } else {
                error!(error = %e, "Move request failed");
            }
            ApiError::new(e, state.production).into_response()
        }
    }
}

#[instrument(skip(state))]
async fn ai_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": state.orchestrator.status(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[instrument(skip(state, body), fields(body_len = body.len()))]
async fn evaluate_board(State(state): State<AppState>, body: Bytes) -> Response {
    let max = state.orchestrator.settings().max_board_size;
    let request = parse_body(&body).and_then(|value| EvaluateRequest::from_json(&value, max));

    match request {
        Ok(request) => {
            let evaluation = state.orchestrator.evaluate(&request);
            (StatusCode::OK, Json(evaluation)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Rejected evaluate request");
            ApiError::new(e, state.production).into_response()
        }
    }
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "API endpoint not found" })),
    )
        .into_response()
}

fn parse_body(body: &Bytes) -> Result<Value, MoveError> {
    serde_json::from_slice(body)
        .map_err(|e| MoveError::malformed(format!("Request body is not valid JSON: {}", e)))
}
