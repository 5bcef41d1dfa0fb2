//! Orchestrator behavior with scripted providers.

use gomoku_rules::{Board, Cell, GameStatus, Player, coords_to_index, is_valid_move};
use gomoku_server::{
    AiKind, AiOrchestrator, Availability, ClassicProvider, ExternalSlot, FALLBACK_THOUGHT,
    MoveErrorKind, MoveProvider, MoveRequest, MoveSource, OrchestratorSettings, ProviderError,
    ProviderErrorKind, ProviderMove,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What a scripted provider does when called.
#[derive(Debug, Clone)]
enum Script {
    Reply(i64, i64),
    Fail,
    Slow(Duration),
    Panic,
}

#[derive(Debug)]
struct ScriptedProvider {
    kind: AiKind,
    script: Script,
    calls: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    fn new(kind: AiKind, script: Script) -> (Arc<Self>, Arc<AtomicUsize>) {
        let provider = Arc::new(Self {
            kind,
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
        });
        let calls = Arc::clone(&provider.calls);
        (provider, calls)
    }
}

#[async_trait::async_trait]
impl MoveProvider for ScriptedProvider {
    fn kind(&self) -> AiKind {
        self.kind
    }

    async fn select_move(
        &self,
        _board: &Board,
        _ai_player: Player,
    ) -> Result<ProviderMove, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Reply(row, col) => Ok(ProviderMove::new(row, col, "scripted".to_string())),
            Script::Fail => Err(ProviderError::new(
                ProviderErrorKind::Transport,
                "connection refused",
            )),
            Script::Slow(delay) => {
                tokio::time::sleep(delay).await;
                self.completed.fetch_add(1, Ordering::SeqCst);
                Ok(ProviderMove::new(0, 0, "too late".to_string()))
            }
            Script::Panic => panic!("provider exploded"),
        }
    }
}

fn settings(run_length: usize) -> OrchestratorSettings {
    OrchestratorSettings {
        run_length,
        max_board_size: 25,
        provider_timeout: Duration::from_millis(100),
    }
}

/// Orchestrator over a slow provider, plus its completion counter.
fn with_slow_provider(
    delay: Duration,
    provider_timeout: Duration,
) -> (AiOrchestrator, Arc<AtomicUsize>) {
    let (provider, _calls) = ScriptedProvider::new(AiKind::Classic, Script::Slow(delay));
    let completed = Arc::clone(&provider.completed);
    let settings = OrchestratorSettings {
        provider_timeout,
        ..settings(5)
    };
    let orchestrator = AiOrchestrator::new(settings, provider, missing_external());
    (orchestrator, completed)
}

fn missing_external() -> ExternalSlot {
    ExternalSlot::Missing {
        reason: "GEMINI_API_KEY environment variable not set".to_string(),
    }
}

fn with_classic(script: Script, run_length: usize) -> (AiOrchestrator, Arc<AtomicUsize>) {
    let (provider, calls) = ScriptedProvider::new(AiKind::Classic, script);
    let orchestrator = AiOrchestrator::new(settings(run_length), provider, missing_external());
    (orchestrator, calls)
}

fn empty_body(size: usize) -> Value {
    json!({ "board": vec![Value::Null; size * size], "size": size, "aiPlayer": "O" })
}

fn board_from(pattern: &str, size: usize) -> Board {
    let cells = pattern
        .chars()
        .map(|c| match c {
            'X' => Cell::Occupied(Player::X),
            'O' => Cell::Occupied(Player::O),
            _ => Cell::Empty,
        })
        .collect();
    Board::from_cells(cells, size).unwrap()
}

#[tokio::test]
async fn test_provider_move_is_returned() {
    let (orchestrator, calls) = with_classic(Script::Reply(1, 2), 5);

    let outcome = orchestrator
        .handle(AiKind::Classic, &empty_body(15))
        .await
        .unwrap();

    assert_eq!((outcome.coordinate.row, outcome.coordinate.col), (1, 2));
    assert_eq!(outcome.thought, "scripted");
    assert_eq!(outcome.kind, AiKind::Classic);
    assert_eq!(outcome.source, MoveSource::Provider);
    assert!(!outcome.is_fallback());
    assert_eq!(outcome.evaluation.status(), GameStatus::InProgress);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_request_never_reaches_provider() {
    let (orchestrator, calls) = with_classic(Script::Reply(0, 0), 5);

    let bodies = [
        json!({ "board": "nope", "size": 3, "aiPlayer": "X" }),
        json!({ "board": [null, null], "size": 3, "aiPlayer": "X" }),
        json!({ "board": [], "size": 0, "aiPlayer": "X" }),
        json!({ "board": [null, null, null, null], "size": 2, "aiPlayer": "Z" }),
    ];
    for body in bodies {
        let err = orchestrator.handle(AiKind::Classic, &body).await.unwrap_err();
        assert!(
            matches!(err.kind, MoveErrorKind::MalformedRequest(_)),
            "{body}: {err}"
        );
        assert!(err.is_caller_error());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_finished_game_is_rejected() {
    let (orchestrator, calls) = with_classic(Script::Reply(2, 2), 3);
    let board = board_from("XXXOO....", 3);

    let err = orchestrator
        .request_move(AiKind::Classic, MoveRequest::new(board, Player::O))
        .await
        .unwrap_err();

    match err.kind {
        MoveErrorKind::MalformedRequest(message) => assert!(message.contains("already over")),
        other => panic!("expected malformed request, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_full_board_has_no_valid_moves() {
    let (orchestrator, calls) = with_classic(Script::Reply(0, 0), 3);
    let board = board_from("XOXXOOOXX", 3);

    let err = orchestrator
        .request_move(AiKind::Classic, MoveRequest::new(board, Player::X))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, MoveErrorKind::NoValidMoves));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failing_provider_falls_back_to_empty_cell() {
    let (orchestrator, calls) = with_classic(Script::Fail, 5);
    let board = board_from("XO.OX....", 3);

    let outcome = orchestrator
        .request_move(AiKind::Classic, MoveRequest::new(board.clone(), Player::X))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.thought, FALLBACK_THOUGHT);
    assert!(outcome.is_fallback());
    match &outcome.source {
        MoveSource::Fallback(failure) => {
            assert_eq!(failure.kind, ProviderErrorKind::Transport);
            assert!(failure.message.contains("connection refused"));
        }
        MoveSource::Provider => panic!("expected fallback"),
    }
    let row = outcome.coordinate.row as i64;
    let col = outcome.coordinate.col as i64;
    assert!(is_valid_move(row, col, &board));
}

#[tokio::test]
async fn test_slow_provider_times_out_into_fallback() {
    let (orchestrator, completed) =
        with_slow_provider(Duration::from_millis(300), Duration::from_millis(100));

    let outcome = orchestrator
        .handle(AiKind::Classic, &empty_body(5))
        .await
        .unwrap();

    match outcome.source {
        MoveSource::Fallback(failure) => assert_eq!(failure.kind, ProviderErrorKind::Timeout),
        MoveSource::Provider => panic!("expected timeout fallback"),
    }
    assert_eq!(outcome.thought, FALLBACK_THOUGHT);

    // The timed-out task must be stopped, not left running.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_dropped_request_aborts_provider_task() {
    let (orchestrator, completed) =
        with_slow_provider(Duration::from_millis(200), Duration::from_secs(5));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.handle(AiKind::Classic, &empty_body(5)),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_slow_provider_within_budget_completes() {
    let (orchestrator, completed) =
        with_slow_provider(Duration::from_millis(20), Duration::from_secs(5));

    let outcome = orchestrator
        .handle(AiKind::Classic, &empty_body(5))
        .await
        .unwrap();

    assert_eq!(outcome.source, MoveSource::Provider);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_occupied_provider_move_is_contract_violation() {
    let (orchestrator, _calls) = with_classic(Script::Reply(0, 0), 5);
    let board = board_from("X........", 3);

    let err = orchestrator
        .request_move(AiKind::Classic, MoveRequest::new(board, Player::O))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, MoveErrorKind::InvalidProviderMove { .. }));
    assert!(!err.is_caller_error());
}

#[tokio::test]
async fn test_out_of_bounds_provider_move_is_contract_violation() {
    for (row, col) in [(-1, 0), (0, 3), (3, 3), (i64::MAX, 0)] {
        let (orchestrator, _calls) = with_classic(Script::Reply(row, col), 5);
        let err = orchestrator
            .handle(AiKind::Classic, &empty_body(3))
            .await
            .unwrap_err();
        assert!(
            matches!(err.kind, MoveErrorKind::InvalidProviderMove { .. }),
            "({row}, {col}): {err}"
        );
    }
}

#[tokio::test]
async fn test_panicking_provider_is_internal_error() {
    let (orchestrator, _calls) = with_classic(Script::Panic, 5);

    let err = orchestrator
        .handle(AiKind::Classic, &empty_body(5))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, MoveErrorKind::Internal(_)));
}

#[tokio::test]
async fn test_missing_external_is_not_configured() {
    let (orchestrator, calls) = with_classic(Script::Reply(0, 0), 5);

    let err = orchestrator
        .handle(AiKind::External, &empty_body(15))
        .await
        .unwrap_err();

    match err.kind {
        MoveErrorKind::NotConfigured { provider, message } => {
            assert_eq!(provider, "External");
            assert!(message.contains("GEMINI_API_KEY"));
        }
        other => panic!("expected not configured, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_configured_external_is_dispatched() {
    let (classic, classic_calls) = ScriptedProvider::new(AiKind::Classic, Script::Reply(0, 0));
    let (external, external_calls) = ScriptedProvider::new(AiKind::External, Script::Reply(4, 4));
    let orchestrator =
        AiOrchestrator::new(settings(5), classic, ExternalSlot::Configured(external));

    let outcome = orchestrator
        .handle(AiKind::External, &empty_body(9))
        .await
        .unwrap();

    assert_eq!((outcome.coordinate.row, outcome.coordinate.col), (4, 4));
    assert_eq!(outcome.kind, AiKind::External);
    assert_eq!(external_calls.load(Ordering::SeqCst), 1);
    assert_eq!(classic_calls.load(Ordering::SeqCst), 0);
    assert_eq!(orchestrator.status().external, Availability::Available);
}

#[tokio::test]
async fn test_status_reports_missing_external() {
    let (orchestrator, _calls) = with_classic(Script::Fail, 5);
    let status = orchestrator.status();
    assert_eq!(status.classic, Availability::Available);
    assert_eq!(status.external, Availability::NotConfigured);
    assert_eq!(
        serde_json::to_value(status).unwrap(),
        json!({ "classic": "available", "external": "not-configured" })
    );
}

#[tokio::test]
async fn test_classic_winning_move_is_evaluated() {
    let orchestrator = AiOrchestrator::new(
        settings(5),
        Arc::new(ClassicProvider::new(5)),
        missing_external(),
    );
    let size = 15;
    let mut board = Board::new(size).unwrap();
    for col in 3..7 {
        board.place(coords_to_index(7, col, size), Player::O).unwrap();
    }
    for col in 0..3 {
        board.place(coords_to_index(0, col * 4, size), Player::X).unwrap();
    }
    board.place(coords_to_index(7, 2, size), Player::X).unwrap();

    let outcome = orchestrator
        .request_move(AiKind::Classic, MoveRequest::new(board, Player::O))
        .await
        .unwrap();

    assert_eq!((outcome.coordinate.row, outcome.coordinate.col), (7, 7));
    assert_eq!(outcome.evaluation.winner(), Some(Player::O));
    let expected: Vec<usize> = (3..8).map(|col| coords_to_index(7, col, size)).collect();
    assert_eq!(outcome.evaluation.winning_line().indices(), expected.as_slice());
}
