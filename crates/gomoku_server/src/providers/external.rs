//! Language-model backed move provider.

use super::{AiKind, MoveProvider, ProviderMove};
use crate::error::{ProviderError, ProviderErrorKind};
use crate::llm_client::LlmClient;
use gomoku_rules::{Board, Player};
use serde_json::Value;
use tracing::{debug, info, instrument};

const SYSTEM_PROMPT: &str = "You are a strong Gomoku player. Players alternate placing stones \
on a square grid; the first to align the required number of stones horizontally, vertically \
or diagonally wins. Reply with a single JSON object and nothing else: \
{\"row\": <number>, \"col\": <number>, \"thought\": \"<one short sentence>\"}. \
Rows and columns are zero-based and you may only choose an empty cell marked '.'.";

const DEFAULT_THOUGHT: &str = "A strategic move.";

/// Provider that asks an LLM for a move.
#[derive(Debug, Clone)]
pub struct ExternalProvider {
    client: LlmClient,
    run_length: usize,
}

impl ExternalProvider {
    /// Creates a provider over an LLM client.
    pub fn new(client: LlmClient, run_length: usize) -> Self {
        Self { client, run_length }
    }

    /// Builds the user message describing the position.
    pub fn build_prompt(&self, board: &Board, ai_player: Player) -> String {
        format!(
            "Board size: {size}x{size}. Stones in a row needed to win: {run}.\n\
             You play '{me}', your opponent plays '{them}'.\n\n\
             Current board ('.' is empty):\n{board}\n\
             Win immediately if you can, otherwise block any line your opponent \
             could complete next turn, otherwise build your own line.",
            size = board.size(),
            run = self.run_length,
            me = ai_player,
            them = ai_player.opponent(),
            board = board.display(),
        )
    }
}

#[async_trait::async_trait]
impl MoveProvider for ExternalProvider {
    fn kind(&self) -> AiKind {
        AiKind::External
    }

    #[instrument(skip(self, board), fields(size = board.size(), provider = %self.client.config().provider()))]
    async fn select_move(
        &self,
        board: &Board,
        ai_player: Player,
    ) -> Result<ProviderMove, ProviderError> {
        let prompt = self.build_prompt(board, ai_player);
        debug!(prompt_length = prompt.len(), "Requesting move from LLM");

        let reply = self.client.generate(SYSTEM_PROMPT, &prompt).await?;
        let mv = parse_move_reply(&reply)?;

        info!(row = mv.row, col = mv.col, "LLM proposed move");
        Ok(mv)
    }
}

/// Extracts `{row, col, thought}` from an LLM reply.
///
/// Accepts bare JSON, JSON inside a markdown fence, JSON surrounded by prose,
/// and the nested `{"move": {"row", "col"}, "thought"}` shape.
///
/// # Errors
///
/// Returns a `MalformedResponse` provider error when no usable object is found.
pub fn parse_move_reply(reply: &str) -> Result<ProviderMove, ProviderError> {
    let malformed = |what: &str| {
        ProviderError::new(
            ProviderErrorKind::MalformedResponse,
            format!("{}: {}", what, reply.chars().take(200).collect::<String>()),
        )
    };

    let start = reply.find('{').ok_or_else(|| malformed("No JSON object in reply"))?;
    let end = reply.rfind('}').ok_or_else(|| malformed("No JSON object in reply"))?;
    if end < start {
        return Err(malformed("No JSON object in reply"));
    }

    let value: Value =
        serde_json::from_str(&reply[start..=end]).map_err(|_| malformed("Reply is not valid JSON"))?;

    let position = value.get("move").filter(|m| m.is_object()).unwrap_or(&value);
    let row = position
        .get("row")
        .and_then(Value::as_i64)
        .ok_or_else(|| malformed("Reply has no integer row"))?;
    let col = position
        .get("col")
        .and_then(Value::as_i64)
        .ok_or_else(|| malformed("Reply has no integer col"))?;
    let thought = value
        .get("thought")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_THOUGHT)
        .to_string();

    Ok(ProviderMove::new(row, col, thought))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let mv = parse_move_reply(r#"{"row": 7, "col": 8, "thought": "Center pressure."}"#).unwrap();
        assert_eq!(mv, ProviderMove::new(7, 8, "Center pressure.".to_string()));
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let reply = "Sure! Here is my move:\n```json\n{\"row\": 3, \"col\": 4}\n```\nGood luck.";
        let mv = parse_move_reply(reply).unwrap();
        assert_eq!((mv.row, mv.col), (3, 4));
        assert_eq!(mv.thought, DEFAULT_THOUGHT);
    }

    #[test]
    fn test_parse_nested_move() {
        let mv = parse_move_reply(r#"{"move": {"row": 1, "col": 2}, "thought": "Block."}"#).unwrap();
        assert_eq!((mv.row, mv.col), (1, 2));
        assert_eq!(mv.thought, "Block.");
    }

    #[test]
    fn test_parse_keeps_negative_coordinates_for_validation() {
        let mv = parse_move_reply(r#"{"row": -1, "col": 0}"#).unwrap();
        assert_eq!(mv.row, -1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for reply in ["I think the center", "{not json}", r#"{"row": "seven", "col": 1}"#, "} {"] {
            let err = parse_move_reply(reply).unwrap_err();
            assert_eq!(err.kind, ProviderErrorKind::MalformedResponse, "{reply}");
        }
    }

    #[test]
    fn test_prompt_mentions_players_and_board() {
        let config = crate::llm_client::LlmConfig::new(
            crate::llm_client::LlmProvider::Gemini,
            "key".to_string(),
            "model".to_string(),
            64,
        );
        let client = LlmClient::new(config, std::time::Duration::from_secs(1)).unwrap();
        let provider = ExternalProvider::new(client, 5);
        let mut board = Board::new(9).unwrap();
        board.place(40, Player::X).unwrap();

        let prompt = provider.build_prompt(&board, Player::O);
        assert!(prompt.contains("9x9"));
        assert!(prompt.contains("You play 'O'"));
        assert!(prompt.contains(&board.display()));
    }
}
