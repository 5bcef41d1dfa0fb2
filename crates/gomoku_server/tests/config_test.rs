//! Configuration loading from TOML files.

use gomoku_server::{AiOrchestrator, Availability, Environment, LlmProvider, ServerConfig};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
port = 4000
run_length = 4
llm_provider = "anthropic"
llm_model = "claude-3-5-haiku-20241022"
"#,
    );

    let config = ServerConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.port(), 4000);
    assert_eq!(*config.run_length(), 4);
    assert_eq!(*config.llm_provider(), LlmProvider::Anthropic);
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.max_board_size(), 25);
    assert_eq!(config.provider_timeout(), Duration::from_millis(15_000));
    assert_eq!(*config.environment(), Environment::Development);
}

#[test]
fn test_full_file() {
    let file = write_config(
        r#"
host = "0.0.0.0"
port = 8080
environment = "production"
run_length = 5
max_board_size = 19
provider_timeout_ms = 2500
llm_provider = "openai"
llm_model = "gpt-4o-mini"
llm_max_tokens = 128
llm_base_url = "http://localhost:9999"
"#,
    );

    let config = ServerConfig::from_file(file.path()).unwrap();
    assert!(config.is_production());
    assert_eq!(*config.max_board_size(), 19);
    assert_eq!(config.provider_timeout(), Duration::from_millis(2500));
    assert_eq!(config.llm_base_url().as_deref(), Some("http://localhost:9999"));

    let llm = config
        .with_llm_api_key(Some("sk-test".to_string()))
        .llm_config()
        .unwrap();
    assert_eq!(llm.provider(), LlmProvider::OpenAI);
    assert_eq!(llm.model(), "gpt-4o-mini");
    assert_eq!(llm.max_tokens(), 128);
    assert_eq!(llm.base_url(), "http://localhost:9999");
}

#[test]
fn test_invalid_values_rejected() {
    for content in [
        "run_length = 0",
        "provider_timeout_ms = 0",
        "max_board_size = 5000",
        "port = \"eighty\"",
    ] {
        let file = write_config(content);
        assert!(ServerConfig::from_file(file.path()).is_err(), "{content}");
    }
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(*config.run_length(), 5);
}

#[test]
fn test_api_key_is_never_read_from_file() {
    let file = write_config("llm_api_key = \"leaked\"\n");
    let config = ServerConfig::from_file(file.path()).unwrap();
    assert!(config.llm_config().is_none());
}

#[test]
fn test_orchestrator_reflects_credential() {
    let without = AiOrchestrator::from_config(&ServerConfig::default()).unwrap();
    assert_eq!(without.status().external, Availability::NotConfigured);

    let config = ServerConfig::default().with_llm_api_key(Some("key".to_string()));
    let with = AiOrchestrator::from_config(&config).unwrap();
    assert_eq!(with.status().external, Availability::Available);
    assert_eq!(with.settings().run_length, 5);
}
