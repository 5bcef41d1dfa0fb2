//! Server configuration from TOML and environment.

use crate::error::ConfigError;
use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use gomoku_rules::MAX_BOARD_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strum::{Display, EnumString};
use tracing::{debug, info, instrument, warn};

/// Deployment mode. Production hides internal error detail from responses.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// Local development.
    #[default]
    Development,
    /// Production deployment.
    Production,
}

/// Configuration for the move service.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// Deployment mode.
    environment: Environment,

    /// Stones in a row needed to win.
    run_length: usize,

    /// Largest accepted board edge.
    max_board_size: usize,

    /// Budget for a single provider call, in milliseconds.
    provider_timeout_ms: u64,

    /// LLM backing the external provider.
    llm_provider: LlmProvider,

    /// LLM model name.
    llm_model: String,

    /// Maximum tokens for LLM responses.
    llm_max_tokens: u32,

    /// Optional endpoint override for the LLM API.
    llm_base_url: Option<String>,

    /// Credential for the LLM provider; only ever read from the environment.
    #[serde(skip)]
    llm_api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            environment: Environment::Development,
            run_length: gomoku_rules::GOMOKU_RUN_LENGTH,
            max_board_size: 25,
            provider_timeout_ms: 15_000,
            llm_provider: LlmProvider::Gemini,
            llm_model: "gemini-2.0-flash".to_string(),
            llm_max_tokens: 256,
            llm_base_url: None,
            llm_api_key: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration: TOML file when present, then process environment.
    ///
    /// A missing file is not an error; defaults are used instead.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Applies environment overrides through `lookup`.
    ///
    /// Recognised keys: `HOST`, `PORT`, `GOMOKU_ENV`, `GOMOKU_LLM_PROVIDER`,
    /// `GOMOKU_LLM_MODEL`, `GOMOKU_LLM_BASE_URL`, and the API key variable of
    /// the selected provider.
    #[instrument(skip(self, lookup))]
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::new(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(env) = lookup("GOMOKU_ENV") {
            self.environment = env.parse().map_err(|_| {
                ConfigError::new(format!(
                    "GOMOKU_ENV must be \"development\" or \"production\", got {}",
                    env
                ))
            })?;
        }
        if let Some(provider) = lookup("GOMOKU_LLM_PROVIDER") {
            self.llm_provider = provider.parse().map_err(|_| {
                ConfigError::new(format!("Unknown LLM provider: {}", provider))
            })?;
        }
        if let Some(model) = lookup("GOMOKU_LLM_MODEL") {
            self.llm_model = model;
        }
        if let Some(url) = lookup("GOMOKU_LLM_BASE_URL") {
            self.llm_base_url = Some(url);
        }

        let key_var = self.llm_provider.api_key_var();
        self.llm_api_key = lookup(key_var).filter(|key| !key.trim().is_empty());
        if self.llm_api_key.is_none() {
            warn!(key_var, "No LLM credential configured; external AI disabled");
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run_length == 0 {
            return Err(ConfigError::new("run_length must be at least 1"));
        }
        if self.max_board_size == 0 || self.max_board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::new(format!(
                "max_board_size must be between 1 and {}",
                MAX_BOARD_SIZE
            )));
        }
        if self.provider_timeout_ms == 0 {
            return Err(ConfigError::new("provider_timeout_ms must be positive"));
        }
        Ok(())
    }

    /// Replaces the LLM credential.
    pub fn with_llm_api_key(mut self, key: Option<String>) -> Self {
        self.llm_api_key = key;
        self
    }

    /// Provider call budget.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// Whether internal error detail must be hidden.
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Builds the LLM configuration, or `None` when no credential is set.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn llm_config(&self) -> Option<LlmConfig> {
        let api_key = self.llm_api_key.clone()?;
        let config = LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        );
        Some(match &self.llm_base_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        })
    }
}
