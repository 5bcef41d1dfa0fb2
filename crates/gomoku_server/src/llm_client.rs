//! LLM API client abstraction for Gemini, OpenAI and Anthropic.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};
use tracing::{debug, error, info, instrument};

/// LLM provider selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini.
    Gemini,
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

impl LlmProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Default REST endpoint root.
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: Option<String>,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            base_url: None,
        }
    }

    /// Points the client at a different endpoint root (proxies, local mocks).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Endpoint root in use.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client whose HTTP requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the HTTP client cannot be built.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig, timeout: Duration) -> Result<Self, LlmError> {
        info!("Creating LLM client");
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    /// Gets the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Generates a completion from a system prompt and user message.
    #[instrument(skip(self, system_prompt, user_message), fields(provider = ?self.config.provider, model = %self.config.model))]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("Generating completion");
        match self.config.provider {
            LlmProvider::Gemini => self.generate_gemini(system_prompt, user_message).await,
            LlmProvider::OpenAI => self.generate_openai(system_prompt, user_message).await,
            LlmProvider::Anthropic => self.generate_anthropic(system_prompt, user_message).await,
        }
    }

    /// Generates a completion using Google Gemini.
    #[instrument(skip(self, system_prompt, user_message))]
    async fn generate_gemini(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            self.config.model
        );
        let request_body = json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": [
                { "role": "user", "parts": [{ "text": user_message }] }
            ],
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "responseMimeType": "application/json"
            }
        });

        debug!("Sending request to Gemini");
        let request = self
            .http
            .post(url)
            .header("x-goog-api-key", self.config.api_key.clone())
            .json(&request_body);
        let response_json = self.send(request, "Gemini").await?;

        extract_text(&response_json, "/candidates/0/content/parts/0/text", "Gemini")
    }

    /// Generates a completion using OpenAI chat completions.
    #[instrument(skip(self, system_prompt, user_message))]
    async fn generate_openai(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let request_body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ]
        });

        debug!("Sending request to OpenAI");
        let request = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body);
        let response_json = self.send(request, "OpenAI").await?;

        extract_text(&response_json, "/choices/0/message/content", "OpenAI")
    }

    /// Generates a completion using Anthropic Claude.
    #[instrument(skip(self, system_prompt, user_message))]
    async fn generate_anthropic(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.config.base_url());
        let request_body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system_prompt,
            "messages": [
                { "role": "user", "content": user_message }
            ]
        });

        debug!("Sending request to Anthropic");
        let request = self
            .http
            .post(url)
            .header("x-api-key", self.config.api_key.clone())
            .header("anthropic-version", "2023-06-01")
            .json(&request_body);
        let response_json = self.send(request, "Anthropic").await?;

        extract_text(&response_json, "/content/0/text", "Anthropic")
    }

    /// Sends a request and parses the JSON body of a successful response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        provider_name: &str,
    ) -> Result<Value, LlmError> {
        let response = request.send().await.map_err(|e| {
            error!(error = ?e, provider = provider_name, "API request failed");
            LlmError::new(format!("{} API request failed: {}", provider_name, e))
                .with_timeout(e.is_timeout())
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, provider = provider_name, "Failed to read response");
            LlmError::new(format!("Failed to read response: {}", e)).with_timeout(e.is_timeout())
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "{} API error", provider_name);
            return Err(LlmError::new(format!(
                "{} API error {}: {}",
                provider_name, status, response_text
            )));
        }

        debug!(response_length = response_text.len(), "Parsing response");
        serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, "Failed to parse response");
            LlmError::new(format!("Failed to parse response: {}", e))
        })
    }
}

fn extract_text(response: &Value, pointer: &str, provider_name: &str) -> Result<String, LlmError> {
    let content = response
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            error!(response = %response, "No text content in {} response", provider_name);
            LlmError::new(format!("No text content in {} response", provider_name))
        })?
        .to_string();

    info!(content_length = content.len(), "Generated completion");
    Ok(content)
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// The HTTP client gave up waiting.
    pub timed_out: bool,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            timed_out: false,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Marks whether the request timed out.
    pub fn with_timeout(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }
}
