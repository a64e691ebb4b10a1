//! Async LLM client for judging concept clashes
//!
//! A model-agnostic HTTP client speaking the chat-completions format.
//! Providers differ only in how the credential is attached: OpenAI-compatible
//! endpoints take a bearer token, Azure deployments take an `api-key` header
//! and carry the model in the URL.

use crate::core::config::{AuthStyle, LlmConfig};
use crate::core::error::{ArenaError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can turn a system + user prompt into response text
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ArenaError::Llm(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Create a client from environment variables layered over `config`
    ///
    /// Required: the variable named by `config.api_key_env` (LLM_API_KEY by default)
    /// Optional: LLM_API_URL overrides the endpoint
    /// Optional: LLM_MODEL overrides the model
    pub fn from_env(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ArenaError::Llm(format!("{} not set", config.api_key_env)))?;

        let mut config = config.clone();
        if let Ok(url) = std::env::var("LLM_API_URL") {
            config.endpoint = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.model = model;
        }

        Self::new(api_key, config)
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn build_request(&self, system: &str, user: &str) -> ChatRequest {
        ChatRequest {
            model: (!self.config.model.is_empty()).then(|| self.config.model.clone()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        }
    }
}

#[async_trait]
impl ReasoningService for LlmClient {
    /// Send a completion request to the LLM
    ///
    /// # Returns
    /// The text of the first choice
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = self.build_request(system, user);

        let builder = self
            .client
            .post(&self.config.endpoint)
            .header("content-type", "application/json");
        let builder = match self.config.auth {
            AuthStyle::Bearer => builder.header("Authorization", format!("Bearer {}", self.api_key)),
            AuthStyle::ApiKey => builder.header("api-key", &self.api_key),
        };

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| ArenaError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ArenaError::Llm(format!("API error {}: {}", status, error_text)));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ArenaError::Llm(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ArenaError::Llm("Empty response".into()))
    }
}

/// Stand-in used when no credential is available; every call fails
pub struct Unconfigured {
    reason: String,
}

impl Unconfigured {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ReasoningService for Unconfigured {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Err(ArenaError::Llm(self.reason.clone()))
    }
}

// Chat-completions format (OpenAI, Azure OpenAI, DeepSeek, ...)
#[derive(Serialize)]
struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}
