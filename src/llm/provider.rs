//! Chat-completion clients for the supported vendors
//!
//! Supports:
//! - OpenAI (chat completions)
//! - Anthropic (messages API)
//!
//! # Examples
//!
//! ```no_run
//! use voicequery::config::LlmConfig;
//! use voicequery::llm::create_client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // export OPENAI_API_KEY=sk-...
//! let client = create_client(LlmConfig::openai())?;
//! let response = client
//!     .complete("You are a helpful SQL assistant.", "ID, SALEStotal sales")
//!     .await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

use crate::config::{LlmConfig, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Provider errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Response from a chat endpoint
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// Chat completion capability
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one system message and one user message, return the reply text
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<LlmResponse, LlmError>;

    fn model_name(&self) -> &str;

    fn provider(&self) -> LlmProvider;
}

/// Create a client from configuration
pub fn create_client(config: LlmConfig) -> Result<Box<dyn LlmClient>, LlmError> {
    match config.provider {
        LlmProvider::OpenAI => Ok(Box::new(OpenAIClient::new(config)?)),
        LlmProvider::Anthropic => Ok(Box::new(AnthropicClient::new(config)?)),
    }
}

fn build_http_client(config: &LlmConfig) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .unwrap_or_default()
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    if status.as_u16() == 401 {
        return Err(LlmError::AuthError(format!("HTTP {}: {}", status, body)));
    }
    Err(LlmError::ModelError(format!("HTTP {}: {}", status, body)))
}

// ============================================================================
// OpenAI
// ============================================================================

pub struct OpenAIClient {
    config: LlmConfig,
    client: Client,
    api_key: String,
}

impl OpenAIClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| LlmError::AuthError("OpenAI API key not found".to_string()))?;

        let client = build_http_client(&config);

        Ok(Self { config, client, api_key })
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            n: 1,
            temperature: self.config.temperature,
        }
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    model: String,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/chat/completions", self.config.url.trim_end_matches('/'));
        let request = self.request_body(system_prompt, user_prompt);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        let openai_response: OpenAIResponse = error_for_status(response).await?.json().await?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default().trim().to_string(),
            model: openai_response.model,
            finish_reason: choice.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAI
    }
}

// ============================================================================
// Anthropic
// ============================================================================

pub struct AnthropicClient {
    config: LlmConfig,
    client: Client,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| LlmError::AuthError("Anthropic API key not found".to_string()))?;

        let client = build_http_client(&config);

        Ok(Self { config, client, api_key })
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str) -> AnthropicRequest {
        AnthropicRequest {
            model: self.config.model.clone(),
            system: system_prompt.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: user_prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    system: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    model: String,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/messages", self.config.url.trim_end_matches('/'));
        let request = self.request_body(system_prompt, user_prompt);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        let anthropic_response: AnthropicResponse =
            error_for_status(response).await?.json().await?;

        let content = anthropic_response
            .content
            .into_iter()
            .filter(|c| c.kind == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("\n");

        if content.is_empty() {
            return Err(LlmError::InvalidResponse(
                "No text content in response".to_string(),
            ));
        }

        Ok(LlmResponse {
            content: content.trim().to_string(),
            model: anthropic_response.model,
            finish_reason: anthropic_response.stop_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Anthropic
    }
}
