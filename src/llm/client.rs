//! Async HTTP client for the advisory text service
//!
//! Model-agnostic: speaks both the Anthropic messages API and the
//! OpenAI-compatible chat completions API (OpenRouter, DeepSeek, etc).
//! The client only ever produces display text; it has no access to any
//! simulation state.

use crate::core::config::AdvisoryConfig;
use crate::core::error::{NetrError, Result};
use crate::llm::advisory::AdvisoryService;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

const SYSTEM_PROMPT: &str = "You are an advisor attached to a turn-based peace negotiation \
game. Answer in plain prose, at most a few short paragraphs. Do not return JSON or markdown.";

/// Async LLM client for advisory requests
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let defaults = AdvisoryConfig::default();
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            api_format,
        }
    }

    /// Build from the config file's `[advisory]` section.
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL and LLM_MODEL override the file values
    pub fn from_config(config: &AdvisoryConfig) -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| NetrError::Advisory("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| config.api_url.clone());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| config.model.clone());

        let mut client = Self::new(api_key, api_url, model);
        client.temperature = config.temperature;
        client.max_tokens = config.max_tokens;
        Ok(client)
    }

    /// Create a client from environment variables and default settings
    pub fn from_env() -> Result<Self> {
        Self::from_config(&AdvisoryConfig::default())
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request to the LLM
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        tracing::debug!(model = %self.model, format = ?self.api_format, "Advisory request");
        let result = match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        };
        if let Err(e) = &result {
            tracing::warn!("Advisory request failed: {}", e);
        }
        result
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| NetrError::Advisory(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NetrError::Advisory(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| NetrError::Advisory(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| NetrError::Advisory("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
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
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| NetrError::Advisory(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NetrError::Advisory(format!("API error: {}", error_text)));
        }

        // OpenRouter reports some failures as 200 with an error body and no choices
        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| NetrError::Advisory(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| NetrError::Advisory("Empty response".into()))
    }
}

impl AdvisoryService for LlmClient {
    async fn generate(&self, scenario: &str) -> Result<String> {
        self.complete(SYSTEM_PROMPT, scenario).await
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
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

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
