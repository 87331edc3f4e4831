//! Language-model chat completion clients.
//!
//! This module provides a single [`LanguageModel`] seam for the pipeline and an
//! HTTP implementation, [`LlmClient`], that talks to several providers. Every
//! provider answers in its own shape; those shapes are normalized here into a
//! [`Completion`] so nothing downstream has to inspect provider payloads.
//!
//! # Supported Providers
//!
//! | Provider | Endpoint | Authentication |
//! |----------|----------|----------------|
//! | OpenAI-compatible | `{base_url}/chat/completions` | Bearer token |
//! | Anthropic | `api.anthropic.com` | x-api-key header |
//! | Ollama | Local (configurable) | None |
//!
//! OpenAI-compatible endpoints include OpenAI itself and OpenRouter. Some of
//! them return `choices[].message.content`, others `choices[].text`; both are
//! accepted.
//!
//! Calls are never retried. A failed call is reported to the caller, which
//! decides how to recover.
//!
//! # Example
//!
//! ```
//! use nl2sql_assistant::llm::{LlmClient, LlmProvider};
//!
//! let provider = LlmProvider::Ollama {
//!     base_url: "http://localhost:11434".into(),
//!     model:    "llama3.2".into()
//! };
//!
//! let client = LlmClient::new(provider);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::DEFAULT_TIMEOUT_SECS,
    error::{AppResult, http_error, llm_api_error}
};

/// Default base URL for OpenAI-compatible endpoints
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Canonical model output handed to the rest of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Generated text, possibly empty
    pub text: String
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into()
        }
    }

    /// Whether the model produced nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Chat completion collaborator.
///
/// Implementations may return an empty [`Completion`] or fail with a transport
/// error; callers must tolerate both.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32
    ) -> AppResult<Completion>;
}

/// LLM provider configuration with authentication credentials.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// OpenAI or any endpoint speaking the same chat completions protocol
    OpenAI {
        /// API key (sk-...)
        api_key:  String,
        /// Model identifier (e.g., "gpt-4o-mini")
        model:    String,
        /// Base URL without the `/chat/completions` suffix
        base_url: String
    },
    /// Anthropic API (Claude models)
    Anthropic {
        /// API key
        api_key: String,
        /// Model identifier (e.g., "claude-sonnet-4-20250514")
        model:   String
    },
    /// Local Ollama instance
    Ollama {
        /// Base URL (e.g., "http://localhost:11434")
        base_url: String,
        /// Model name (e.g., "llama3.2")
        model:    String
    }
}

impl LlmProvider {
    /// Model identifier used for requests
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI {
                model, ..
            }
            | Self::Anthropic {
                model, ..
            }
            | Self::Ollama {
                model, ..
            } => model
        }
    }
}

/// HTTP client for chat completion APIs.
pub struct LlmClient {
    provider: LlmProvider,
    client:   reqwest::Client
}

#[derive(Serialize)]
struct ChatMessage {
    role:    &'static str,
    content: String
}

#[derive(Serialize)]
struct OpenAIRequest {
    model:       String,
    messages:    Vec<ChatMessage>,
    temperature: f32
}

#[derive(Deserialize, Default)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>
}

#[derive(Deserialize, Default)]
struct OpenAIChoice {
    #[serde(default)]
    message: Option<OpenAIResponseMessage>,
    #[serde(default)]
    text:    Option<String>
}

#[derive(Deserialize, Default)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>
}

#[derive(Serialize)]
struct AnthropicRequest {
    model:       String,
    max_tokens:  u32,
    system:      String,
    temperature: f32,
    messages:    Vec<ChatMessage>
}

#[derive(Deserialize, Default)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>
}

#[derive(Serialize)]
struct OllamaRequest {
    model:    String,
    messages: Vec<ChatMessage>,
    stream:   bool,
    options:  OllamaOptions
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32
}

#[derive(Deserialize, Default)]
struct OllamaResponse {
    #[serde(default)]
    message:  Option<OpenAIResponseMessage>,
    #[serde(default)]
    response: Option<String>
}

impl OpenAIResponse {
    fn into_completion(self) -> Completion {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| {
                choice
                    .message
                    .and_then(|m| m.content)
                    .filter(|c| !c.trim().is_empty())
                    .or(choice.text)
            })
            .unwrap_or_default();
        Completion::new(text)
    }
}

impl AnthropicResponse {
    fn into_completion(self) -> Completion {
        let text = self
            .content
            .into_iter()
            .find_map(|block| block.text)
            .unwrap_or_default();
        Completion::new(text)
    }
}

impl OllamaResponse {
    fn into_completion(self) -> Completion {
        let text = self
            .message
            .and_then(|m| m.content)
            .or(self.response)
            .unwrap_or_default();
        Completion::new(text)
    }
}

fn messages(system_prompt: &str, user_prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role:    "system",
            content: system_prompt.to_string()
        },
        ChatMessage {
            role:    "user",
            content: user_prompt.to_string()
        },
    ]
}

impl LlmClient {
    /// Create new LLM client with the default request timeout
    pub fn new(provider: LlmProvider) -> Self {
        Self::with_timeout(provider, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create new LLM client with a custom request timeout
    pub fn with_timeout(provider: LlmProvider, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            provider,
            client
        }
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    async fn call_openai(
        &self,
        api_key: &str,
        model: &str,
        base_url: &str,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32
    ) -> AppResult<Completion> {
        let request = OpenAIRequest {
            model: model.to_string(),
            messages: messages(system_prompt, user_prompt),
            temperature
        };
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "OpenAI API error {}: {}",
                status, text
            )));
        }
        let result: OpenAIResponse = response.json().await.map_err(http_error)?;
        Ok(result.into_completion())
    }

    async fn call_anthropic(
        &self,
        api_key: &str,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32
    ) -> AppResult<Completion> {
        let request = AnthropicRequest {
            model: model.to_string(),
            max_tokens: 4096,
            system: system_prompt.to_string(),
            temperature,
            messages: vec![ChatMessage {
                role:    "user",
                content: user_prompt.to_string()
            }]
        };
        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "Anthropic API error {}: {}",
                status, text
            )));
        }
        let result: AnthropicResponse = response.json().await.map_err(http_error)?;
        Ok(result.into_completion())
    }

    async fn call_ollama(
        &self,
        base_url: &str,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32
    ) -> AppResult<Completion> {
        let request = OllamaRequest {
            model:    model.to_string(),
            messages: messages(system_prompt, user_prompt),
            stream:   false,
            options:  OllamaOptions {
                temperature
            }
        };
        let url = format!("{}/api/chat", base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "Ollama API error {}: {}",
                status, text
            )));
        }
        let result: OllamaResponse = response.json().await.map_err(http_error)?;
        Ok(result.into_completion())
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32
    ) -> AppResult<Completion> {
        debug!(model = self.provider.model(), temperature, "calling chat completion");
        match &self.provider {
            LlmProvider::OpenAI {
                api_key,
                model,
                base_url
            } => {
                self.call_openai(
                    api_key,
                    model,
                    base_url,
                    system_prompt,
                    user_prompt,
                    temperature
                )
                .await
            }
            LlmProvider::Anthropic {
                api_key,
                model
            } => {
                self.call_anthropic(api_key, model, system_prompt, user_prompt, temperature)
                    .await
            }
            LlmProvider::Ollama {
                base_url,
                model
            } => {
                self.call_ollama(base_url, model, system_prompt, user_prompt, temperature)
                    .await
            }
        }
    }
}
