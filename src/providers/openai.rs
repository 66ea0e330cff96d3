//! OpenAI-compatible chat completions client.
//!
//! Talks to `POST {base_url}/chat/completions`. Any server exposing the same
//! wire format (OpenAI, Azure-style proxies, vLLM, Ollama's `/v1`) works by
//! overriding the base URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::Credentials;
use crate::traits::ChatModel;
use crate::types::{ChatOptions, ChatResponse, FinishReason, Message, Usage};
use crate::{AugurError, Result};

/// Default base URL for the OpenAI API
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for OpenAI-compatible chat completion endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (compatible servers, wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a client from `OPENAI_API_KEY` and optional `OPENAI_BASE_URL`.
    ///
    /// Explicit opt-in: nothing in the classifier calls this.
    pub fn from_env() -> Result<Self> {
        Self::from_credentials(&Credentials::from_env())
    }

    /// Build a client from already-resolved credentials.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        let api_key = credentials.require_api_key()?;
        let base_url = credentials.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self::with_base_url(api_key, base_url))
    }

    /// Per-request timeout (default 60s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a non-success response to an error.
    async fn error_for(response: reqwest::Response, model: &str) -> AugurError {
        let status = response.status();
        match status.as_u16() {
            401 => AugurError::AuthenticationFailed,
            404 => AugurError::ModelNotFound(model.to_string()),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                AugurError::RateLimited { retry_after }
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .map(|b| b.error.message)
                    .unwrap_or_else(|_| format!("OpenAI API error: {status}"));
                AugurError::Api {
                    status: code,
                    message,
                }
            }
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(name = "openai.chat", skip(self, messages, options), fields(model = %options.model))]
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&ChatRequest {
                model: &options.model,
                messages,
                temperature: options.temperature,
                max_tokens: options.max_tokens,
                seed: options.seed,
            })
            .send()
            .await
            .map_err(|e| AugurError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, &options.model).await);
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AugurError::Http(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(AugurError::EmptyResponse)?;

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: completion.usage,
            model: completion.model,
            finish_reason: finish_reason(choice.finish_reason.as_deref()),
        })
    }
}

fn finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("length") => FinishReason::Length,
        Some("tool_calls") | Some("function_call") => FinishReason::ToolCalls,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
