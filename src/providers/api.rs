//! Remote chat-completion backend.
//!
//! Speaks the OpenAI Chat Completions wire format, which most hosted providers
//! accept as well.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{cancellable, join_url, Backend, BackendError, PROBE_TIMEOUT};
use crate::config::ApiConfig;

/// Output cap that keeps replies short and fast
const MAX_TOKENS: u32 = 150;

/// Creative but focused
const TEMPERATURE: f32 = 0.8;

/// Remote API backend
pub struct RemoteApiBackend {
    /// HTTP client, owned by this backend alone
    client: Client,
    /// Base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Bearer credential
    api_key: String,
    /// Model to use
    model: String,
}

impl RemoteApiBackend {
    /// Create a new remote backend with its own transport
    pub fn new(endpoint: String, api_key: String, model: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint,
            api_key,
            model,
        }
    }

    /// Create from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout),
        )
    }

    fn completions_url(&self) -> String {
        join_url(&self.endpoint, "chat/completions")
    }

    /// Build the request body
    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: MAX_TOKENS,
            temperature: Some(TEMPERATURE),
        }
    }

    /// One-token request used by the availability probe
    fn build_probe(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "test".to_string(),
            }],
            max_tokens: 1,
            temperature: None,
        }
    }

    async fn send(&self, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        parse_completion(status, &body)
    }
}

/// Turn a raw chat-completion response into the first choice's content.
fn parse_completion(status: reqwest::StatusCode, body: &str) -> Result<String, BackendError> {
    let decoded = serde_json::from_str::<ChatCompletionResponse>(body);

    if let Ok(ChatCompletionResponse {
        error: Some(error), ..
    }) = &decoded
    {
        return Err(BackendError::ProtocolFailure(format!(
            "API error: {}",
            error.message
        )));
    }

    if !status.is_success() {
        return Err(BackendError::ProtocolFailure(format!("HTTP {status}")));
    }

    let decoded = decoded.map_err(|err| {
        BackendError::ProtocolFailure(format!("failed to decode response: {err}"))
    })?;

    let choice = decoded
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::EmptyResponse("no response choices returned".to_string()))?;

    let content = choice
        .message
        .and_then(|m| m.content)
        .unwrap_or_default();

    if content.is_empty() {
        return Err(BackendError::EmptyResponse(
            "empty response from API".to_string(),
        ));
    }

    Ok(content)
}

#[async_trait]
impl Backend for RemoteApiBackend {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
    ) -> Result<String, BackendError> {
        if self.api_key.is_empty() {
            return Err(BackendError::ConfigurationMissing("API key".to_string()));
        }
        if self.endpoint.is_empty() {
            return Err(BackendError::ConfigurationMissing("API endpoint".to_string()));
        }

        cancellable(cancel, self.send(prompt)).await
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() || self.endpoint.is_empty() {
            return false;
        }

        self.client
            .post(self.completions_url())
            .timeout(PROBE_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_probe())
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }
}

// API types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}
