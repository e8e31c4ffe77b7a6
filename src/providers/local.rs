//! Local inference backend.
//!
//! Talks to an Ollama-compatible server through its non-streaming generate
//! endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{cancellable, join_url, Backend, BackendError, PROBE_TIMEOUT};
use crate::config::LocalConfig;

/// Default Ollama endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default local model
pub const DEFAULT_MODEL: &str = "phi3.5:3.8b";

/// Lower bound for any local call; cold model loads are slow.
pub const MIN_LOCAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Prompt used to force the model into memory
const WARMUP_PROMPT: &str = "Hi";

/// Local inference backend
#[derive(Clone)]
pub struct LocalBackend {
    /// HTTP client, owned by this backend alone
    client: Client,
    /// Base URL of the inference server
    endpoint: String,
    /// Model to use
    model: String,
}

impl LocalBackend {
    /// Create a new local backend. Empty values fall back to the defaults.
    pub fn new(endpoint: String, model: String, timeout: Duration) -> Self {
        let endpoint = if endpoint.is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint
        };
        let model = if model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model
        };

        let client = Client::builder()
            .timeout(timeout.max(MIN_LOCAL_TIMEOUT))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint,
            model,
        }
    }

    /// Create from the `[local]` config section
    pub fn from_config(config: &LocalConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        }
    }

    async fn send(&self, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(join_url(&self.endpoint, "api/generate"))
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BackendError::ProtocolFailure(format!(
                "inference server returned status: {}",
                status.as_u16()
            )));
        }

        let body: GenerateResponse = response.json().await?;
        if body.response.trim().is_empty() {
            return Err(BackendError::EmptyResponse(
                "inference server returned no text".to_string(),
            ));
        }

        Ok(body.response)
    }

    /// Issue a throwaway generate call so the server loads the model ahead of
    /// the first real request. Advisory only.
    pub async fn warmup(&self) -> Result<(), BackendError> {
        self.send(WARMUP_PROMPT).await.map(|_| ())
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn generate(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
    ) -> Result<String, BackendError> {
        cancellable(cancel, self.send(prompt)).await
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(join_url(&self.endpoint, "api/version"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map(|response| response.status() == StatusCode::OK)
            .unwrap_or(false)
    }
}

/// Probe the local server and, if it answers, warm the model in the background.
///
/// Never blocks the caller and never affects the outcome of the invocation.
pub fn spawn_warmup(config: &LocalConfig) -> tokio::task::JoinHandle<()> {
    let backend = LocalBackend::from_config(config);

    tokio::spawn(async move {
        if !backend.is_available().await {
            tracing::debug!(endpoint = %backend.endpoint, "local backend unreachable, skipping warmup");
            return;
        }

        match backend.warmup().await {
            Ok(()) => tracing::debug!(model = %backend.model, "model warmed up"),
            Err(err) => tracing::debug!(model = %backend.model, error = %err, "model warmup failed"),
        }
    })
}

// API types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    #[allow(dead_code)]
    done: bool,
}
