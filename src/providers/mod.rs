//! Text-generation backends.
//!
//! Every backend answers a prompt with free text over HTTP. The manager tries
//! them in a fixed order (remote API, then local inference) before falling back
//! to the canned table in [`crate::fallback`].

pub mod api;
pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Timeout applied to every availability probe, independent of any caller deadline.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// The tier that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote chat-completion API
    Api,
    /// Local inference server
    Local,
    /// Canned response table
    Fallback,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Api => write!(f, "api"),
            BackendKind::Local => write!(f, "local"),
            BackendKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// A single generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Fully rendered prompt
    pub prompt: String,
    /// Coarse classification of the failed command, used by the fallback tier
    pub category: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            category: category.into(),
        }
    }
}

/// Text produced by one of the tiers.
///
/// Once it leaves the manager, `text` is non-empty and holds a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub text: String,
    pub backend: BackendKind,
}

impl GenerationResult {
    pub fn new(text: impl Into<String>, backend: BackendKind) -> Self {
        Self {
            text: text.into(),
            backend,
        }
    }
}

/// Failure of a single backend call. All variants are local to a tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("{0} not configured")]
    ConfigurationMissing(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("protocol failure: {0}")]
    ProtocolFailure(String),

    #[error("empty response: {0}")]
    EmptyResponse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::ProtocolFailure(format!("failed to decode response: {err}"))
        } else if err.is_timeout() {
            BackendError::TransportFailure("request timed out".to_string())
        } else {
            BackendError::TransportFailure(err.to_string())
        }
    }
}

/// A generator of free text from a prompt.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Issue one request for `prompt`.
    ///
    /// Returns promptly once `cancel` fires. There are no retries: a single
    /// failed attempt is a failure.
    async fn generate(&self, cancel: &CancellationToken, prompt: &str)
        -> Result<String, BackendError>;

    /// Cheapest possible round-trip, bounded by [`PROBE_TIMEOUT`].
    ///
    /// Errors are swallowed into `false`.
    async fn is_available(&self) -> bool;
}

/// Race `request` against `cancel`.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, request: F) -> Result<T, BackendError>
where
    F: std::future::Future<Output = Result<T, BackendError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(BackendError::TransportFailure("request cancelled".to_string())),
        result = request => result,
    }
}

/// Join an endpoint base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
