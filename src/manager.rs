//! Tier selection between the backends.
//!
//! A call walks API, then Local, then Fallback, and never goes back. A tier
//! that fails is not retried. The fallback tier always answers, so
//! [`Manager::generate`] cannot fail.

use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::fallback;
use crate::providers::api::RemoteApiBackend;
use crate::providers::local::{LocalBackend, MIN_LOCAL_TIMEOUT};
use crate::providers::{Backend, BackendError, BackendKind, GenerationRequest, GenerationResult};
use crate::sanitize::sanitize;

/// Owns the configured backends for one invocation
pub struct Manager {
    api: Option<Box<dyn Backend>>,
    local: Option<Box<dyn Backend>>,
    /// Inner deadline for the local tier
    local_timeout: Duration,
    fallback_only: bool,
}

impl Manager {
    /// Build the backends enabled in `config`
    pub fn new(config: &Config) -> Self {
        let api = config
            .api
            .enabled
            .then(|| Box::new(RemoteApiBackend::from_config(&config.api)) as Box<dyn Backend>);
        let local = config
            .local
            .enabled
            .then(|| Box::new(LocalBackend::from_config(&config.local)) as Box<dyn Backend>);

        Self::with_backends(api, local)
            .local_timeout(Duration::from_secs(config.local.timeout))
            .fallback_only(config.general.fallback_mode)
    }

    /// Build from explicit backends
    pub fn with_backends(api: Option<Box<dyn Backend>>, local: Option<Box<dyn Backend>>) -> Self {
        Self {
            api,
            local,
            local_timeout: MIN_LOCAL_TIMEOUT,
            fallback_only: false,
        }
    }

    /// Set the local tier deadline. Never goes below [`MIN_LOCAL_TIMEOUT`].
    pub fn local_timeout(mut self, timeout: Duration) -> Self {
        self.local_timeout = timeout.max(MIN_LOCAL_TIMEOUT);
        self
    }

    /// Skip both backends and answer from the canned table
    pub fn fallback_only(mut self, enabled: bool) -> Self {
        self.fallback_only = enabled;
        self
    }

    /// Produce a single clean line for `request`.
    ///
    /// `cancel` is the caller's deadline; the local tier composes its own
    /// deadline underneath it.
    pub async fn generate(
        &self,
        cancel: &CancellationToken,
        request: &GenerationRequest,
    ) -> GenerationResult {
        if self.fallback_only {
            debug!("fallback mode enabled, skipping backends");
            return fallback::result(&request.category);
        }

        if let Some(api) = &self.api {
            debug!(tier = %BackendKind::Api, "trying backend");
            match api.generate(cancel, &request.prompt).await.and_then(clean) {
                Ok(text) => {
                    debug!(tier = %BackendKind::Api, "backend succeeded");
                    return GenerationResult::new(text, BackendKind::Api);
                }
                Err(err) => debug!(tier = %BackendKind::Api, error = %err, "backend failed"),
            }
        }

        if let Some(local) = &self.local {
            debug!(tier = %BackendKind::Local, timeout_s = self.local_timeout.as_secs(), "trying backend");
            match self.generate_local(local.as_ref(), cancel, &request.prompt).await {
                Ok(text) => {
                    debug!(tier = %BackendKind::Local, "backend succeeded");
                    return GenerationResult::new(text, BackendKind::Local);
                }
                Err(err) => debug!(tier = %BackendKind::Local, error = %err, "backend failed"),
            }
        }

        debug!(tier = %BackendKind::Fallback, "using canned response");
        fallback::result(&request.category)
    }

    /// Run the local tier under its own deadline, still subordinate to `cancel`.
    async fn generate_local(
        &self,
        local: &dyn Backend,
        cancel: &CancellationToken,
        prompt: &str,
    ) -> Result<String, BackendError> {
        let inner = cancel.child_token();
        let outcome = tokio::time::timeout(self.local_timeout, local.generate(&inner, prompt)).await;
        inner.cancel();

        match outcome {
            Ok(result) => result.and_then(clean),
            Err(_) => Err(BackendError::TransportFailure(format!(
                "no answer within {}s",
                self.local_timeout.as_secs()
            ))),
        }
    }
}

/// Sanitize raw backend text; nothing left over counts as an empty response.
fn clean(raw: String) -> Result<String, BackendError> {
    let text = sanitize(&raw);
    if text.is_empty() {
        Err(BackendError::EmptyResponse(
            "nothing left after sanitizing".to_string(),
        ))
    } else {
        Ok(text)
    }
}

/// Availability of one backend tier
#[derive(Debug, Clone, Serialize)]
pub struct TierStatus {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub available: bool,
}

/// Snapshot of configuration and backend reachability
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub fallback_mode: bool,
    pub debug: bool,
    pub personality: String,
    pub api: TierStatus,
    pub local: TierStatus,
}

impl StatusReport {
    /// Tiers in the order a call would try them
    pub fn priority(&self) -> Vec<(BackendKind, bool)> {
        if self.fallback_mode {
            return vec![(BackendKind::Fallback, true)];
        }

        let mut tiers = Vec::new();
        if self.api.enabled {
            tiers.push((BackendKind::Api, self.api.available));
        }
        if self.local.enabled {
            tiers.push((BackendKind::Local, self.local.available));
        }
        tiers.push((BackendKind::Fallback, true));
        tiers
    }
}

/// Probe every enabled backend. Probes run concurrently, each under its own
/// short timeout.
pub async fn status(config: &Config) -> StatusReport {
    let api_probe = async {
        if config.api.enabled {
            RemoteApiBackend::from_config(&config.api).is_available().await
        } else {
            false
        }
    };
    let local_probe = async {
        if config.local.enabled {
            LocalBackend::from_config(&config.local).is_available().await
        } else {
            false
        }
    };
    let (api_available, local_available) = tokio::join!(api_probe, local_probe);

    StatusReport {
        fallback_mode: config.general.fallback_mode,
        debug: config.general.debug,
        personality: config.general.personality.clone(),
        api: TierStatus {
            enabled: config.api.enabled,
            provider: config.api.provider.clone(),
            model: config.api.model.clone(),
            endpoint: config.api.endpoint.clone(),
            available: api_available,
        },
        local: TierStatus {
            enabled: config.local.enabled,
            provider: config.local.provider.clone(),
            model: config.local.model.clone(),
            endpoint: config.local.endpoint.clone(),
            available: local_available,
        },
    }
}
