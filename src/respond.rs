//! Bounded-latency generation.
//!
//! The manager call runs as a background task while the caller waits on a
//! single-slot channel, a progress timer and an overall deadline. Whatever
//! happens, a line comes back before the deadline (plus scheduling slack).

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::fallback;
use crate::manager::Manager;
use crate::prompts::{build_prompt, classify};
use crate::providers::{GenerationRequest, GenerationResult};

/// Shown once when the answer is slow
pub const THINKING_INDICATOR: &str = "💭";

/// Timing for one bounded call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyBudget {
    /// Hard wall-clock limit for the whole call
    pub deadline: Duration,
    /// Delay before the thinking indicator is shown
    pub progress_after: Duration,
}

impl Default for LatencyBudget {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(2),
            progress_after: Duration::from_millis(500),
        }
    }
}

/// Run one manager call under `budget`.
///
/// Writes [`THINKING_INDICATOR`] to `progress` at most once. On deadline the
/// in-flight call is cancelled and left to wind down on its own; the caller
/// gets the fallback line immediately.
pub async fn generate_within<W: Write>(
    manager: Arc<Manager>,
    request: GenerationRequest,
    budget: LatencyBudget,
    progress: &mut W,
) -> GenerationResult {
    let category = request.category.clone();
    let cancel = CancellationToken::new();
    let (tx, mut rx) = oneshot::channel();

    let task_cancel = cancel.clone();
    let started = tokio::time::Instant::now();
    tokio::spawn(async move {
        let result = manager.generate(&task_cancel, &request).await;
        // The receiver is gone once the deadline has passed.
        let _ = tx.send(result);
    });

    let deadline = tokio::time::sleep(budget.deadline);
    let thinking = tokio::time::sleep(budget.progress_after);
    tokio::pin!(deadline);
    tokio::pin!(thinking);
    let mut indicated = false;

    loop {
        tokio::select! {
            biased;

            received = &mut rx => match received {
                Ok(result) => {
                    debug!(
                        tier = %result.backend,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "result delivered"
                    );
                    return result;
                }
                Err(_) => {
                    warn!("generation task ended without a result");
                    break;
                }
            },
            _ = &mut deadline => {
                debug!(deadline_ms = budget.deadline.as_millis() as u64, "deadline reached, cancelling");
                break;
            }
            _ = &mut thinking, if !indicated => {
                indicated = true;
                let _ = write!(progress, "{THINKING_INDICATOR}");
                let _ = progress.flush();
            }
        }
    }

    cancel.cancel();
    fallback::result(&category)
}

/// Generation entrypoint for one failed command.
///
/// Classifies the command, renders the prompt for the configured personality
/// and runs the manager under the default latency budget.
pub async fn respond<W: Write>(
    config: &Config,
    command: &str,
    exit_code: i32,
    progress: &mut W,
) -> GenerationResult {
    respond_with_budget(config, command, exit_code, LatencyBudget::default(), progress).await
}

/// [`respond`] with an explicit budget
pub async fn respond_with_budget<W: Write>(
    config: &Config,
    command: &str,
    exit_code: i32,
    budget: LatencyBudget,
    progress: &mut W,
) -> GenerationResult {
    let category = classify(command);
    let prompt = build_prompt(category, command, exit_code, &config.general.personality);
    let manager = Arc::new(Manager::new(config));

    generate_within(manager, GenerationRequest::new(prompt, category), budget, progress).await
}
