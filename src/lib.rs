//! Parrot - snarky one-liners for failed shell commands
//!
//! This library provides the core of the `parrot` CLI: the text-generation
//! backends, the tier fallback policy, the bounded-latency wrapper and the
//! sanitizer that turns model output into a single terminal line.

pub mod cli;
pub mod config;
pub mod fallback;
pub mod logging;
pub mod manager;
pub mod output;
pub mod prompts;
pub mod providers;
pub mod respond;
pub mod sanitize;

// Re-export commonly used types
pub use cli::{Cli, Command, ConfigAction};
pub use config::Config;
pub use manager::Manager;
pub use providers::{Backend, BackendError, BackendKind, GenerationRequest, GenerationResult};
pub use respond::{respond, LatencyBudget};
pub use sanitize::sanitize;
