//! Diagnostics subscriber setup.
//!
//! Only `PARROT_LOG` is consulted, so a `RUST_LOG` exported for other tools
//! never leaks HTTP client noise into the terminal after a failed command.

use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

/// Environment variable holding extra filter directives
pub const LOG_ENV: &str = "PARROT_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";
const DEBUG_DIRECTIVE: &str = "parrot=debug";

/// Build the event filter.
///
/// `directives` (normally `PARROT_LOG`) replaces the `warn` baseline when it
/// parses. Debug mode always adds `parrot=debug` on top of whatever was set.
pub fn filter(directives: Option<&str>, debug: bool) -> EnvFilter {
    let base = directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES));

    if !debug {
        return base;
    }
    match DEBUG_DIRECTIVE.parse() {
        Ok(directive) => base.add_directive(directive),
        Err(_) => base,
    }
}

/// Install the stderr subscriber. ANSI escapes only when `colors` is on and
/// stderr is a terminal.
pub fn init(debug: bool, colors: bool) {
    let directives = std::env::var(LOG_ENV).ok();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(directives.as_deref(), debug))
        .with_writer(io::stderr)
        .with_ansi(colors && io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_is_warn() {
        assert_eq!(filter(None, false).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(filter(Some("  "), false).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_debug_enables_crate_events() {
        let filter = filter(None, true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(filter.to_string().contains(DEBUG_DIRECTIVE));
    }

    #[test]
    fn test_debug_survives_quieter_directives() {
        let filter = filter(Some("info"), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(filter.to_string().contains(DEBUG_DIRECTIVE));
    }

    #[test]
    fn test_explicit_directives_apply_without_debug() {
        let filter = filter(Some("parrot=trace"), false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
        assert!(!filter.to_string().contains(DEBUG_DIRECTIVE));
    }
}
