//! Command-line interface definitions for the `parrot` tool.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// A sassy CLI that mocks your failed commands
#[derive(Parser, Debug)]
#[command(name = "parrot", version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n    parrot mock \"git push origin main\" 1\n    parrot status\n    parrot config init\n    parrot demo"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Show which backend tier was tried and used
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mock a failed command (called by shell hooks)
    Mock {
        /// The command that failed
        command: String,

        /// Its exit code
        #[arg(allow_negative_numbers = true)]
        exit_code: i32,
    },
    /// Show configuration and backend status
    Status {
        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },
    /// Print the default configuration, or create a config file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Show every personality in simple and enhanced style
    Demo,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Create a sample configuration file (refuses to overwrite)
    Init {
        /// Where to write it (default: <config dir>/parrot/config.toml)
        path: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_mock() {
        let cli = Cli::parse_from(["parrot", "mock", "git push origin main", "1"]);
        assert_eq!(
            cli.command,
            Some(Command::Mock {
                command: "git push origin main".to_string(),
                exit_code: 1,
            })
        );
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_mock_requires_exit_code() {
        assert!(Cli::try_parse_from(["parrot", "mock", "git push"]).is_err());
        assert!(Cli::try_parse_from(["parrot", "mock", "git push", "abc"]).is_err());
    }

    #[test]
    fn test_cli_debug_is_global() {
        let cli = Cli::parse_from(["parrot", "mock", "npm test", "1", "--debug"]);
        assert!(cli.debug);
        let cli = Cli::parse_from(["parrot", "-d", "status"]);
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_parses_status_json() {
        let cli = Cli::parse_from(["parrot", "status", "--json"]);
        assert_eq!(cli.command, Some(Command::Status { json: true }));
    }

    #[test]
    fn test_cli_parses_completions() {
        let cli = Cli::parse_from(["parrot", "--completions", "zsh"]);
        assert_eq!(cli.completions, Some(Shell::Zsh));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_no_subcommand() {
        let cli = Cli::parse_from(["parrot"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parses_config_actions() {
        let cli = Cli::parse_from(["parrot", "config"]);
        assert_eq!(cli.command, Some(Command::Config { action: None }));

        let cli = Cli::parse_from(["parrot", "config", "init"]);
        assert_eq!(
            cli.command,
            Some(Command::Config {
                action: Some(ConfigAction::Init { path: None })
            })
        );

        let cli = Cli::parse_from(["parrot", "config", "init", "/tmp/parrot.toml"]);
        assert_eq!(
            cli.command,
            Some(Command::Config {
                action: Some(ConfigAction::Init {
                    path: Some(PathBuf::from("/tmp/parrot.toml"))
                })
            })
        );
    }

    #[test]
    fn test_cli_parses_demo() {
        let cli = Cli::parse_from(["parrot", "demo"]);
        assert_eq!(cli.command, Some(Command::Demo));
    }
}
