use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use parrot::config::{
    default_config_path, generate_default_config, write_default_config, Config, LoadedConfig,
};
use parrot::output::{backend_note, format_response, print_status, render_demo, PARROT};
use parrot::providers::local::spawn_warmup;
use parrot::{logging, manager, respond, Cli, Command, ConfigAction, GenerationResult};

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "parrot", &mut io::stdout());
}

/// Load the config snapshot. A broken config file degrades to defaults.
fn load_config(debug: bool) -> (LoadedConfig, Option<anyhow::Error>) {
    let (mut loaded, problem) = match Config::load() {
        Ok(loaded) => (loaded, None),
        Err(err) => {
            let mut config = Config::default();
            config.apply_env_overrides();
            (
                LoadedConfig {
                    config,
                    source: None,
                },
                Some(err),
            )
        }
    };

    if debug {
        loaded.config.general.debug = true;
    }

    let general = &mut loaded.config.general;
    let dumb_terminal = std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false);
    if !io::stdout().is_terminal() || dumb_terminal {
        general.colors = false;
    }
    if !general.colors {
        colored::control::set_override(false);
    }

    (loaded, problem)
}

/// Print the hook line for one failed command.
///
/// Write errors are ignored: a closed hook pipe must not turn a mock into a
/// failing exit status.
async fn run_mock<W: Write>(
    config: &Config,
    command: &str,
    exit_code: i32,
    out: &mut W,
) -> GenerationResult {
    // Immediate feedback while the backends think
    let _ = write!(out, "{PARROT} ");
    let _ = out.flush();

    if config.local.enabled && !config.general.fallback_mode {
        let _ = spawn_warmup(&config.local);
    }

    let result = respond(config, command, exit_code, out).await;

    // Clear the pending line before printing the answer
    let _ = write!(out, "\r");
    let _ = writeln!(out, "{}", format_response(&config.general, &result.text));
    let _ = out.flush();

    if config.general.debug {
        let _ = writeln!(io::stderr(), "{}", backend_note(&result));
    }

    result
}

fn run_config_init(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => default_config_path().context("Could not determine the user config directory")?,
    };

    write_default_config(&path)?;

    println!("{} Created configuration file at: {}", "✓".green(), path.display());
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Add your API key: api_key = \"...\" (or export PARROT_API_KEY)");
    println!("  2. Check the backends: parrot status");
    println!("  3. Try it: parrot mock \"git push\" 1");

    Ok(())
}

async fn run_status(loaded: &LoadedConfig, json: bool) -> Result<()> {
    let report = manager::status(&loaded.config).await;

    if json {
        let payload = serde_json::json!({
            "config_source": loaded.source.as_ref().map(|p| p.display().to_string()),
            "status": report,
            "priority": report
                .priority()
                .into_iter()
                .map(|(tier, ready)| serde_json::json!({ "tier": tier, "ready": ready }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_status(&report, loaded.source.as_deref());
        if !report.api.enabled || loaded.config.api.api_key.is_empty() {
            println!(
                "  {} {}",
                "Tip:".blue().bold(),
                "export PARROT_API_KEY=\"your-key-here\" to enable the API backend".dimmed()
            );
        }
        if report.local.enabled && !report.local.available {
            println!(
                "  {} {}",
                "Tip:".blue().bold(),
                format!("ollama pull {}", report.local.model).as_str().dimmed()
            );
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        print_completions(shell);
        return Ok(());
    }

    let Some(command) = cli.command else {
        println!("{PARROT} Parrot is watching... waiting for you to mess up!");
        return Ok(());
    };

    match command {
        Command::Config { action: None } => {
            print!("{}", generate_default_config());
            return Ok(());
        }
        Command::Config {
            action: Some(ConfigAction::Init { path }),
        } => return run_config_init(path),
        _ => {}
    }

    let (loaded, problem) = load_config(cli.debug);
    let general = &loaded.config.general;
    logging::init(general.debug, general.colors);
    if let Some(err) = problem {
        tracing::warn!("using default configuration: {err:#}");
    }

    if command == Command::Demo {
        print!("{}", render_demo(general.colors));
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match command {
        Command::Mock { command, exit_code } => {
            runtime.block_on(run_mock(&loaded.config, &command, exit_code, &mut io::stdout()));
        }
        Command::Status { json } => runtime.block_on(run_status(&loaded, json))?,
        Command::Config { .. } | Command::Demo => {}
    }

    // Abandon any task still waiting on a backend.
    runtime.shutdown_background();

    Ok(())
}
