//! Terminal output formatting.

use colored::{Color, ColoredString, Colorize};
use regex::Regex;
use std::sync::OnceLock;

use crate::config::GeneralConfig;
use crate::manager::StatusReport;
use crate::providers::{BackendKind, GenerationResult};

/// Prefix of every response line
pub const PARROT: &str = "🦜";

/// Words that get shouted in enhanced mode
const EMPHASIS_WORDS: [&str; 14] = [
    "failed",
    "error",
    "disaster",
    "incompetent",
    "broken",
    "genius",
    "classic",
    "impressive",
    "amazing",
    "brilliant",
    "404",
    "rejected",
    "crashed",
    "destroyed",
];

/// Colors for one personality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub parrot: Color,
    pub response: Color,
    pub accent: Color,
}

impl Style {
    pub fn for_personality(personality: &str) -> Self {
        match personality {
            "mild" => Self {
                parrot: Color::BrightBlue,
                response: Color::Blue,
                accent: Color::BrightCyan,
            },
            "sarcastic" => Self {
                parrot: Color::BrightYellow,
                response: Color::Yellow,
                accent: Color::BrightMagenta,
            },
            "savage" => Self {
                parrot: Color::BrightRed,
                response: Color::Red,
                accent: Color::BrightYellow,
            },
            _ => Self {
                parrot: Color::BrightGreen,
                response: Color::Green,
                accent: Color::BrightCyan,
            },
        }
    }
}

fn emphasis_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            let words = EMPHASIS_WORDS.join("|");
            Regex::new(&format!(r"(?i)\b({words})\b")).ok()
        })
        .as_ref()
}

/// Format the final response line for the terminal
pub fn format_response(general: &GeneralConfig, text: &str) -> String {
    if !general.colors {
        return format!("{PARROT} {text}");
    }

    let style = Style::for_personality(&general.personality);
    if general.enhanced {
        return format!(
            "{} {} {}",
            "━".color(style.accent),
            format!("{PARROT} ▶").as_str().color(style.parrot),
            emphasize(text, style)
        );
    }

    format!("{} {}", PARROT.color(style.parrot), text.color(style.response))
}

/// Upper-case and highlight emphasis words, coloring the rest as a response.
fn emphasize(text: &str, style: Style) -> String {
    let Some(pattern) = emphasis_pattern() else {
        return text.color(style.response).to_string();
    };

    let mut out = String::new();
    let mut last = 0;

    for found in pattern.find_iter(text) {
        out.push_str(&text[last..found.start()].color(style.response).to_string());
        out.push_str(&accent(found.as_str(), style).to_string());
        last = found.end();
    }
    out.push_str(&text[last..].color(style.response).to_string());

    out
}

fn accent(word: &str, style: Style) -> ColoredString {
    word.to_uppercase().as_str().color(style.accent).bold()
}

/// One-line note naming the tier that answered
pub fn backend_note(result: &GenerationResult) -> String {
    let label = match result.backend {
        BackendKind::Api => "🌐 API backend used",
        BackendKind::Local => "🖥️ Local backend used",
        BackendKind::Fallback => "🔄 Fallback backend used",
    };
    label.dimmed().to_string()
}

/// Failed commands shown by `parrot demo`
const DEMO_COMMANDS: [(&str, &str); 4] = [
    ("git push origin main", "git"),
    ("npm install express", "nodejs"),
    ("docker run myapp", "docker"),
    ("curl https://api.example.com", "http"),
];

const DEMO_PERSONALITIES: [&str; 3] = ["mild", "sarcastic", "savage"];

fn demo_line(personality: &str, category: &str) -> &'static str {
    match (personality, category) {
        ("mild", "git") => "Git command failed. Maybe check your remote branch?",
        ("mild", "nodejs") => "NPM seems unhappy. Try clearing your cache?",
        ("mild", "docker") => "Container seems upset. Check your Dockerfile?",
        ("mild", "http") => "Request didn't go through. Check the URL?",
        ("mild", _) => "Command didn't work as expected. Check the syntax?",
        ("savage", "git") => "Git rejected your code harder than everyone rejects you.",
        ("savage", "nodejs") => "NPM refuses to install anything for someone this incompetent.",
        ("savage", "docker") => "Your containers crash faster than your career prospects.",
        ("savage", "http") => "The internet collectively rejected you. Impressive.",
        ("savage", _) => "Your command failed harder than you failed at life.",
        (_, "git") => "Another git genius who forgot to pull first. Classic.",
        (_, "nodejs") => "NPM install failed? Shocking! Nobody saw that coming.",
        (_, "docker") => "Docker container more like docker DISASTER!",
        (_, "http") => "404: Competence not found.",
        _ => "Wow, you managed to break something simple. Impressive!",
    }
}

/// Render the personality showcase: every personality, simple and enhanced.
pub fn render_demo(colors: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{PARROT} Parrot Personality & Color Demo\n"));
    out.push_str(&format!("{}\n\n", "═".repeat(35)));

    for personality in DEMO_PERSONALITIES {
        out.push_str(&format!("🎭 {personality} Personality\n"));
        out.push_str(&format!("{}\n", "─".repeat(21)));

        let simple = GeneralConfig {
            personality: personality.to_string(),
            colors,
            enhanced: false,
            ..GeneralConfig::default()
        };
        let enhanced = GeneralConfig {
            enhanced: true,
            ..simple.clone()
        };

        for (command, category) in DEMO_COMMANDS {
            let line = demo_line(personality, category);
            out.push_str(&format!("Command: {command}\n"));
            out.push_str(&format!("  Simple:   {}\n", format_response(&simple, line)));
            out.push_str(&format!("  Enhanced: {}\n\n", format_response(&enhanced, line)));
        }
        out.push('\n');
    }

    out.push_str(&format!("🎨 Colors enabled: {colors}\n"));
    if !colors {
        out.push_str("   💡 To enable colors, run in a terminal without NO_COLOR set\n");
    }
    out
}

fn mark(ok: bool) -> ColoredString {
    if ok {
        "✓".green()
    } else {
        "✗".red()
    }
}

/// Print the status report
pub fn print_status(report: &StatusReport, source: Option<&std::path::Path>) {
    println!("{} {}", PARROT, "Parrot Status".bold());
    println!();

    println!("{} {}", "▸".blue(), "Configuration".blue().bold());
    match source {
        Some(path) => println!("  {} {}", "Loaded from:".bold(), path.display()),
        None => println!("  {}", "Using defaults (no config file found)".dimmed()),
    }
    println!("  {} {}", "Personality:".bold(), report.personality);
    println!("  {} {}", "Debug:".bold(), report.debug);
    println!("  {} {}", "Fallback only:".bold(), report.fallback_mode);
    println!();

    for (title, tier, hint) in [
        ("API Backend", &report.api, "check API key/endpoint"),
        ("Local Backend", &report.local, "check that Ollama is running"),
    ] {
        println!("{} {}", "▸".blue(), title.blue().bold());
        if tier.enabled {
            println!("  {} {}", "Provider:".bold(), tier.provider);
            println!("  {} {}", "Model:".bold(), tier.model);
            println!("  {} {}", "Endpoint:".bold(), tier.endpoint);
            if tier.available {
                println!("  {} {} available", "Status:".bold(), mark(true));
            } else {
                println!(
                    "  {} {} unavailable {}",
                    "Status:".bold(),
                    mark(false),
                    format!("({hint})").as_str().dimmed()
                );
            }
        } else {
            println!("  {} {}", "Enabled:".bold(), mark(false));
        }
        println!();
    }

    println!("{} {}", "▸".blue(), "Fallback Backend".blue().bold());
    println!("  {} {} always available", "Status:".bold(), mark(true));
    println!();

    println!("{} {}", "▸".magenta(), "Backend Priority".magenta().bold());
    for (position, (tier, ready)) in report.priority().into_iter().enumerate() {
        let state = match (tier, ready, report.fallback_mode) {
            (BackendKind::Fallback, _, true) => "forced",
            (BackendKind::Fallback, _, false) => "always",
            (_, true, _) => "ready",
            (_, false, _) => "unavailable",
        };
        println!("  {}. {} ({})", position + 1, tier, state);
    }
    println!();
}
