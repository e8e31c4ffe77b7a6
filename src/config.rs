//! Configuration system for the `parrot` tool.
//!
//! A single snapshot is loaded per invocation: the first config file found,
//! then environment overrides on top. Nothing is reloaded afterwards.

use anyhow::{bail, Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::providers::local::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

/// Remote chat-completion API tier
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub enabled: bool,
    /// Informational provider name ("openai", "anthropic", "custom")
    pub provider: String,
    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "openai".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: 3,
        }
    }
}

/// Local inference tier
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LocalConfig {
    pub enabled: bool,
    /// Informational provider name ("ollama")
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    /// Request timeout in seconds, floored at 30 for the actual call
    pub timeout: u64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "ollama".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: 5,
        }
    }
}

/// General behavior
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// "mild", "sarcastic" or "savage"
    pub personality: String,
    /// Skip both backends and answer from the canned table
    pub fallback_mode: bool,
    /// Emit tier diagnostics on stderr
    pub debug: bool,
    pub colors: bool,
    /// Bordered output with emphasized keywords
    pub enhanced: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            personality: "savage".to_string(),
            fallback_mode: false,
            debug: false,
            colors: true,
            enhanced: false,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub local: LocalConfig,
    pub general: GeneralConfig,
}

/// A loaded configuration and the file it came from, if any
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load from the first existing config file, then apply environment overrides
    pub fn load() -> Result<LoadedConfig> {
        let source = Self::config_paths().into_iter().find(|p| p.exists());

        let mut config = match &source {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();

        Ok(LoadedConfig { config, source })
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Config file locations in order of preference
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(path) = env::var_os("PARROT_CONFIG").filter(|p| !p.is_empty()) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("/etc/parrot/config.toml"));
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("parrot").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".parrot.toml"));
        }
        paths.push(PathBuf::from("./parrot.toml"));

        paths
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());
        let is_true = |key: &str| var(key).map(|v| v == "true").unwrap_or(false);

        if let Some(key) = non_empty("PARROT_API_KEY") {
            self.api.api_key = key;
        }
        if let Some(endpoint) = non_empty("PARROT_API_ENDPOINT") {
            self.api.endpoint = endpoint;
        }
        if let Some(model) = non_empty("PARROT_API_MODEL") {
            self.api.model = model;
        }

        if let Some(endpoint) = non_empty("PARROT_OLLAMA_ENDPOINT") {
            self.local.endpoint = endpoint;
        }
        if let Some(model) = non_empty("PARROT_OLLAMA_MODEL") {
            self.local.model = model;
        }

        if let Some(personality) = non_empty("PARROT_PERSONALITY") {
            self.general.personality = personality;
        }
        if is_true("PARROT_FALLBACK_ONLY") {
            self.general.fallback_mode = true;
        }
        if is_true("PARROT_DEBUG") {
            self.general.debug = true;
        }
        if is_true("PARROT_NO_COLOR") || non_empty("NO_COLOR").is_some() {
            self.general.colors = false;
        }
        if is_true("PARROT_ENHANCED") {
            self.general.enhanced = true;
        }
    }
}

/// Where `parrot config init` writes when no path is given
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("parrot").join("config.toml"))
}

/// Write the sample config to `path`, creating parent directories.
/// An existing file is never replaced.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Configuration file already exists at: {}", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("Failed to create config file: {}", path.display()))?;
    file.write_all(generate_default_config().as_bytes())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Generate default config as TOML string
pub fn generate_default_config() -> String {
    r#"# Parrot configuration
# Place this file at ~/.config/parrot/config.toml (or ~/.parrot.toml)

[api]
# Remote chat-completion API, tried first
enabled = true
provider = "openai"
endpoint = "https://api.openai.com/v1"
api_key = ""            # or set PARROT_API_KEY
model = "gpt-3.5-turbo"
timeout = 3             # seconds

[local]
# Local Ollama server, tried second
enabled = true
provider = "ollama"
endpoint = "http://localhost:11434"
model = "phi3.5:3.8b"
timeout = 5             # seconds (local calls always get at least 30)

[general]
personality = "savage"  # mild, sarcastic, savage
fallback_mode = false   # only use built-in responses
debug = false
colors = true
enhanced = false

# Environment variable overrides:
# PARROT_CONFIG            - Path to this file
# PARROT_API_KEY           - API key
# PARROT_API_ENDPOINT      - API base URL
# PARROT_API_MODEL         - API model
# PARROT_OLLAMA_ENDPOINT   - Ollama base URL
# PARROT_OLLAMA_MODEL      - Ollama model
# PARROT_PERSONALITY       - Personality
# PARROT_FALLBACK_ONLY=true
# PARROT_DEBUG=true
# PARROT_NO_COLOR=true (or NO_COLOR)
# PARROT_ENHANCED=true
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.api.enabled);
        assert_eq!(config.api.endpoint, "https://api.openai.com/v1");
        assert_eq!(config.api.timeout, 3);
        assert_eq!(config.local.endpoint, "http://localhost:11434");
        assert_eq!(config.local.model, "phi3.5:3.8b");
        assert_eq!(config.general.personality, "savage");
        assert!(!config.general.fallback_mode);
        assert!(config.general.colors);
    }

    #[test]
    fn test_default_config_text_parses_to_defaults() {
        let parsed: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\napi_key = \"sk-file\"\n\n[general]\ndebug = true").unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.api.api_key, "sk-file");
        assert_eq!(config.api.model, "gpt-3.5-turbo");
        assert!(config.general.debug);
        assert_eq!(config.local, LocalConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nenabled = ").unwrap();

        let err = Config::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("PARROT_API_KEY", "sk-env"),
            ("PARROT_API_MODEL", "gpt-4o-mini"),
            ("PARROT_OLLAMA_ENDPOINT", "http://gpu-box:11434"),
            ("PARROT_PERSONALITY", "mild"),
            ("PARROT_FALLBACK_ONLY", "true"),
            ("PARROT_DEBUG", "true"),
            ("NO_COLOR", "1"),
        ]));

        assert_eq!(config.api.api_key, "sk-env");
        assert_eq!(config.api.model, "gpt-4o-mini");
        assert_eq!(config.local.endpoint, "http://gpu-box:11434");
        assert_eq!(config.general.personality, "mild");
        assert!(config.general.fallback_mode);
        assert!(config.general.debug);
        assert!(!config.general.colors);
        assert!(!config.general.enhanced);
    }

    #[test]
    fn test_env_flags_require_literal_true() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("PARROT_FALLBACK_ONLY", "1"),
            ("PARROT_API_KEY", ""),
        ]));
        assert!(!config.general.fallback_mode);
        assert!(config.api.api_key.is_empty());
    }

    #[test]
    fn test_config_paths_end_with_working_directory() {
        let paths = Config::config_paths();
        assert!(paths.contains(&PathBuf::from("/etc/parrot/config.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("./parrot.toml")));
    }

    #[test]
    fn test_write_default_config_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parrot").join("config.toml");

        write_default_config(&path).unwrap();

        assert_eq!(Config::load_from_path(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_write_default_config_refuses_to_overwrite() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\npersonality = \"mild\"").unwrap();

        let err = write_default_config(file.path()).unwrap_err();

        assert!(err.to_string().contains("already exists"));
        let kept = Config::load_from_path(file.path()).unwrap();
        assert_eq!(kept.general.personality, "mild");
    }

    #[test]
    fn test_default_config_path_is_under_config_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("parrot/config.toml"));
        }
    }
}
