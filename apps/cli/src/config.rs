//! Configuration resolution for the CLI.
//!
//! Resolves conclave.toml in priority order:
//! 1. `--config <path>` flag (explicit override)
//! 2. `{cwd}/.conclave/conclave.toml` (workspace config)
//! 3. `~/.config/conclave/conclave.toml` (global default)
//!
//! If the global default doesn't exist, it is generated automatically.

use anyhow::{Context, Result};
use openai::{OPENAI_BASE_URL, OpenAI};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config template generated when no config exists.
const DEFAULT_CONFIG: &str = r#"[gateway]
base_url = "https://api.openai.com/v1"
api_key = "${OPENAI_API_KEY}"

[runtime]
model = "o4-mini"
answer_model = "gpt-4.1"
prompt_model = "gpt-4.1"
brainstorm_rounds = 5
missing_agent = "create"

[runtime.paths]
cache = "agents/subject_cache.json"
logs = "logs"
sandbox = "root"
start = "start"
"#;

/// Everything the CLI reads from conclave.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model gateway connection.
    pub gateway: GatewayConfig,
    /// Runtime settings.
    pub runtime: runtime::Config,
}

/// Connection settings for an OpenAI-compatible service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// API base URL, without `/chat/completions`.
    pub base_url: String,
    /// API key; empty means no authorization header.
    pub api_key: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_owned(),
            api_key: String::new(),
        }
    }
}

impl GatewayConfig {
    /// Build the gateway these settings describe.
    pub fn build(&self) -> Result<OpenAI> {
        if self.api_key.is_empty() {
            tracing::warn!("no api key configured, sending unauthenticated requests");
        }
        OpenAI::new(reqwest::Client::new(), &self.base_url, &self.api_key)
    }
}

impl AppConfig {
    /// Parse from TOML, expanding `${VAR}` references first.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = expand_env_vars(toml_str);
        toml::from_str(&expanded).context("invalid conclave config")
    }

    /// Load from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }
}

/// Expand `${VAR}` patterns in a string with environment variable values.
///
/// Unknown variables are replaced with an empty string.
pub fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(value) = std::env::var(&name) {
                result.push_str(&value);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve the config following the priority chain.
pub fn resolve_config(config_flag: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = config_flag {
        return AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    let workspace_path = PathBuf::from(".conclave/conclave.toml");
    if workspace_path.exists() {
        return AppConfig::load(&workspace_path)
            .context("failed to load workspace config from .conclave/conclave.toml");
    }

    let global_path = global_config_path();
    if global_path.exists() {
        return AppConfig::load(&global_path).context("failed to load global config");
    }

    generate_default_config(&global_path)?;
    tracing::info!("generated default config at {}", global_path.display());
    AppConfig::load(&global_path).context("failed to load generated default config")
}

/// Path to the global default config.
fn global_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("conclave")
        .join("conclave.toml")
}

/// Write the default template to `path`.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    Ok(())
}
