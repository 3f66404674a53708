//! Configuration (layered: defaults < config file < environment).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChickError;
use crate::models::{LanguageModel, ProviderKey};
use crate::types::GenerationSettings;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CHICK_CONFIG";

/// Settings consumed by the agent and the model client.
#[derive(Clone, Builder, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChickConfig {
    #[builder(default = ProviderKey::DeepSeek)]
    pub provider: ProviderKey,
    /// Model id, optionally prefixed with a provider (`openai:gpt-4o`).
    #[builder(into, default = "deepseek-chat".to_string())]
    pub model: String,
    #[builder(default = 0.7)]
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    #[builder(default)]
    pub debug: bool,
    #[builder(into, default = "INFO".to_string())]
    pub log_level: String,
    /// Prompt window ceiling for conversation history.
    #[builder(default = 100)]
    pub max_history_length: usize,
    #[serde(skip_serializing)]
    #[builder(into)]
    pub api_key: Option<String>,
    #[builder(into)]
    pub base_url: Option<String>,
}

impl Default for ChickConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ChickConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChickConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("debug", &self.debug)
            .field("log_level", &self.log_level)
            .field("max_history_length", &self.max_history_length)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ChickConfig {
    /// Load the full layered configuration.
    ///
    /// Reads `.env` if present, then the config file (if one exists), then
    /// applies environment overrides.
    pub fn load() -> Result<Self, ChickError> {
        let _ = dotenvy::dotenv();

        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Defaults overridden by the process environment only.
    pub fn from_env() -> Result<Self, ChickError> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ChickError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        debug!(path = %path.display(), "read config file");
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ChickError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("CHICK_PROVIDER") {
            self.provider = provider.parse()?;
        }
        if let Some(model) = get("CHICK_MODEL") {
            self.model = model;
        }
        if let Some(temperature) = get("TEMPERATURE") {
            self.temperature = parse_env("TEMPERATURE", &temperature)?;
        }
        if let Some(max_tokens) = get("MAX_TOKENS") {
            self.max_tokens = Some(parse_env("MAX_TOKENS", &max_tokens)?);
        }
        if let Some(debug) = get("DEBUG") {
            self.debug = debug.trim().eq_ignore_ascii_case("true");
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(max_history) = get("MAX_HISTORY_LENGTH") {
            self.max_history_length = parse_env("MAX_HISTORY_LENGTH", &max_history)?;
        }

        let provider = self.language_model().provider;
        if let Some(key) = get(provider.api_key_env()) {
            self.api_key = Some(key);
        }
        if let Some(url) = get("CHICK_BASE_URL") {
            self.base_url = Some(url);
        }
        Ok(())
    }

    /// The provider and model id selected by this config.
    pub fn language_model(&self) -> LanguageModel {
        LanguageModel::resolve(&self.model, self.provider)
    }

    /// Per-request settings derived from this config.
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }

    /// Filter directive for the log subscriber.
    pub fn log_filter(&self) -> String {
        if self.debug {
            "debug".to_string()
        } else {
            self.log_level.to_ascii_lowercase()
        }
    }
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T, ChickError> {
    raw.trim()
        .parse()
        .map_err(|_| ChickError::Configuration(format!("Invalid value for {key}: '{raw}'")))
}

/// Config file location: `$CHICK_CONFIG`, else `~/.chick/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".chick").join("config.toml"))
}
