//! Timebox configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::Provider;

/// Main Timebox configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-provider LLM settings
    pub llm: LlmConfig,

    /// Priority list settings
    pub planner: PlannerConfig,

    /// Enhancement pipeline settings
    pub enhance: EnhanceConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.planner.slots == 0 {
            return Err(eyre::eyre!("planner.slots must be at least 1"));
        }
        if self.enhance.call_timeout_ms == 0 {
            return Err(eyre::eyre!("enhance.call-timeout-ms must be greater than 0"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .timebox.yml
        let local_config = PathBuf::from(".timebox.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/timebox/timebox.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("timebox").join("timebox.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM configuration, one section per provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub gemini: ProviderConfig,
    pub openai: ProviderConfig,
}

impl LlmConfig {
    /// Merge the provider's section over its built-in defaults
    pub fn resolve(&self, provider: Provider) -> ResolvedLlmConfig {
        let section = match provider {
            Provider::Gemini => &self.gemini,
            Provider::OpenAI => &self.openai,
        };
        let defaults = ResolvedLlmConfig::defaults_for(provider);

        ResolvedLlmConfig {
            provider,
            model: section.model.clone().unwrap_or(defaults.model),
            base_url: section.base_url.clone().unwrap_or(defaults.base_url),
            api_key_env: section.api_key_env.clone().unwrap_or(defaults.api_key_env),
            max_tokens: section.max_tokens.or(defaults.max_tokens),
            temperature: section.temperature.or(defaults.temperature),
            timeout_ms: section.timeout_ms.unwrap_or(defaults.timeout_ms),
        }
    }
}

/// Overrides for one provider; unset fields take the provider default
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API base URL
    #[serde(rename = "base-url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Environment variable consulted when no key is stored in settings
    #[serde(rename = "api-key-env", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// HTTP request timeout in milliseconds
    #[serde(rename = "timeout-ms", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Fully-resolved settings for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_ms: u64,
}

impl ResolvedLlmConfig {
    /// Built-in defaults for a provider
    pub fn defaults_for(provider: Provider) -> Self {
        match provider {
            Provider::Gemini => Self {
                provider,
                model: "gemini-2.5-flash-preview-04-17".to_string(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                max_tokens: None,
                temperature: None,
                timeout_ms: 60_000,
            },
            Provider::OpenAI => Self {
                provider,
                model: "gpt-3.5-turbo".to_string(),
                base_url: "https://api.openai.com".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                max_tokens: Some(150),
                temperature: Some(0.7),
                timeout_ms: 60_000,
            },
        }
    }

    /// Read the fallback API key from the configured environment variable
    pub fn env_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

/// Priority list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of top-priority slots
    pub slots: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            slots: crate::priorities::DEFAULT_SLOT_COUNT,
        }
    }
}

/// Enhancement pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Upper bound on a single refinement call, retries included
    #[serde(rename = "call-timeout-ms")]
    pub call_timeout_ms: u64,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self { call_timeout_ms: 60_000 }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Settings file location
    #[serde(rename = "settings-path")]
    pub settings_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: settingstore::default_store_path().to_string_lossy().into_owned(),
        }
    }
}

impl StorageConfig {
    /// Settings path with a leading `~/` resolved
    pub fn expanded_settings_path(&self) -> PathBuf {
        match self.settings_path.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.settings_path),
        }
    }
}
