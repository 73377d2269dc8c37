//! User preferences persisted in the settings store
//!
//! Values are read once at start and written back on every change.

use std::fmt;
use std::str::FromStr;

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use settingstore::KvStore;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::enhance::{DEFAULT_PROMPT, EnhanceRequest, PromptTemplate};
use crate::llm::Provider;

/// Prompts remembered in the history gallery
pub const MAX_PROMPT_HISTORY: usize = 5;

pub const DEFAULT_THEME: &str = "Default";

/// Theme names the presentation layer knows how to draw
pub const THEMES: [&str; 5] = [DEFAULT_THEME, "Forest", "Ocean", "Sunset", "Monochrome"];
pub const DEFAULT_DAY_START: u8 = 5;
pub const DEFAULT_DAY_END: u8 = 23;

/// Store keys
pub mod keys {
    pub const THEME: &str = "theme";
    pub const DAY_START: &str = "dayStartTime";
    pub const DAY_END: &str = "dayEndTime";
    pub const TIME_FORMAT: &str = "timeFormat";
    pub const AI_ENABLED: &str = "aiEnabled";
    pub const GEMINI_API_KEY: &str = "geminiApiKey";
    pub const OPENAI_API_KEY: &str = "openAiApiKey";
    pub const PROVIDER: &str = "preferredAiService";
    pub const ACTIVE_PROMPT: &str = "activeAiPrompt";
    pub const PROMPT_HISTORY: &str = "aiPromptHistory";
}

/// Clock display format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "12h",
            TimeFormat::TwentyFourHour => "24h",
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "12h" => Ok(TimeFormat::TwelveHour),
            "24h" => Ok(TimeFormat::TwentyFourHour),
            other => Err(format!("Unknown time format: '{}'. Supported: 12h, 24h", other)),
        }
    }
}

/// Typed view over the settings store
#[derive(Debug)]
pub struct Settings<S: KvStore> {
    store: S,
    theme: String,
    day_start: u8,
    day_end: u8,
    time_format: TimeFormat,
    ai_enabled: bool,
    gemini_api_key: String,
    openai_api_key: String,
    provider: Provider,
    active_prompt: PromptTemplate,
    prompt_history: Vec<PromptTemplate>,
}

impl<S: KvStore> Settings<S> {
    /// Read every preference, substituting defaults for missing or invalid values
    pub fn load(mut store: S) -> Result<Self> {
        debug!("load: called");
        let theme = match store.get(keys::THEME)? {
            Some(raw) => match known_theme(&raw) {
                Some(name) => name.to_string(),
                None => {
                    warn!(value = %raw, "Unknown theme in settings, using default");
                    DEFAULT_THEME.to_string()
                }
            },
            None => DEFAULT_THEME.to_string(),
        };
        let day_start = parse_or(&store, keys::DAY_START, DEFAULT_DAY_START, valid_hour)?;
        let day_end = parse_or(&store, keys::DAY_END, DEFAULT_DAY_END, valid_hour)?;
        let time_format = parse_or(&store, keys::TIME_FORMAT, TimeFormat::default(), |_| true)?;
        let ai_enabled = parse_or(&store, keys::AI_ENABLED, true, |_| true)?;
        let provider = parse_or(&store, keys::PROVIDER, Provider::default(), |_| true)?;
        let gemini_api_key = store.get(keys::GEMINI_API_KEY)?.unwrap_or_default();
        let openai_api_key = store.get(keys::OPENAI_API_KEY)?.unwrap_or_default();

        let active_prompt = store
            .get(keys::ACTIVE_PROMPT)?
            .filter(|p| !p.trim().is_empty())
            .map(PromptTemplate::new)
            .unwrap_or_default();

        let mut prompt_history: Vec<PromptTemplate> = match store.get_json(keys::PROMPT_HISTORY) {
            Ok(history) => history.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Invalid prompt history in settings, starting fresh");
                Vec::new()
            }
        };
        if !prompt_history.contains(&active_prompt) {
            debug!("load: active prompt missing from history, inserting");
            push_front(&mut prompt_history, active_prompt.clone());
            store.set_json(keys::PROMPT_HISTORY, &prompt_history)?;
        }

        info!(%provider, ai_enabled, history = prompt_history.len(), "Loaded settings");
        Ok(Self {
            store,
            theme,
            day_start,
            day_end,
            time_format,
            ai_enabled,
            gemini_api_key,
            openai_api_key,
            provider,
            active_prompt,
            prompt_history,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn day_start(&self) -> u8 {
        self.day_start
    }

    pub fn day_end(&self) -> u8 {
        self.day_end
    }

    pub fn time_format(&self) -> TimeFormat {
        self.time_format
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn active_prompt(&self) -> &PromptTemplate {
        &self.active_prompt
    }

    /// Most recently activated first
    pub fn prompt_history(&self) -> &[PromptTemplate] {
        &self.prompt_history
    }

    /// Stored key for `provider`, if non-blank
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Gemini => &self.gemini_api_key,
            Provider::OpenAI => &self.openai_api_key,
        };
        Some(key.as_str()).filter(|k| !k.trim().is_empty())
    }

    /// Select one of [`THEMES`] (case-insensitive)
    pub fn set_theme(&mut self, name: &str) -> Result<()> {
        let Some(name) = known_theme(name) else {
            return Err(eyre!("Unknown theme '{}' (choose from: {})", name.trim(), THEMES.join(", ")));
        };
        self.store.set(keys::THEME, name)?;
        self.theme = name.to_string();
        Ok(())
    }

    /// Set the visible day window; hours are 0-23 and start must precede end
    pub fn set_day_hours(&mut self, start: u8, end: u8) -> Result<()> {
        if !valid_hour(&start) || !valid_hour(&end) {
            return Err(eyre!("Hours must be between 0 and 23"));
        }
        if start >= end {
            return Err(eyre!("Day start ({}) must be before day end ({})", start, end));
        }
        self.store.set(keys::DAY_START, &start.to_string())?;
        self.store.set(keys::DAY_END, &end.to_string())?;
        self.day_start = start;
        self.day_end = end;
        Ok(())
    }

    pub fn set_time_format(&mut self, format: TimeFormat) -> Result<()> {
        self.store.set(keys::TIME_FORMAT, format.as_str())?;
        self.time_format = format;
        Ok(())
    }

    pub fn set_ai_enabled(&mut self, enabled: bool) -> Result<()> {
        self.store.set(keys::AI_ENABLED, &enabled.to_string())?;
        self.ai_enabled = enabled;
        info!(enabled, "AI features toggled");
        Ok(())
    }

    /// Store (or, with blank input, clear) the key for `provider`
    pub fn set_api_key(&mut self, provider: Provider, key: &str) -> Result<()> {
        let key = key.trim();
        let store_key = match provider {
            Provider::Gemini => keys::GEMINI_API_KEY,
            Provider::OpenAI => keys::OPENAI_API_KEY,
        };
        self.store.set(store_key, key)?;
        match provider {
            Provider::Gemini => self.gemini_api_key = key.to_string(),
            Provider::OpenAI => self.openai_api_key = key.to_string(),
        }
        info!(%provider, cleared = key.is_empty(), "Updated API key");
        Ok(())
    }

    pub fn set_provider(&mut self, provider: Provider) -> Result<()> {
        self.store.set(keys::PROVIDER, provider.as_str())?;
        self.provider = provider;
        Ok(())
    }

    /// Activate `text`, moving it to the front of the history
    pub fn set_active_prompt(&mut self, text: &str) -> Result<()> {
        debug!("set_active_prompt: called");
        if text.trim().is_empty() {
            return Err(eyre!("Prompt cannot be empty"));
        }
        let prompt = PromptTemplate::new(text);
        if !prompt.has_placeholder() {
            warn!("Activated prompt has no {{TASK_TEXT}} placeholder; task text will be appended");
        }

        let mut history = self.prompt_history.clone();
        push_front(&mut history, prompt.clone());
        self.commit_prompts(prompt, history)
    }

    /// Remove `text` from the history
    ///
    /// Deleting the active prompt activates the next entry, or the default
    /// prompt when none is left. The history is never left empty.
    pub fn delete_prompt(&mut self, text: &str) -> Result<bool> {
        debug!("delete_prompt: called");
        let target = PromptTemplate::new(text);
        if !self.prompt_history.contains(&target) && self.active_prompt != target {
            return Ok(false);
        }

        let mut history: Vec<PromptTemplate> = self
            .prompt_history
            .iter()
            .filter(|p| **p != target)
            .cloned()
            .collect();
        if history.is_empty() {
            history.push(PromptTemplate::new(DEFAULT_PROMPT));
        }

        let active = if self.active_prompt == target {
            history.first().cloned().unwrap_or_default()
        } else {
            self.active_prompt.clone()
        };
        self.commit_prompts(active, history)?;
        Ok(true)
    }

    /// Restore the built-in prompt as the active one
    pub fn reset_prompt(&mut self) -> Result<()> {
        self.set_active_prompt(DEFAULT_PROMPT)
    }

    fn commit_prompts(&mut self, active: PromptTemplate, history: Vec<PromptTemplate>) -> Result<()> {
        self.store.set(keys::ACTIVE_PROMPT, active.as_str())?;
        self.store.set_json(keys::PROMPT_HISTORY, &history)?;
        self.active_prompt = active;
        self.prompt_history = history;
        Ok(())
    }

    /// Snapshot the inputs for an enhancement run
    ///
    /// A key stored in settings wins; otherwise the provider's configured
    /// environment variable is used.
    pub fn enhance_request(&self, llm: &LlmConfig) -> EnhanceRequest {
        let credential = self
            .api_key(self.provider)
            .map(str::to_string)
            .or_else(|| llm.resolve(self.provider).env_api_key());
        EnhanceRequest {
            enabled: self.ai_enabled,
            provider: self.provider,
            credential,
            prompt: self.active_prompt.clone(),
        }
    }
}

fn valid_hour(hour: &u8) -> bool {
    *hour <= 23
}

fn push_front(history: &mut Vec<PromptTemplate>, prompt: PromptTemplate) {
    history.retain(|p| *p != prompt);
    history.insert(0, prompt);
    history.truncate(MAX_PROMPT_HISTORY);
}

fn parse_or<S, T>(store: &S, key: &str, default: T, valid: impl Fn(&T) -> bool) -> Result<T>
where
    S: KvStore,
    T: FromStr + fmt::Display,
{
    let Some(raw) = store.get(key)? else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Ok(value),
        _ => {
            warn!(%key, value = %raw, %default, "Invalid stored setting, using default");
            Ok(default)
        }
    }
}

fn known_theme(name: &str) -> Option<&'static str> {
    let name = name.trim();
    THEMES.iter().copied().find(|t| t.eq_ignore_ascii_case(name))
}
