use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::plan::Plan;
use crate::summarizer::{GeminiConfig, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_BRAND: &str = "DRM News Summary";
pub const DEFAULT_HISTORY_PATH: &str = ".newsdigest/history.json";

/// Application configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Only needed by commands that call the summarization service.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub plan: Plan,
    pub history_path: PathBuf,
    /// Shown in the metadata line of PDF exports.
    pub brand: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            plan: Plan::Free,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            brand: DEFAULT_BRAND.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // .env is optional
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            api_key: var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
            model: var("NEWSDIGEST_MODEL").unwrap_or(defaults.model),
            api_base: var("NEWSDIGEST_API_BASE").unwrap_or(defaults.api_base),
            timeout_secs: match var("NEWSDIGEST_TIMEOUT_SECS") {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .context("NEWSDIGEST_TIMEOUT_SECS must be a whole number of seconds")?,
                None => defaults.timeout_secs,
            },
            plan: match var("NEWSDIGEST_PLAN") {
                Some(v) => v.parse::<Plan>()?,
                None => defaults.plan,
            },
            history_path: var("NEWSDIGEST_HISTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_path),
            brand: var("NEWSDIGEST_BRAND").unwrap_or(defaults.brand),
        })
    }

    /// Client settings for the summarization service; fails without an API key.
    pub fn gemini(&self) -> Result<GeminiConfig> {
        let api_key = self
            .api_key
            .clone()
            .context("Required environment variable 'GEMINI_API_KEY' is not set")?;
        Ok(GeminiConfig {
            api_key,
            model: self.model.clone(),
            base_url: self.api_base.clone(),
            timeout_secs: self.timeout_secs,
        })
    }
}
