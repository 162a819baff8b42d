//! Model provider configuration, read once at startup.
//!
//! The model is optional: with no API key configured, [`ModelConfig::from_env`]
//! returns `Ok(None)` and classification runs on rules alone.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const ENV_PROVIDER: &str = "SPENDTAG_PROVIDER";
pub const ENV_API_KEY: &str = "SPENDTAG_API_KEY";
pub const ENV_BASE_URL: &str = "SPENDTAG_BASE_URL";
pub const ENV_MODEL: &str = "SPENDTAG_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "SPENDTAG_TIMEOUT_SECS";

/// Accepted when the `SPENDTAG_*` variable is unset.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown model provider {0:?} (expected \"gemini\" or \"openai\")")]
    UnknownProvider(String),
    #[error("invalid timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Supported text-generation APIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini `generateContent`, key passed as a query parameter.
    #[default]
    Gemini,
    /// OpenAI-compatible `chat/completions`, key passed as a bearer token.
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAi => "https://api.openai.com",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "openai-compatible" => Ok(Self::OpenAi),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub provider: Provider,
    pub api_key: String,
    /// No trailing slash.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

// Keeps the key out of logs.
impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ModelConfig {
    /// Config for `provider` with its default endpoint, model, and timeout.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: provider.default_base_url().to_string(),
            model: provider.default_model().to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    /// Returns `Ok(None)` when no API key is available.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(api_key) = get(ENV_API_KEY).or_else(|| get(ENV_GEMINI_API_KEY)) else {
            return Ok(None);
        };

        let provider = match get(ENV_PROVIDER) {
            Some(raw) => raw.parse()?,
            None => Provider::default(),
        };

        let mut config = Self::new(provider, api_key);
        if let Some(url) = get(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }
        let model = get(ENV_MODEL).or_else(|| match provider {
            Provider::Gemini => get(ENV_GEMINI_MODEL),
            Provider::OpenAi => None,
        });
        if let Some(model) = model {
            config = config.with_model(model);
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config = config.with_timeout(parse_timeout(&raw)?);
        }

        Ok(Some(config))
    }
}

/// Parse a positive, possibly fractional, number of seconds.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| ConfigError::InvalidTimeout(raw.to_string()))
}
