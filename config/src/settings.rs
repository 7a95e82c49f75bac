//! Model connection settings resolved from environment variables.

use std::time::Duration;

use thiserror::Error;

/// Default model for OpenAI-compatible endpoints.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Default model when only a Google key is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("invalid SHUTTLE_TEMPERATURE {0:?}: expected a number between 0 and 2")]
    Temperature(String),
    #[error("invalid SHUTTLE_MODEL_TIMEOUT_SECS {0:?}: expected a positive integer")]
    Timeout(String),
}

/// Which endpoint family the settings point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// `OPENAI_BASE_URL` or the OpenAI default.
    OpenAiCompatible,
    /// Gemini's OpenAI-compatible endpoint, chosen by a Google key without a base URL.
    Gemini,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    /// Explicit API base; `None` means the provider default.
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub timeout: Option<Duration>,
}

impl ModelSettings {
    /// Reads `MODEL`/`OPENAI_MODEL`, `OPENAI_API_KEY`/`GOOGLE_API_KEY`,
    /// `OPENAI_BASE_URL`/`OPENAI_API_BASE`, `SHUTTLE_TEMPERATURE` and
    /// `SHUTTLE_MODEL_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|&k| get(k));

        let openai_key = get("OPENAI_API_KEY");
        let google_key = get("GOOGLE_API_KEY");
        let base_url = first(&["OPENAI_BASE_URL", "OPENAI_API_BASE"]);

        let provider = if openai_key.is_none() && google_key.is_some() && base_url.is_none() {
            Provider::Gemini
        } else {
            Provider::OpenAiCompatible
        };
        let model = first(&["MODEL", "OPENAI_MODEL"]).unwrap_or_else(|| {
            match provider {
                Provider::Gemini => DEFAULT_GEMINI_MODEL,
                Provider::OpenAiCompatible => DEFAULT_OPENAI_MODEL,
            }
            .to_string()
        });

        let temperature = match get("SHUTTLE_TEMPERATURE") {
            Some(raw) => Some(parse_temperature(&raw)?),
            None => None,
        };
        let timeout = match get("SHUTTLE_MODEL_TIMEOUT_SECS") {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            provider,
            model,
            api_key: openai_key.or(google_key),
            base_url,
            temperature,
            timeout,
        })
    }
}

/// Parses a sampling temperature in `0..=2`.
pub fn parse_temperature(raw: &str) -> Result<f32, SettingsError> {
    match raw.trim().parse::<f32>() {
        Ok(t) if (0.0..=2.0).contains(&t) => Ok(t),
        _ => Err(SettingsError::Temperature(raw.to_string())),
    }
}

/// Parses a timeout in whole seconds (at least 1).
pub fn parse_timeout(raw: &str) -> Result<Duration, SettingsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(SettingsError::Timeout(raw.to_string())),
    }
}
