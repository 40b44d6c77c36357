use std::env;
use std::time::Duration;

use crate::models::{ParseEnumError, ProviderId};

/// Errors from reading provider configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidProvider(#[from] ParseEnumError),

    #[error("invalid MACROCOACH_TIMEOUT_SECS value {0:?} (expected a positive number of whole seconds)")]
    InvalidTimeout(String),
}

/// Provider configuration, read once at startup and read-only afterwards.
///
/// Environment variables:
/// - `MACROCOACH_PROVIDER`: `together` or `gemini` (default `gemini`)
/// - `MACROCOACH_MODEL`: model id (provider default when unset)
/// - `MACROCOACH_BASE_URL`: endpoint root (provider default when unset)
/// - `TOGETHER_API_KEY` / `GOOGLE_API_KEY`: credential for the selected provider
/// - `MACROCOACH_TIMEOUT_SECS`: per-request transport timeout
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider: ProviderId,
    pub model: String,
    pub base_url: String,
    /// Credential for `provider`. Validated when the provider is constructed,
    /// not here.
    pub api_key: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub const DEFAULT_PROVIDER: ProviderId = ProviderId::Gemini;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Default model id for a provider.
    pub fn default_model(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::Together => "mistralai/Mixtral-8x7B-Instruct-v0.1",
            ProviderId::Gemini => "gemini-pro",
        }
    }

    /// Default endpoint root for a provider.
    pub fn default_base_url(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::Together => "https://api.together.xyz/v1",
            ProviderId::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Name of the environment variable holding the credential for `provider`.
    pub fn api_key_var(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::Together => "TOGETHER_API_KEY",
            ProviderId::Gemini => "GOOGLE_API_KEY",
        }
    }

    /// A config with provider defaults and the given credential.
    pub fn new(provider: ProviderId, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            model: Self::default_model(provider).to_owned(),
            base_url: Self::default_base_url(provider).to_owned(),
            api_key: api_key.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("MACROCOACH_PROVIDER") {
            Some(p) => p.trim().parse()?,
            None => Self::DEFAULT_PROVIDER,
        };

        let mut config = Self::new(provider, get(Self::api_key_var(provider)).unwrap_or_default());

        if let Some(model) = get("MACROCOACH_MODEL") {
            config.model = model;
        }
        if let Some(url) = get("MACROCOACH_BASE_URL") {
            config.base_url = url;
        }
        if let Some(raw) = get("MACROCOACH_TIMEOUT_SECS") {
            // Zero would make every request time out before it starts.
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&secs| secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// The base URL without a trailing slash, for joining paths.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
