//! Configuration file management for macrocoach.
//!
//! Provides a TOML config file (see [`config_path`]) holding the provider
//! choice and API keys, and a resolution chain: CLI flag > env var > config
//! file > default.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use macrocoach_model::{ProviderConfig, ProviderId};
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub provider: ProviderSection,
    #[serde(default)]
    pub keys: KeysSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSection {
    /// `together` or `gemini`.
    pub kind: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeysSection {
    pub together: Option<String>,
    pub google: Option<String>,
}

impl ConfigFile {
    /// The file's value for one of the `ProviderConfig` environment
    /// variables. Model and base URL only apply when the file's provider is
    /// the one being configured.
    fn value(&self, var: &str, provider: &str) -> Option<String> {
        let same_provider = self.provider.kind == provider;
        match var {
            "MACROCOACH_PROVIDER" => Some(self.provider.kind.clone()),
            "MACROCOACH_MODEL" if same_provider => self.provider.model.clone(),
            "MACROCOACH_BASE_URL" if same_provider => self.provider.base_url.clone(),
            "MACROCOACH_TIMEOUT_SECS" => self.provider.timeout_secs.map(|s| s.to_string()),
            "TOGETHER_API_KEY" => self.keys.together.clone(),
            "GOOGLE_API_KEY" => self.keys.google.clone(),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Where the config file lives.
///
/// `$MACROCOACH_CONFIG` names the file directly. Otherwise it is
/// `macrocoach/config.toml` under `$XDG_CONFIG_HOME`, or under `~/.config`
/// when that is unset, on every platform.
pub fn config_path() -> PathBuf {
    if let Some(path) = env_path("MACROCOACH_CONFIG") {
        return path;
    }
    env_path("XDG_CONFIG_HOME")
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("macrocoach")
        .join("config.toml")
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load the config file at `path`. A missing file is `None`; a file that
/// does not parse, or names a provider macrocoach does not know, is an
/// error.
pub fn load_config(path: &Path) -> Result<Option<ConfigFile>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read config file {}", path.display()));
        }
    };
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config
        .provider
        .kind
        .trim()
        .parse::<ProviderId>()
        .with_context(|| format!("config file {} has an unknown provider kind", path.display()))?;
    Ok(Some(config))
}

/// Write `config` to `path`. The file stores API keys, so on Unix it is
/// created owner-only and an existing file is narrowed to 0600.
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("failed to open config file {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write config file {}", path.display()))
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub provider: Option<ProviderId>,
    pub model: Option<String>,
}

/// Resolve the provider configuration: CLI flag > env var > config file >
/// default. A missing config file is not an error.
pub fn resolve(cli: &CliOverrides) -> Result<ProviderConfig> {
    let file = load_config(&config_path())?;
    resolve_with(cli, file.as_ref(), |var| std::env::var(var).ok())
}

pub fn resolve_with(
    cli: &CliOverrides,
    file: Option<&ConfigFile>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ProviderConfig> {
    let env = |var: &str| env(var).filter(|v| !v.trim().is_empty());

    let provider = cli
        .provider
        .map(|p| p.to_string())
        .or_else(|| env("MACROCOACH_PROVIDER"))
        .or_else(|| file.map(|f| f.provider.kind.clone()))
        .unwrap_or_else(|| ProviderConfig::DEFAULT_PROVIDER.to_string());
    let provider = provider.trim().to_string();

    let lookup = |var: &str| match var {
        "MACROCOACH_PROVIDER" => Some(provider.clone()),
        "MACROCOACH_MODEL" if cli.model.is_some() => cli.model.clone(),
        _ => env(var).or_else(|| file.and_then(|f| f.value(var, &provider))),
    };
    ProviderConfig::from_lookup(lookup).context("invalid provider configuration")
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
