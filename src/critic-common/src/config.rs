//! Configuration loading.
//!
//! The config file is TOML. Precedence, lowest to highest:
//! built-in defaults, `config.toml`, environment (`CRITIC_ENDPOINT`),
//! command-line flags (applied by the CLI).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable for a custom config file path.
pub const CRITIC_CONFIG_ENV: &str = "CRITIC_CONFIG";

/// Environment variable overriding the review endpoint.
pub const CRITIC_ENDPOINT_ENV: &str = "CRITIC_ENDPOINT";

/// Review endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/upload";

/// How long a toast stays on screen.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3500;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Color theme of the interface. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Cyan,
    Purple,
}

impl ThemeName {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            ThemeName::Cyan => ThemeName::Purple,
            ThemeName::Purple => ThemeName::Cyan,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Cyan => "cyan",
            ThemeName::Purple => "purple",
        }
    }
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cyan" => Ok(ThemeName::Cyan),
            "purple" => Ok(ThemeName::Purple),
            other => Err(format!("unknown theme '{other}' (expected cyan or purple)")),
        }
    }
}

/// Section splitting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    /// Ignore heading markers inside fenced code blocks.
    pub fence_aware: bool,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self { fence_aware: true }
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticConfig {
    /// Full URL of the review upload endpoint.
    pub endpoint: String,
    /// Theme shown at startup.
    pub theme: ThemeName,
    /// Toast lifetime in milliseconds.
    pub toast_duration_ms: u64,
    /// Overall request timeout; absent means wait indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// Mask obvious credentials before uploading.
    pub redact_secrets: bool,
    pub sections: SectionsConfig,
}

impl Default for CriticConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            theme: ThemeName::default(),
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            request_timeout_secs: None,
            redact_secrets: false,
            sections: SectionsConfig::default(),
        }
    }
}

impl CriticConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment overrides in place.
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var(CRITIC_ENDPOINT_ENV)
            && !endpoint.trim().is_empty()
        {
            debug!(endpoint = %endpoint, "Using CRITIC_ENDPOINT");
            self.endpoint = endpoint.trim().to_string();
        }
    }
}

/// Get the config file path, checking `CRITIC_CONFIG` first.
pub fn get_config_path(home: &Path) -> PathBuf {
    if let Ok(val) = std::env::var(CRITIC_CONFIG_ENV)
        && !val.is_empty()
    {
        let path = PathBuf::from(&val);
        debug!(path = %path.display(), "Using CRITIC_CONFIG");
        return path;
    }

    home.join(CONFIG_FILE)
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Environment overrides are applied on top.
pub fn load_config(path: &Path) -> Result<CriticConfig, ConfigError> {
    let mut config = if path.exists() {
        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        CriticConfig::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        debug!(path = %path.display(), "Config file not found, using defaults");
        CriticConfig::default()
    };

    config.apply_env();
    Ok(config)
}
