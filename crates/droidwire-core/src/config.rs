//! Persistent configuration for droidwire.
//!
//! Stores user settings in `~/.droidwire/config.json`: the Appium server URL,
//! the per-command timeout, and capabilities merged into every new session.
//! The environment variables `DROIDWIRE_SERVER_URL` and
//! `DROIDWIRE_COMMAND_TIMEOUT_MS` override the file.
//!
//! # Example
//!
//! ```no_run
//! use droidwire_core::config::DroidwireConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = DroidwireConfig::load();
//! println!("server: {}", config.server_url());
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_SERVER_URL};
use crate::protocol::ParameterMap;

const CONFIG_FILENAME: &str = "config.json";

/// Environment variable overriding the server URL.
pub const SERVER_URL_ENV: &str = "DROIDWIRE_SERVER_URL";

/// Environment variable overriding the command timeout, in milliseconds.
pub const COMMAND_TIMEOUT_ENV: &str = "DROIDWIRE_COMMAND_TIMEOUT_MS";

/// Errors reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Returns the droidwire configuration directory (`~/.droidwire`).
///
/// Falls back to `./.droidwire` when no home directory is known.
pub fn droidwire_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".droidwire")
}

/// Persistent droidwire configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DroidwireConfig {
    /// Appium server base URL, e.g. `http://127.0.0.1:4723/wd/hub`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Per-command HTTP timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout_ms: Option<u64>,

    /// Capabilities merged into every new session.
    #[serde(default, skip_serializing_if = "ParameterMap::is_empty")]
    pub default_capabilities: ParameterMap,
}

impl DroidwireConfig {
    /// Load config from `~/.droidwire/config.json` and apply environment
    /// overrides.
    ///
    /// Returns defaults if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        let config = Self::try_load().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "using default configuration");
            Self::default()
        });
        config.with_overrides(
            std::env::var(SERVER_URL_ENV).ok(),
            std::env::var(COMMAND_TIMEOUT_ENV).ok(),
        )
    }

    /// Load config from `~/.droidwire/config.json` without environment
    /// overrides, reporting I/O and parse errors. A missing file yields the
    /// defaults.
    pub fn try_load() -> Result<Self, ConfigError> {
        let path = droidwire_dir().join(CONFIG_FILENAME);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    /// Save config to `~/.droidwire/config.json`.
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = droidwire_dir();
        std::fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(CONFIG_FILENAME);
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, json).map_err(|source| ConfigError::Io { path, source })
    }

    /// Applies override values (normally read from the environment).
    ///
    /// Blank URLs and unparsable timeouts are ignored.
    pub fn with_overrides(mut self, server_url: Option<String>, timeout_ms: Option<String>) -> Self {
        if let Some(url) = server_url.filter(|u| !u.trim().is_empty()) {
            self.server_url = Some(url);
        }
        if let Some(ms) = timeout_ms.and_then(|t| t.trim().parse::<u64>().ok()) {
            self.command_timeout_ms = Some(ms);
        }
        self
    }

    /// The effective server URL.
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// The effective per-command timeout.
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT)
    }
}
