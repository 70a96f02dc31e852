//! Core runtime configuration.
//!
//! # Responsibility
//! - Parse the JSON configuration handed over by the UI shell.
//! - Fill defaults and reject values the core cannot honor.
//!
//! # Invariants
//! - A `CoreConfig` returned by `from_json_str` has passed `validate()`.

use crate::i18n::{normalize_locale, DEFAULT_LOCALE};
use crate::logging::parse_level;
use crate::storage::DEFAULT_SESSION_QUOTA_BYTES;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Locale used before the user picks one and as translation fallback.
    pub default_locale: String,
    /// Backend root, e.g. `https://shop.example.com/api`. `None` leaves the
    /// registry without an API client; session checks then settle offline.
    pub api_base_url: Option<String>,
    /// Absolute SQLite path for long-lived preferences. `None` keeps them in
    /// memory for the process lifetime.
    pub persistent_db_path: Option<PathBuf>,
    /// Byte budget of the session-scoped store.
    pub session_quota_bytes: usize,
    /// Absolute directory for rolling log files. `None` leaves logging to an
    /// explicit `init_logging` call.
    pub log_dir: Option<PathBuf>,
    /// `trace|debug|info|warn|error`; `None` picks the build-mode default.
    pub log_level: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            api_base_url: None,
            persistent_db_path: None,
            session_quota_bytes: DEFAULT_SESSION_QUOTA_BYTES,
            log_dir: None,
            log_level: None,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let mut config: CoreConfig =
            serde_json::from_str(document).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.default_locale = normalize_locale(&config.default_locale);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_locale.is_empty()
            || !self.default_locale.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ConfigError::InvalidLocale(self.default_locale.clone()));
        }
        if let Some(url) = &self.api_base_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidApiBaseUrl(url.clone()));
            }
        }
        if let Some(path) = &self.persistent_db_path {
            if !path.is_absolute() {
                return Err(ConfigError::RelativeDbPath(path.clone()));
            }
        }
        if self.session_quota_bytes == 0 {
            return Err(ConfigError::ZeroSessionQuota);
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        if let Some(level) = &self.log_level {
            if parse_level(level).is_none() {
                return Err(ConfigError::InvalidLogLevel(level.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    InvalidLocale(String),
    InvalidApiBaseUrl(String),
    RelativeDbPath(PathBuf),
    ZeroSessionQuota,
    RelativeLogDir(PathBuf),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid config JSON: {message}"),
            Self::InvalidLocale(value) => write!(f, "invalid default_locale `{value}`"),
            Self::InvalidApiBaseUrl(value) => {
                write!(f, "api_base_url must start with http:// or https://, got `{value}`")
            }
            Self::RelativeDbPath(path) => write!(
                f,
                "persistent_db_path must be absolute, got `{}`",
                path.display()
            ),
            Self::ZeroSessionQuota => write!(f, "session_quota_bytes must be positive"),
            Self::RelativeLogDir(path) => {
                write!(f, "log_dir must be absolute, got `{}`", path.display())
            }
            Self::InvalidLogLevel(value) => write!(
                f,
                "log_level must be one of trace|debug|info|warn|error, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}
