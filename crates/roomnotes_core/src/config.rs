//! Runtime configuration for hosts embedding the notes core.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//! - Validate settings up front so failures surface before any I/O.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - `log_level` is always one of `trace|debug|info|warn|error`.
//! - `log_dir`, when set, is absolute.

use crate::logging::{default_log_level, init_logging, normalize_level, normalize_log_dir};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "ROOMNOTES_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "ROOMNOTES_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "ROOMNOTES_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "roomnotes.sqlite3";

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidLogDir(String),
    /// Logging backend refused to start or was already configured differently.
    Logging(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::InvalidLogDir(message) => write!(f, "{message}"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Normalized log level.
    pub log_level: String,
    /// Rolling log directory; file logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Resolves settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            config = config.with_log_level(&level)?;
        }
        if let Some(dir) = non_blank(LOG_DIR_ENV) {
            config = config.with_log_dir(&dir)?;
        }
        Ok(config)
    }

    /// Replaces the log level after validating it.
    pub fn with_log_level(mut self, level: &str) -> Result<Self, ConfigError> {
        self.log_level = normalize_level(level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();
        Ok(self)
    }

    /// Replaces the log directory after validating it.
    pub fn with_log_dir(mut self, log_dir: &str) -> Result<Self, ConfigError> {
        self.log_dir = Some(normalize_log_dir(log_dir).map_err(ConfigError::InvalidLogDir)?);
        Ok(self)
    }

    /// Starts file logging when a directory is configured.
    ///
    /// Returns whether logging is active after the call.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(log_dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| ConfigError::InvalidLogDir("log_dir must be valid UTF-8".to_string()))?;
        init_logging(&self.log_level, log_dir).map_err(ConfigError::Logging)?;
        Ok(true)
    }
}
