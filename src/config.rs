//! Configuration management for scrollback
//!
//! This module handles loading, validating, and saving the JSON
//! configuration used by the `scrollback` binary: where the history lives,
//! how large it may grow, and how search results are presented.

use crate::codec::DEFAULT_MAX_LINE_LENGTH;
use crate::error::{Error, Result};
use crate::history::HISTORY_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".scrollback.json";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the history file
    pub history_file: PathBuf,

    /// Maximum number of history entries to keep
    pub capacity: usize,

    /// Longest line accepted when restoring history, in bytes
    pub max_line_length: usize,

    /// Search configuration
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Configuration for search output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Whether to highlight matches in search results
    pub highlight_matches: bool,

    /// Maximum number of search results to print
    pub max_results: usize,

    /// Whether to list the most recent matches first
    pub newest_first: bool,
}

/// Configuration for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: crate::default_history_path()
                .unwrap_or_else(|_| PathBuf::from("/tmp").join(crate::DEFAULT_HISTORY_FILE)),
            capacity: HISTORY_LIMIT,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            highlight_matches: true,
            max_results: 100,
            newest_first: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = home::home_dir().ok_or(Error::HomeDirectoryNotFound)?;
        Ok(home.join(DEFAULT_CONFIG_FILE))
    }

    /// Path of the SQLite database used by the database backend
    pub fn database_path(&self) -> PathBuf {
        self.history_file.with_extension("db")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::config_validation(
                "capacity",
                "must be greater than 0",
            ));
        }

        if self.max_line_length == 0 {
            return Err(Error::config_validation(
                "max_line_length",
                "must be greater than 0",
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::config_validation(
                    "logging.level",
                    "must be one of: trace, debug, info, warn, error",
                ));
            }
        }

        if self.search.max_results == 0 {
            return Err(Error::config_validation(
                "search.max_results",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Merge with another configuration, taking values from the other config
    pub fn merge(&mut self, other: &Config) {
        self.history_file = other.history_file.clone();
        self.capacity = other.capacity;
        self.max_line_length = other.max_line_length;
        self.search = other.search.clone();
        self.logging = other.logging.clone();
    }
}
