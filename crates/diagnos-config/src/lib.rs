//! Configuration system for the diagnos planner.
//!
//! Load planner configuration from TOML or YAML to control search depth,
//! revisits and abort limits without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use diagnos_config::PlannerConfig;
//! use std::time::Duration;
//!
//! let config = PlannerConfig::from_toml_str(r#"
//!     [search]
//!     max_depth = 8
//!
//!     [abort]
//!     step_limit = 5000
//!     millis_spent_limit = 250
//! "#).unwrap();
//!
//! assert_eq!(config.search.max_depth, Some(8));
//! assert_eq!(config.abort.step_limit(), 5000);
//! assert_eq!(config.abort.time_limit(), Some(Duration::from_millis(250)));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use diagnos_config::PlannerConfig;
//!
//! let config = PlannerConfig::load("planner.toml").unwrap_or_default();
//! assert!(!config.manual_mode);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of search steps before the planner aborts.
pub const DEFAULT_STEP_LIMIT: u64 = 100_000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PlannerConfig {
    /// Disables automatic planning; paths are only set through manual
    /// targeting.
    #[serde(default)]
    pub manual_mode: bool,

    /// Search configuration.
    #[serde(default)]
    pub search: SearchConfig,

    /// Abort configuration.
    #[serde(default)]
    pub abort: AbortConfig,
}

impl PlannerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or
    /// invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_depth == Some(0) {
            return Err(ConfigError::Invalid(
                "search.max_depth must be at least 1".to_string(),
            ));
        }
        if self.abort.step_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "abort.step_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_manual_mode(mut self, manual_mode: bool) -> Self {
        self.manual_mode = manual_mode;
        self
    }

    pub fn with_allow_revisits(mut self, allow_revisits: bool) -> Self {
        self.search.allow_revisits = allow_revisits;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.search.max_depth = Some(max_depth);
        self
    }

    /// Sets the number of search steps before aborting.
    pub fn with_step_limit(mut self, steps: u64) -> Self {
        self.abort.step_limit = Some(steps);
        self
    }

    /// Sets the wall-clock limit of one search.
    pub fn with_time_limit_millis(mut self, millis: u64) -> Self {
        self.abort.millis_spent_limit = Some(millis);
        self
    }
}

/// Search configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// Whether a QContainer may appear more than once in one path.
    #[serde(default)]
    pub allow_revisits: bool,

    /// Hard cap on the iterative deepening depth.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// Abort configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AbortConfig {
    /// Search-tree nodes visited before aborting.
    pub step_limit: Option<u64>,

    /// Maximum milliseconds per search.
    pub millis_spent_limit: Option<u64>,

    /// Maximum seconds per search.
    pub seconds_spent_limit: Option<u64>,
}

impl AbortConfig {
    /// Configured step limit or [`DEFAULT_STEP_LIMIT`].
    pub fn step_limit(&self) -> u64 {
        self.step_limit.unwrap_or(DEFAULT_STEP_LIMIT)
    }

    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let millis = self.millis_spent_limit.unwrap_or(0)
            + self.seconds_spent_limit.unwrap_or(0) * 1000;
        if millis > 0 {
            Some(Duration::from_millis(millis))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests;
