//! Extension configuration types

use crate::{ExtensionError, ExtensionResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration passed by the host when an extension object is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Extension-specific configuration data
    #[serde(default)]
    pub data: serde_json::Value,

    /// Number of async worker threads (default: number of CPU cores)
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Shutdown timeout in milliseconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_ms: u64,

    /// Connection recovery tuning
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shutdown_timeout() -> u64 {
    5000
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            data: serde_json::Value::Null,
            worker_threads: None,
            log_level: default_log_level(),
            shutdown_timeout_ms: default_shutdown_timeout(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl ExtensionConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    ///
    /// Empty input yields the defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Get a typed value from the configuration data
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Shutdown timeout as a `Duration`
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Validate the nested sections
    pub fn validate(&self) -> ExtensionResult<()> {
        self.recovery.validate()
    }
}

/// Backoff settings for re-establishing a dropped service connection
///
/// The first retry waits `initial_retry_secs`; each failed check doubles the
/// wait until it reaches `max_retry_secs`, where it stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// First backoff interval in seconds
    #[serde(default = "default_initial_retry")]
    pub initial_retry_secs: u64,

    /// Upper bound for the backoff interval in seconds (10 hours by default)
    #[serde(default = "default_max_retry")]
    pub max_retry_secs: u64,
}

fn default_initial_retry() -> u64 {
    2
}

fn default_max_retry() -> u64 {
    36_000
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            initial_retry_secs: default_initial_retry(),
            max_retry_secs: default_max_retry(),
        }
    }
}

impl RecoveryConfig {
    /// Create a recovery configuration with explicit bounds
    pub fn new(initial_retry_secs: u64, max_retry_secs: u64) -> Self {
        Self {
            initial_retry_secs,
            max_retry_secs,
        }
    }

    /// First backoff interval
    pub fn initial_interval(&self) -> Duration {
        Duration::from_secs(self.initial_retry_secs)
    }

    /// Maximum backoff interval
    pub fn max_interval(&self) -> Duration {
        Duration::from_secs(self.max_retry_secs)
    }

    /// Reject settings that would hot-loop or never grow
    pub fn validate(&self) -> ExtensionResult<()> {
        if self.initial_retry_secs == 0 {
            return Err(ExtensionError::ConfigError(
                "recovery.initial_retry_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_retry_secs < self.initial_retry_secs {
            return Err(ExtensionError::ConfigError(format!(
                "recovery.max_retry_secs ({}) is below initial_retry_secs ({})",
                self.max_retry_secs, self.initial_retry_secs
            )));
        }
        Ok(())
    }
}

/// Descriptive metadata an extension may report about itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    /// Class name the host instantiates (e.g. `"Push"`)
    pub name: String,

    /// Extension version (semver)
    pub version: String,

    /// Extension description
    #[serde(default)]
    pub description: Option<String>,
}

impl ExtensionMetadata {
    /// Create new extension metadata
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
