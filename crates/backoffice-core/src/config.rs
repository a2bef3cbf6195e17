//! Back-office configuration.
//!
//! Provides configuration file support via `backoffice.toml`, environment
//! variables, and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (command-line flags)
//! 2. Environment variables (`BACKOFFICE_*`, sections split on `__`)
//! 3. Configuration file (`backoffice.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Record store server section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Maximum HTTP body size in bytes.
    pub max_body_size: usize,
    /// Enable permissive CORS (the dashboard runs on another origin).
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            max_body_size: 10 * 1024 * 1024,
            cors_enabled: true,
        }
    }
}

/// Record store data section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON document holding every collection.
    pub db_path: String,
    /// Write the document back after each mutation.
    pub persist: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "db.json".to_string(),
            persist: true,
        }
    }
}

/// Resource client section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the record store.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
        }
    }
}

/// Grid defaults section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Page sizes a user may pick from.
    pub page_size_options: Vec<usize>,
    /// Initial page size (`None` = first option).
    pub initial_page_size: Option<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size_options: vec![10, 25, 50, 100],
            initial_page_size: None,
        }
    }
}

impl GridConfig {
    /// Page size a new grid starts with.
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        self.initial_page_size
            .or_else(|| self.page_size_options.first().copied())
            .unwrap_or(10)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Main back-office configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BackofficeConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Record store configuration.
    pub store: StoreConfig,
    /// Resource client configuration.
    pub client: ClientConfig,
    /// Grid defaults.
    pub grid: GridConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl BackofficeConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("backoffice.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("BACKOFFICE_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.port".to_string(),
                message: "value 0 is not a usable port".to_string(),
            });
        }

        if self.store.db_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.db_path".to_string(),
                message: "path must not be empty".to_string(),
            });
        }

        let url = &self.client.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "client.base_url".to_string(),
                message: format!("'{url}' must start with http:// or https://"),
            });
        }

        if self.client.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "client.timeout_ms".to_string(),
                message: "value must be > 0".to_string(),
            });
        }

        let options = &self.grid.page_size_options;
        if options.is_empty() || options.contains(&0) {
            return Err(ConfigError::InvalidValue {
                key: "grid.page_size_options".to_string(),
                message: format!("{options:?} must be non-empty and contain no zero"),
            });
        }

        if let Some(initial) = self.grid.initial_page_size {
            if !options.contains(&initial) {
                return Err(ConfigError::InvalidValue {
                    key: "grid.initial_page_size".to_string(),
                    message: format!("value {initial} is not one of {options:?}"),
                });
            }
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
