//! # Configuration Management
//!
//! Centralized configuration for the ledger binary codec.
//!
//! The codec itself needs very little: which field registry to load, and the
//! limits applied to untrusted input. Logging settings live here too so an
//! embedding application can configure everything from one file.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`
//!
//! ## Example
//! ```toml
//! [registry]
//! definitions_path = "/etc/ledger/definitions.json"
//!
//! [limits]
//! max_nesting_depth = 64
//! max_input_size = 16777216
//!
//! [logging]
//! app_name = "ledger-binary-codec"
//! log_level = "info"
//! json_format = false
//! log_to_file = true
//! log_file_path = "/var/log/ledger-codec.log"
//! ```

use crate::core::DEFAULT_MAX_NESTING_DEPTH;
use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Default cap on the size of a buffer handed to `decode` (16 MiB)
pub const MAX_INPUT_SIZE: usize = 16 * 1024 * 1024;

/// Hard ceiling for `max_nesting_depth`
pub const MAX_NESTING_DEPTH_LIMIT: usize = 1024;

pub const ENV_DEFINITIONS_PATH: &str = "LEDGER_CODEC_DEFINITIONS_PATH";
pub const ENV_MAX_NESTING_DEPTH: &str = "LEDGER_CODEC_MAX_NESTING_DEPTH";
pub const ENV_MAX_INPUT_SIZE: &str = "LEDGER_CODEC_MAX_INPUT_SIZE";
pub const ENV_LOG_LEVEL: &str = "LEDGER_CODEC_LOG_LEVEL";

/// Main codec configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CodecConfig {
    /// Field registry source
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Limits on decoded input
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CodecError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Defaults overridden by `LEDGER_CODEC_*` environment variables.
    ///
    /// Unparseable numeric values are an error rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var(ENV_DEFINITIONS_PATH) {
            config.registry.definitions_path = Some(PathBuf::from(path));
        }

        if let Ok(depth) = std::env::var(ENV_MAX_NESTING_DEPTH) {
            config.limits.max_nesting_depth = depth.parse::<usize>().map_err(|e| {
                CodecError::ConfigError(format!("{ENV_MAX_NESTING_DEPTH}={depth}: {e}"))
            })?;
        }

        if let Ok(size) = std::env::var(ENV_MAX_INPUT_SIZE) {
            config.limits.max_input_size = size.parse::<usize>().map_err(|e| {
                CodecError::ConfigError(format!("{ENV_MAX_INPUT_SIZE}={size}: {e}"))
            })?;
        }

        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.logging.log_level = level.parse::<Level>().map_err(|_| {
                CodecError::ConfigError(format!("{ENV_LOG_LEVEL}: invalid log level {level}"))
            })?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodecError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.registry.validate());
        errors.extend(self.limits.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CodecError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Where the field registry comes from
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct RegistryConfig {
    /// JSON schema file. The bundled schema is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions_path: Option<PathBuf>,
}

impl RegistryConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(path) = &self.definitions_path {
            if path.as_os_str().is_empty() {
                errors.push("Definitions path cannot be empty".to_string());
            } else if !path.is_file() {
                errors.push(format!("Definitions file does not exist: {}", path.display()));
            }
        }

        errors
    }
}

/// Limits applied while decoding untrusted bytes
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LimitsConfig {
    /// Maximum depth of nested objects and arrays
    pub max_nesting_depth: usize,

    /// Maximum size of a buffer accepted by `decode`
    pub max_input_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_input_size: MAX_INPUT_SIZE,
        }
    }
}

impl LimitsConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_nesting_depth == 0 {
            errors.push("Max nesting depth must be greater than 0".to_string());
        } else if self.max_nesting_depth > MAX_NESTING_DEPTH_LIMIT {
            errors.push(format!(
                "Max nesting depth too large: {} (maximum: {MAX_NESTING_DEPTH_LIMIT})",
                self.max_nesting_depth
            ));
        }

        if self.max_input_size == 0 {
            errors.push("Max input size cannot be 0".to_string());
        } else if self.max_input_size > 1024 * 1024 * 1024 {
            errors.push(format!(
                "Max input size too large: {} bytes (maximum recommended: 1 GB)",
                self.max_input_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,

    /// Write logs to `log_file_path` instead of stdout
    #[serde(default)]
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("ledger-binary-codec"),
            log_level: Level::INFO,
            json_format: false,
            log_to_file: false,
            log_file_path: None,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            match &self.log_file_path {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        if !parent.as_os_str().is_empty() && !parent.exists() {
                            errors.push(format!(
                                "Log file directory does not exist: {}",
                                parent.display()
                            ));
                        }
                    }
                }
                None => errors
                    .push("log_file_path must be specified when log_to_file is true".to_string()),
            }
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
