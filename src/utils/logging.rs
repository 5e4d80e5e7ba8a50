//! Structured logging setup.
//!
//! The codec only emits `tracing` events; installing a subscriber is left to
//! the application. `init_logging` is a convenience for binaries, demos and
//! benches that have nothing better.

use crate::config::LoggingConfig;
use crate::error::{CodecError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber configured from `config`.
///
/// `RUST_LOG` takes precedence over the configured level when set. Output goes
/// to stdout, or is appended to `log_file_path` when `log_to_file` is set.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));

    let writer = match (config.log_to_file, &config.log_file_path) {
        (true, Some(path)) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    CodecError::ConfigError(format!(
                        "Failed to open log file {}: {e}",
                        path.display()
                    ))
                })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        (true, None) => {
            return Err(CodecError::ConfigError(
                "log_file_path must be specified when log_to_file is true".to_string(),
            ))
        }
        (false, _) => BoxMakeWriter::new(std::io::stdout),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(!config.log_to_file)
        .with_writer(writer);
    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| CodecError::ConfigError(format!("Failed to install logger: {e}")))?;

    info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_without_path_is_rejected() {
        let config = LoggingConfig {
            log_to_file: true,
            ..LoggingConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(CodecError::ConfigError(_))));
    }
}
