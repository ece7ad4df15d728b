//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogFormat, LogOutput, LoggingConfig, StrataConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &StrataConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        return Err(ConfigError::validation(
            "JSON log format requires the `json-log` feature",
        ));
    }

    if let Some(target) = logging.filters.keys().find(|t| t.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Log filter target cannot be empty: {target:?}"
        )));
    }

    Ok(())
}
