use crate::config::types::{Config, FetchConfig, OutputConfig};
use crate::ConfigError;

/// Upper bound on the pool width
const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates fetch pool configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.snippet_chars < 1 {
        return Err(ConfigError::Validation(format!(
            "snippet-chars must be >= 1, got {}",
            config.snippet_chars
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.max_row_group_size < 1 {
        return Err(ConfigError::Validation(format!(
            "max-row-group-size must be >= 1, got {}",
            config.max_row_group_size
        )));
    }

    Ok(())
}
