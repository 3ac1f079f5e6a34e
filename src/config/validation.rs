use crate::config::types::{Config, CrawlerConfig, HubConfig, OutputConfig, RetryConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_retry_config(&config.retry)?;
    validate_crawler_config(&config.crawler)?;
    validate_hub_config(&config.hub)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.min_wait_ms > config.max_wait_ms {
        return Err(ConfigError::Validation(format!(
            "min_wait_ms ({}) must not exceed max_wait_ms ({})",
            config.min_wait_ms, config.max_wait_ms
        )));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_sources < 1 || config.max_concurrent_sources > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_sources must be between 1 and 64, got {}",
            config.max_concurrent_sources
        )));
    }

    if config.page_size < 1 || config.page_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 1000, got {}",
            config.page_size
        )));
    }

    Ok(())
}

fn validate_hub_config(config: &HubConfig) -> Result<(), ConfigError> {
    if let Some(endpoint) = &config.endpoint {
        validate_endpoint(endpoint)?;
    }

    if matches!(&config.token, Some(token) if token.trim().is_empty()) {
        return Err(ConfigError::Validation("token cannot be empty".to_string()));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates an API endpoint override
pub(crate) fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint '{}' must use http or https",
            endpoint
        )));
    }

    Ok(())
}
