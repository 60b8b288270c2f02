use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, ScrapeParameters};
use crate::ConfigError;

const MAX_PAGES: usize = 500;
const MAX_SEARCH_RESULTS: usize = 200;
const MAX_CONCURRENCY: usize = 16;

/// Validates the entire configuration file
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the parameters of one session before any network activity
pub fn validate_parameters(params: &ScrapeParameters) -> Result<(), ConfigError> {
    if params.url.trim().is_empty() {
        return Err(ConfigError::InvalidUrl("url is required".to_string()));
    }

    check_range("max_pages", params.max_pages, 1, MAX_PAGES)?;
    check_range(
        "max_search_results",
        params.max_search_results,
        1,
        MAX_SEARCH_RESULTS,
    )?;
    check_range("concurrency", params.concurrency, 1, MAX_CONCURRENCY)?;
    check_positive("timeout", params.timeout)?;
    check_non_negative("pause", params.pause)?;
    if let Some(session_timeout) = params.session_timeout {
        check_positive("session_timeout", session_timeout)?;
    }
    check_user_agent(&params.user_agent)?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    check_range("max-pages", config.max_pages, 1, MAX_PAGES)?;
    check_range(
        "max-search-results",
        config.max_search_results,
        1,
        MAX_SEARCH_RESULTS,
    )?;
    check_range("concurrency", config.concurrency, 1, MAX_CONCURRENCY)?;
    if let Some(session_timeout) = config.session_timeout {
        check_positive("session-timeout", session_timeout)?;
    }
    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    check_positive("timeout", config.timeout)?;
    check_non_negative("pause", config.pause)?;
    check_user_agent(&config.user_agent)
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("directory", &config.directory),
        ("text-file", &config.text_file),
        ("document-file", &config.document_file),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }
    Ok(())
}

fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a positive number of seconds, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be >= 0 seconds, got {}",
            name, value
        )));
    }
    Ok(())
}

/// User agent must be a non-empty, valid header value
fn check_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }
    if user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user_agent contains control characters: '{}'",
            user_agent.escape_debug()
        )));
    }
    Ok(())
}
