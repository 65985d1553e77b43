use crate::config::types::{Config, CrawlerConfig, FetchConfig, PriorityEntry, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for the worker pool
pub const MAX_WORKERS: u32 = 256;

/// Upper bound for the politeness delay, in seconds
pub const MAX_DELAY_SECONDS: f64 = 3600.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_priority_entries(&config.priority)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = config
        .seed_url
        .as_deref()
        .ok_or_else(|| ConfigError::Validation("seed-url is required".to_string()))?;
    validate_seed_url(seed)?;

    if config.max_workers < 1 || config.max_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.max_workers
        )));
    }

    if !(0.0..=MAX_DELAY_SECONDS).contains(&config.delay_seconds) {
        return Err(ConfigError::Validation(format!(
            "delay-seconds must be between 0 and {}, got {}",
            MAX_DELAY_SECONDS, config.delay_seconds
        )));
    }

    for pattern in &config.exclude_patterns {
        if pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Exclusion pattern cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the seed URL: must parse, be http(s) and carry a host
fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_seconds == 0 {
        return Err(ConfigError::Validation(
            "timeout-seconds must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_seconds == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-seconds must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates priority table entries
fn validate_priority_entries(entries: &[PriorityEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Priority pattern cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ConfigError::Validation(format!("Invalid email format: '{}'", email)))?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
