use crate::config::types::{Config, CrawlConfig, RelayConfig, ScoringConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_relay_config(&config.relay)?;
    validate_crawl_config(&config.crawl)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_scoring_config(&config.scoring)?;
    Ok(())
}

/// Checks that a relay endpoint is configured and usable
///
/// Site mode calls this before any network activity; the loader only checks
/// the endpoint when one is present.
pub fn require_relay_endpoint(config: &RelayConfig) -> Result<Url, ConfigError> {
    let endpoint = config
        .endpoint
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ConfigError::Validation("relay endpoint is not configured".to_string()))?;

    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid relay endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Relay endpoint '{}' must use http or https",
            endpoint
        )));
    }

    Ok(url)
}

/// Validates relay configuration
fn validate_relay_config(config: &RelayConfig) -> Result<(), ConfigError> {
    if config.query_param.trim().is_empty() {
        return Err(ConfigError::Validation(
            "relay query-param cannot be empty".to_string(),
        ));
    }

    if config.endpoint.is_some() {
        require_relay_endpoint(config)?;
    }

    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > 50 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and 50, got {}",
            config.max_pages
        )));
    }

    if config.page_timeout_ms < 1_000 {
        return Err(ConfigError::Validation(format!(
            "page-timeout-ms must be >= 1000ms, got {}ms",
            config.page_timeout_ms
        )));
    }

    if config.inter_page_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "inter-page-delay-ms must be >= 100ms, got {}ms",
            config.inter_page_delay_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates suggestion thresholds
fn validate_scoring_config(config: &ScoringConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("auto-format-threshold", config.auto_format_threshold),
        ("auto-quality-threshold", config.auto_quality_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be within [0, 1], got {}",
                name, value
            )));
        }
    }
    Ok(())
}
