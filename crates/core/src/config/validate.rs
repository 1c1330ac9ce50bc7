use super::{types::Config, ConfigError, MAX_LISTING_PAGES};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Provider concurrency is at least 1
/// - Ingestion page cap is within what the API serves
/// - Cache TTL is positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.providers.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "providers.concurrency must be at least 1".to_string(),
        ));
    }

    if config.ingest.max_pages == 0 || config.ingest.max_pages > MAX_LISTING_PAGES {
        return Err(ConfigError::ValidationError(format!(
            "ingest.max_pages must be between 1 and {}",
            MAX_LISTING_PAGES
        )));
    }

    if config.cache.ttl_days == 0 {
        return Err(ConfigError::ValidationError(
            "cache.ttl_days must be positive".to_string(),
        ));
    }

    Ok(())
}
