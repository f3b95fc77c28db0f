use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - A TMDB credential (API key or read token) is present
/// - TMDB base URL is set
/// - Cache capacities are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !config.tmdb.has_credentials() {
        return Err(ConfigError::ValidationError(
            "tmdb.api_key or tmdb.api_token must be set".to_string(),
        ));
    }

    if config.tmdb.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tmdb.base_url cannot be empty".to_string(),
        ));
    }

    if config.search.cache_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "search.cache_capacity cannot be 0".to_string(),
        ));
    }

    if config.links.cache_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "links.cache_capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.tmdb.api_key = "abc123".to_string();
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());

        let mut token_only = Config::default();
        token_only.tmdb.api_token = "eyJhbGciOi".to_string();
        assert!(validate_config(&token_only).is_ok());
    }

    #[test]
    fn test_validate_missing_credentials_fails() {
        let mut config = valid_config();
        config.tmdb.api_key = "   ".to_string();

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_capacity_fails() {
        let mut config = valid_config();
        config.links.cache_capacity = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.search.cache_capacity = 0;
        assert!(validate_config(&config).is_err());
    }
}
