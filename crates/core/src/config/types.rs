use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::{SearchCacheConfig, TmdbConfig, DEFAULT_LINK_CACHE_CAPACITY};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub favorites: FavoritesConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Quiet period before a typed query is searched, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// How long a fetched result page stays fresh, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Maximum number of cached result pages.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache(&self) -> SearchCacheConfig {
        SearchCacheConfig {
            ttl_secs: self.cache_ttl_secs,
            capacity: self.cache_capacity,
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_capacity() -> usize {
    200
}

/// Favorites persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FavoritesConfig {
    /// SQLite database holding the favorites.
    #[serde(default = "default_favorites_path")]
    pub path: PathBuf,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            path: default_favorites_path(),
        }
    }
}

fn default_favorites_path() -> PathBuf {
    PathBuf::from("moviefinder.db")
}

/// External detail links
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinksConfig {
    /// Resolved IMDb URLs kept in memory.
    #[serde(default = "default_link_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_link_cache_capacity(),
        }
    }
}

fn default_link_cache_capacity() -> usize {
    DEFAULT_LINK_CACHE_CAPACITY
}

/// Logging output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log file; the terminal belongs to the UI.
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
    /// Filter directive used when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_path() -> PathBuf {
    PathBuf::from("moviefinder.log")
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub tmdb: SanitizedTmdbConfig,
    pub search: SearchConfig,
    pub favorites: FavoritesConfig,
    pub links: LinksConfig,
    pub logging: LoggingConfig,
}

/// Sanitized TMDB config (credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    pub base_url: String,
    pub language: String,
    pub region: String,
    pub timeout_secs: u64,
    pub api_key_configured: bool,
    pub api_token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            tmdb: SanitizedTmdbConfig {
                base_url: config.tmdb.base_url.clone(),
                language: config.tmdb.language.clone(),
                region: config.tmdb.region.clone(),
                timeout_secs: config.tmdb.timeout_secs,
                api_key_configured: !config.tmdb.api_key.trim().is_empty(),
                api_token_configured: !config.tmdb.api_token.trim().is_empty(),
            },
            search: config.search.clone(),
            favorites: config.favorites.clone(),
            links: config.links.clone(),
            logging: config.logging.clone(),
        }
    }
}
