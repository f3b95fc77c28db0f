//! Movie catalog integration (TMDB).
//!
//! This module provides the client used by the search controller to query
//! movies, the genre list and external (IMDb) identifiers, plus the caching
//! layers that sit in front of it.

mod cache;
mod genres;
mod links;
mod tmdb;
mod types;

pub use cache::{CachedCatalog, SearchCacheConfig};
pub use genres::GenreCache;
pub use links::{
    detail_fallback_url, detail_url, fallback_link_url, DetailLinks, FallbackLink,
    DEFAULT_LINK_CACHE_CAPACITY,
};
pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with the movie catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Credentials were rejected (401).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Credentials lack access to the resource (403).
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The catalog could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status.
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    /// Message shown to the user in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Authentication(_) => "Erro de autenticação: Verifique se as chaves da API estão configuradas corretamente.".to_string(),
            CatalogError::Authorization(_) => {
                "Erro de autorização: Sua chave da API pode estar inválida ou expirada.".to_string()
            }
            CatalogError::Network(_) => {
                "Erro de conexão: Verifique sua conexão com a internet e tente novamente."
                    .to_string()
            }
            CatalogError::NotConfigured(_) => {
                "Chaves da API não configuradas. Verifique o arquivo de configuração.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            CatalogError::Network(e.to_string())
        } else if e.is_decode() {
            CatalogError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            CatalogError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            CatalogError::Network(e.to_string())
        }
    }
}

/// Trait for movie catalog clients.
///
/// Implemented by [`TmdbClient`], by the [`CachedCatalog`] decorator and by
/// the mock used in tests.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Search movies by title, one page at a time (pages start at 1).
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError>;

    /// Full list of movie genres.
    async fn get_genres(&self) -> Result<Vec<Genre>, CatalogError>;

    /// IMDb identifier for a movie, if the catalog knows one.
    async fn get_external_id(&self, movie_id: u32) -> Result<Option<String>, CatalogError>;
}
