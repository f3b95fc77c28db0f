//! Result cache in front of a movie catalog.
//!
//! Search pages are kept for a freshness window so that re-typing a recent
//! query (or reopening the dropdown) does not hit the API again.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use super::{CatalogError, Genre, MovieCatalog, MoviePage};

/// Search cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchCacheConfig {
    /// How long a cached page stays fresh, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of cached pages.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_capacity() -> usize {
    200
}

impl Default for SearchCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            capacity: default_capacity(),
        }
    }
}

struct CachedPage {
    fetched_at: Instant,
    page: MoviePage,
}

/// Catalog decorator caching search pages by `(query, page)`.
///
/// Genre and external-id lookups pass straight through; they have their own
/// caches ([`super::GenreCache`], [`super::DetailLinks`]).
pub struct CachedCatalog {
    inner: Arc<dyn MovieCatalog>,
    ttl: Duration,
    pages: Mutex<LruCache<(String, u32), CachedPage>>,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn MovieCatalog>, config: &SearchCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            ttl: Duration::from_secs(config.ttl_secs),
            pages: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lookup(&self, key: &(String, u32)) -> Option<MoviePage> {
        let mut pages = self.pages.lock().ok()?;
        match pages.get(key) {
            Some(cached) if cached.fetched_at.elapsed() < self.ttl => {
                return Some(cached.page.clone());
            }
            Some(_) => {}
            None => return None,
        }
        // Expired
        pages.pop(key);
        None
    }

    fn store(&self, key: (String, u32), page: &MoviePage) {
        if let Ok(mut pages) = self.pages.lock() {
            pages.put(
                key,
                CachedPage {
                    fetched_at: Instant::now(),
                    page: page.clone(),
                },
            );
        }
    }
}

#[async_trait]
impl MovieCatalog for CachedCatalog {
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        let key = (query.trim().to_string(), page);

        if let Some(cached) = self.lookup(&key) {
            debug!("Search cache hit: query='{}', page={}", key.0, page);
            return Ok(cached);
        }

        let result = self.inner.search_movies(&key.0, page).await?;
        self.store(key, &result);
        Ok(result)
    }

    async fn get_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        self.inner.get_genres().await
    }

    async fn get_external_id(&self, movie_id: u32) -> Result<Option<String>, CatalogError> {
        self.inner.get_external_id(movie_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockCatalog};

    fn cached(mock: &Arc<MockCatalog>, ttl_secs: u64) -> CachedCatalog {
        CachedCatalog::new(
            mock.clone(),
            &SearchCacheConfig {
                ttl_secs,
                capacity: 8,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_search_hits_cache() {
        let mock = Arc::new(MockCatalog::new());
        mock.set_movies(vec![fixtures::movie(1, "Batman", "1989-06-23")]);
        let catalog = cached(&mock, 300);

        let first = catalog.search_movies("bat", 1).await.unwrap();
        let second = catalog.search_movies(" bat ", 1).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.search_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_refetched() {
        let mock = Arc::new(MockCatalog::new());
        mock.set_movies(vec![fixtures::movie(1, "Batman", "1989-06-23")]);
        let catalog = cached(&mock, 300);

        catalog.search_movies("bat", 1).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        catalog.search_movies("bat", 1).await.unwrap();

        assert_eq!(mock.search_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_not_cached() {
        let mock = Arc::new(MockCatalog::new());
        mock.set_next_error(CatalogError::Network("down".to_string()));
        let catalog = cached(&mock, 300);

        assert!(catalog.search_movies("bat", 1).await.is_err());
        assert!(catalog.search_movies("bat", 1).await.is_ok());
        assert_eq!(mock.search_count(), 2);
    }
}
