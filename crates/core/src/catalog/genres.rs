//! Session-lifetime cache for the genre list.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{CatalogError, GenreCatalog, MovieCatalog};

/// Freshness window of the genre list.
const GENRE_TTL: Duration = Duration::from_secs(60 * 60);

/// Fetches the genre list once and serves it until it goes stale.
pub struct GenreCache {
    catalog: Arc<dyn MovieCatalog>,
    ttl: Duration,
    cached: Mutex<Option<(Instant, GenreCatalog)>>,
}

impl GenreCache {
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self::with_ttl(catalog, GENRE_TTL)
    }

    pub fn with_ttl(catalog: Arc<dyn MovieCatalog>, ttl: Duration) -> Self {
        Self {
            catalog,
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Current genre catalog, fetching it if missing or stale.
    ///
    /// Concurrent callers wait on the same fetch instead of issuing their own.
    pub async fn get(&self) -> Result<GenreCatalog, CatalogError> {
        let mut cached = self.cached.lock().await;

        if let Some((fetched_at, genres)) = cached.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                return Ok(genres.clone());
            }
        }

        debug!("Fetching genre list");
        let genres = GenreCatalog::new(self.catalog.get_genres().await?);
        *cached = Some((Instant::now(), genres.clone()));
        Ok(genres)
    }
}
