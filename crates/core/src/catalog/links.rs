//! External links: IMDb detail pages and the "no results" search links.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::{debug, warn};

use super::{Movie, MovieCatalog};

/// Default number of resolved detail URLs kept in memory.
pub const DEFAULT_LINK_CACHE_CAPACITY: usize = 1000;

/// IMDb title page for a known IMDb ID.
pub fn detail_url(imdb_id: &str) -> String {
    format!("https://www.imdb.com/title/{}/", imdb_id)
}

/// IMDb title search used when a movie has no IMDb ID.
pub fn detail_fallback_url(title: &str, year: Option<i32>) -> String {
    let query = match year {
        Some(y) => format!("{} {}", title, y),
        None => title.to_string(),
    };
    format!(
        "https://www.imdb.com/find?q={}&s=tt&ttype=ft",
        urlencoding::encode(&query)
    )
}

/// Synthetic result items offered when a search returns nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackLink {
    Imdb,
    Google,
}

impl FallbackLink {
    /// Links in display order.
    pub const ALL: [FallbackLink; 2] = [FallbackLink::Imdb, FallbackLink::Google];

    pub fn from_index(index: usize) -> Option<FallbackLink> {
        Self::ALL.get(index).copied()
    }

    /// Label shown in the dropdown.
    pub fn label(self, query: &str) -> String {
        match self {
            FallbackLink::Imdb => format!("Buscar '{}' no IMDB", query),
            FallbackLink::Google => format!("Buscar '{}' no Google", query),
        }
    }
}

/// URL opened for a fallback link.
pub fn fallback_link_url(link: FallbackLink, query: &str) -> String {
    let encoded = urlencoding::encode(query);
    match link {
        FallbackLink::Imdb => format!("https://www.imdb.com/find?q={}", encoded),
        FallbackLink::Google => format!("https://www.google.com/search?q={}%20filme", encoded),
    }
}

/// Resolves IMDb detail URLs for movies.
///
/// Results (including fallbacks) are cached per movie ID in a bounded LRU.
pub struct DetailLinks {
    catalog: Arc<dyn MovieCatalog>,
    cache: Mutex<LruCache<u32, String>>,
}

impl DetailLinks {
    pub fn new(catalog: Arc<dyn MovieCatalog>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            catalog,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Detail URL for a movie.
    ///
    /// Lookup failures are not surfaced; they fall back to a title search.
    pub async fn resolve(&self, movie_id: u32, title: &str, year: Option<i32>) -> String {
        if let Some(url) = self.cached(movie_id) {
            return url;
        }

        let url = match self.catalog.get_external_id(movie_id).await {
            Ok(Some(imdb_id)) => detail_url(&imdb_id),
            Ok(None) => {
                debug!("No IMDb id for movie {}, using title search", movie_id);
                detail_fallback_url(title, year)
            }
            Err(e) => {
                warn!("Failed to fetch IMDb id for movie {}: {}", movie_id, e);
                detail_fallback_url(title, year)
            }
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(movie_id, url.clone());
        }
        url
    }

    /// Detail URL for a search result.
    pub async fn resolve_movie(&self, movie: &Movie) -> String {
        self.resolve(movie.id, &movie.title, movie.year()).await
    }

    fn cached(&self, movie_id: u32) -> Option<String> {
        self.cache.lock().ok()?.get(&movie_id).cloned()
    }

    /// Number of cached URLs.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}
