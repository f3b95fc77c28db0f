//! Mock movie catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::catalog::{CatalogError, Genre, Movie, MovieCatalog, MoviePage};

/// Page size used when paginating configured movies.
pub const MOCK_PAGE_SIZE: usize = 20;

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCatalogQuery {
    SearchMovies { query: String, page: u32 },
    GetGenres,
    GetExternalId { movie_id: u32 },
}

#[derive(Default)]
struct MockState {
    movies: Vec<Movie>,
    pages: HashMap<(String, u32), MoviePage>,
    delays: HashMap<String, Duration>,
    genres: Vec<Genre>,
    external_ids: HashMap<u32, String>,
    queries: Vec<RecordedCatalogQuery>,
    next_error: Option<CatalogError>,
}

/// Mock implementation of the MovieCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configured movies (filtered by title, paginated) or scripted pages
/// - Delay responses per query to simulate slow requests
/// - Track queries for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use moviefinder_core::testing::{MockCatalog, fixtures};
///
/// let catalog = MockCatalog::new();
/// catalog.set_movies(vec![fixtures::movie(268, "Batman", "1989-06-23")]);
///
/// let page = catalog.search_movies("bat", 1).await?;
/// assert_eq!(page.results.len(), 1);
/// ```
#[derive(Default)]
pub struct MockCatalog {
    state: Mutex<MockState>,
}

impl std::fmt::Debug for MockCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCatalog").finish_non_exhaustive()
    }
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Movies searched by case-insensitive title match.
    pub fn set_movies(&self, movies: Vec<Movie>) {
        self.with_state(|s| s.movies = movies);
    }

    /// Script the exact response for a `(query, page)` pair.
    pub fn set_page(&self, query: &str, page: MoviePage) {
        self.with_state(|s| {
            s.pages.insert((query.to_string(), page.page), page);
        });
    }

    /// Delay every search for `query` by `delay`.
    pub fn set_delay(&self, query: &str, delay: Duration) {
        self.with_state(|s| {
            s.delays.insert(query.to_string(), delay);
        });
    }

    pub fn set_genres(&self, genres: Vec<Genre>) {
        self.with_state(|s| s.genres = genres);
    }

    pub fn set_external_id(&self, movie_id: u32, imdb_id: &str) {
        self.with_state(|s| {
            s.external_ids.insert(movie_id, imdb_id.to_string());
        });
    }

    /// The next operation will fail with this error.
    pub fn set_next_error(&self, error: CatalogError) {
        self.with_state(|s| s.next_error = Some(error));
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.with_state(|s| s.queries.clone())
    }

    pub fn search_count(&self) -> usize {
        self.count(|q| matches!(q, RecordedCatalogQuery::SearchMovies { .. }))
    }

    pub fn genre_request_count(&self) -> usize {
        self.count(|q| matches!(q, RecordedCatalogQuery::GetGenres))
    }

    pub fn external_id_request_count(&self) -> usize {
        self.count(|q| matches!(q, RecordedCatalogQuery::GetExternalId { .. }))
    }

    fn count(&self, pred: impl Fn(&RecordedCatalogQuery) -> bool) -> usize {
        self.with_state(|s| s.queries.iter().filter(|q| pred(q)).count())
    }

    fn record(&self, query: RecordedCatalogQuery) -> Result<(), CatalogError> {
        self.with_state(|s| {
            s.queries.push(query);
            match s.next_error.take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    fn build_page(&self, query: &str, page: u32) -> MoviePage {
        self.with_state(|s| {
            if let Some(scripted) = s.pages.get(&(query.to_string(), page)) {
                return scripted.clone();
            }

            let needle = query.to_lowercase();
            let matching: Vec<Movie> = s
                .movies
                .iter()
                .filter(|m| m.title.to_lowercase().contains(&needle))
                .cloned()
                .collect();

            let total_results = matching.len() as u32;
            let total_pages = matching.len().div_ceil(MOCK_PAGE_SIZE) as u32;
            let start = (page.saturating_sub(1) as usize) * MOCK_PAGE_SIZE;
            let results = matching
                .into_iter()
                .skip(start)
                .take(MOCK_PAGE_SIZE)
                .collect();

            MoviePage {
                page,
                results,
                total_pages,
                total_results,
            }
        })
    }
}

#[async_trait]
impl MovieCatalog for MockCatalog {
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        self.record(RecordedCatalogQuery::SearchMovies {
            query: query.to_string(),
            page,
        })?;

        let delay = self.with_state(|s| s.delays.get(query).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.build_page(query, page))
    }

    async fn get_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        self.record(RecordedCatalogQuery::GetGenres)?;
        Ok(self.with_state(|s| s.genres.clone()))
    }

    async fn get_external_id(&self, movie_id: u32) -> Result<Option<String>, CatalogError> {
        self.record(RecordedCatalogQuery::GetExternalId { movie_id })?;
        Ok(self.with_state(|s| s.external_ids.get(&movie_id).cloned()))
    }
}
