//! Page accumulation for a single search query.

use tracing::{debug, warn};

use crate::catalog::{CatalogError, Movie, MoviePage};

/// Upstream limit on addressable result pages.
pub const MAX_PAGES: u32 = 500;

/// A page fetch the session wants performed.
///
/// `generation` identifies the query session that issued it; responses from
/// an older generation are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub page: u32,
    pub generation: u64,
}

/// Outcome of a [`PageRequest`].
#[derive(Debug)]
pub struct PageResponse {
    pub request: PageRequest,
    pub result: Result<MoviePage, CatalogError>,
}

#[derive(Debug, Clone, Copy)]
struct LastPage {
    page: u32,
    total_pages: u32,
    result_count: usize,
}

/// Accumulated result pages for the current query.
///
/// Pages are contiguous from 1 and at most one fetch is in flight.
#[derive(Debug, Default)]
pub struct SearchSession {
    query: String,
    generation: u64,
    movies: Vec<Movie>,
    last_page: Option<LastPage>,
    total_results: Option<u32>,
    in_flight: Option<u32>,
    error: Option<String>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a new query.
    ///
    /// The query is trimmed. The same query is a no-op unless the previous
    /// attempt failed, in which case it starts over. A different query drops
    /// all pages and, when non-empty, asks for page 1.
    pub fn set_query(&mut self, raw: &str) -> Option<PageRequest> {
        let query = raw.trim();
        if query == self.query && self.error.is_none() {
            return None;
        }

        self.query = query.to_string();
        self.generation += 1;
        self.movies.clear();
        self.last_page = None;
        self.total_results = None;
        self.in_flight = None;
        self.error = None;

        if self.query.is_empty() {
            return None;
        }
        Some(self.request(1))
    }

    /// Ask for the page after the last one held.
    ///
    /// `None` while a fetch is in flight, when no further page exists, or
    /// after a failed fetch (see [`Self::retry_next_page`]).
    pub fn fetch_next_page(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || self.error.is_some() || !self.has_next_page() {
            return None;
        }
        let next = self.last_page.map(|p| p.page + 1)?;
        Some(self.request(next))
    }

    /// Ask for the next page even if the previous fetch failed.
    ///
    /// Only explicit user actions should call this; a failure is never
    /// retried on its own.
    pub fn retry_next_page(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_next_page() {
            return None;
        }
        self.error = None;
        self.fetch_next_page()
    }

    /// Apply a fetched page or failure.
    ///
    /// Returns false (and changes nothing) for responses that do not answer
    /// the fetch currently in flight for this session.
    pub fn apply(&mut self, response: PageResponse) -> bool {
        let request = response.request;
        if request.generation != self.generation
            || request.query != self.query
            || self.in_flight != Some(request.page)
        {
            debug!(
                query = %request.query,
                page = request.page,
                generation = request.generation,
                "Dropping stale page response"
            );
            return false;
        }

        self.in_flight = None;
        match response.result {
            Ok(page) => {
                debug!(
                    query = %self.query,
                    page = request.page,
                    results = page.results.len(),
                    total_pages = page.total_pages,
                    "Page loaded"
                );
                if request.page == 1 {
                    self.total_results = Some(page.total_results);
                }
                self.last_page = Some(LastPage {
                    page: request.page,
                    total_pages: page.total_pages,
                    result_count: page.results.len(),
                });
                self.movies.extend(page.results);
                self.error = None;
            }
            Err(e) => {
                warn!(query = %self.query, page = request.page, "Search failed: {}", e);
                self.error = Some(e.user_message());
            }
        }
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All movies in fetch order.
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Reported total from page 1; zero before it arrives.
    pub fn total_results(&self) -> u32 {
        self.total_results.unwrap_or(0)
    }

    pub fn pages_loaded(&self) -> u32 {
        self.last_page.map(|p| p.page).unwrap_or(0)
    }

    pub fn has_next_page(&self) -> bool {
        match self.last_page {
            Some(last) => {
                last.page < last.total_pages && last.page < MAX_PAGES && last.result_count > 0
            }
            None => false,
        }
    }

    /// First page in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight == Some(1)
    }

    /// A later page in flight.
    pub fn is_fetching_next_page(&self) -> bool {
        matches!(self.in_flight, Some(page) if page > 1)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn request(&mut self, page: u32) -> PageRequest {
        self.in_flight = Some(page);
        debug!(query = %self.query, page, "Requesting page");
        PageRequest {
            query: self.query.clone(),
            page,
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn ok(request: &PageRequest, page: MoviePage) -> PageResponse {
        PageResponse {
            request: request.clone(),
            result: Ok(page),
        }
    }

    #[test]
    fn test_empty_query_is_idle() {
        let mut session = SearchSession::new();
        assert!(session.set_query("   ").is_none());
        assert!(session.movies().is_empty());
        assert_eq!(session.total_results(), 0);
        assert!(!session.has_next_page());
        assert!(session.fetch_next_page().is_none());
    }

    #[test]
    fn test_query_is_trimmed_and_deduplicated() {
        let mut session = SearchSession::new();
        let request = session.set_query("  bat ").unwrap();
        assert_eq!(request.query, "bat");
        assert_eq!(request.page, 1);
        assert!(session.is_loading());

        assert!(session.set_query("bat").is_none());
        assert!(session.is_loading());
    }

    #[test]
    fn test_pages_accumulate_in_order() {
        let mut session = SearchSession::new();
        let movies = fixtures::numbered_movies("Star", 4);

        let first = session.set_query("star").unwrap();
        assert!(session.apply(ok(&first, fixtures::page(1, 2, 4, movies[..2].to_vec()))));
        assert!(session.has_next_page());
        assert!(!session.is_loading());

        let second = session.fetch_next_page().unwrap();
        assert_eq!(second.page, 2);
        assert!(session.is_fetching_next_page());
        // Concurrent request is a no-op
        assert!(session.fetch_next_page().is_none());

        assert!(session.apply(ok(&second, fixtures::page(2, 2, 9, movies[2..].to_vec()))));
        let ids: Vec<u32> = session.movies().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(!session.has_next_page());
        // Total frozen from page 1
        assert_eq!(session.total_results(), 4);
        assert_eq!(session.pages_loaded(), 2);
    }

    #[test]
    fn test_empty_page_stops_pagination() {
        let mut session = SearchSession::new();
        let request = session.set_query("ghost").unwrap();
        session.apply(ok(&request, fixtures::page(1, 40, 800, vec![])));

        assert!(!session.has_next_page());
        assert!(session.fetch_next_page().is_none());
    }

    #[test]
    fn test_page_ceiling() {
        let mut session = SearchSession::new();
        session.set_query("a");
        // Pretend we are deep into the result set
        session.in_flight = Some(MAX_PAGES);
        let request = PageRequest {
            query: "a".to_string(),
            page: MAX_PAGES,
            generation: session.generation(),
        };
        session.apply(ok(&request, fixtures::page(MAX_PAGES, 900, 18000, fixtures::numbered_movies("A", 20))));

        assert!(!session.has_next_page());
    }

    #[test]
    fn test_new_query_discards_pages_and_stale_responses() {
        let mut session = SearchSession::new();
        let old = session.set_query("bat").unwrap();
        let new = session.set_query("batman").unwrap();
        assert_ne!(old.generation, new.generation);

        // Old query resolves late
        assert!(!session.apply(ok(&old, fixtures::page(1, 1, 1, vec![fixtures::movie(1, "Bat", "")]))));
        assert!(session.movies().is_empty());
        assert!(session.is_loading());

        assert!(session.apply(ok(&new, fixtures::page(1, 1, 1, vec![fixtures::movie(2, "Batman", "")]))));
        assert_eq!(session.movies()[0].title, "Batman");
    }

    #[test]
    fn test_out_of_order_page_is_ignored() {
        let mut session = SearchSession::new();
        let first = session.set_query("rocky").unwrap();
        let bogus = PageRequest { page: 3, ..first.clone() };

        assert!(!session.apply(ok(&bogus, fixtures::page(3, 5, 100, fixtures::numbered_movies("R", 2)))));
        assert!(session.is_loading());
    }

    #[test]
    fn test_error_is_stored_and_cleared_by_retry() {
        let mut session = SearchSession::new();
        let request = session.set_query("bat").unwrap();
        session.apply(PageResponse {
            request,
            result: Err(CatalogError::Network("connection refused".to_string())),
        });

        assert!(!session.is_loading());
        assert!(session.error().is_some());

        // Same query again retries after a failure
        let retry = session.set_query("bat").unwrap();
        assert_eq!(retry.page, 1);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_failed_next_page_waits_for_explicit_retry() {
        let mut session = SearchSession::new();
        let first = session.set_query("star").unwrap();
        session.apply(ok(&first, fixtures::page(1, 3, 50, fixtures::numbered_movies("Star", 20))));

        let second = session.fetch_next_page().unwrap();
        session.apply(PageResponse {
            request: second,
            result: Err(CatalogError::RateLimitExceeded),
        });
        assert!(session.error().is_some());
        assert!(session.has_next_page());
        assert_eq!(session.fetch_next_page(), None);

        let retry = session.retry_next_page().unwrap();
        assert_eq!(retry.page, 2);
        assert!(session.error().is_none());
        // In flight
        assert_eq!(session.retry_next_page(), None);
    }

    #[test]
    fn test_successful_page_clears_previous_error() {
        let mut session = SearchSession::new();
        let first = session.set_query("star").unwrap();
        session.apply(ok(&first, fixtures::page(1, 3, 50, fixtures::numbered_movies("Star", 20))));

        let second = session.fetch_next_page().unwrap();
        session.apply(PageResponse {
            request: second,
            result: Err(CatalogError::Network("timeout".to_string())),
        });
        assert!(session.error().is_some());

        // Error still showing when the retried page lands
        let retry = session.retry_next_page().unwrap();
        session.error = Some("Erro de conexão".to_string());
        assert!(session.apply(ok(&retry, fixtures::page(2, 3, 50, fixtures::numbered_movies("Star", 20)))));

        assert_eq!(session.error(), None);
        assert_eq!(session.movies().len(), 40);
    }
}
