//! The search & selection state machine.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::types::{Effect, Key, KeyOutcome, ScrollMetrics, VisibleItem};
use crate::catalog::{fallback_link_url, CatalogError, FallbackLink, GenreCatalog, Movie};
use crate::debounce::Debouncer;
use crate::favorites::FavoritesStore;
use crate::search::{PageResponse, SearchSession};

/// Coordinates the raw input, debounced query, paged results, dropdown
/// visibility, keyboard selection and autocomplete.
///
/// All methods are synchronous. Anything that needs I/O is returned as an
/// [`Effect`] for the owner to perform; fetched pages come back through
/// [`SearchController::apply_page`].
///
/// Whether the dropdown should be open is derived from the input and the
/// visible items. Whenever that derived condition flips, the selection and
/// autocomplete state are reset.
pub struct SearchController {
    input: String,
    debouncer: Debouncer<String>,
    session: SearchSession,
    favorites: Arc<FavoritesStore>,
    genres: GenreCatalog,
    genre_error: Option<String>,
    open: bool,
    should_open: bool,
    selected: Option<usize>,
    /// Text typed before autocomplete replaced it; `Some` while active.
    autocomplete_original: Option<String>,
}

impl SearchController {
    pub fn new(favorites: Arc<FavoritesStore>, debounce: Duration) -> Self {
        Self {
            input: String::new(),
            debouncer: Debouncer::new(String::new(), debounce),
            session: SearchSession::new(),
            favorites,
            genres: GenreCatalog::default(),
            genre_error: None,
            open: false,
            should_open: false,
            selected: None,
            autocomplete_original: None,
        }
    }

    // Events

    /// The raw input changed.
    pub fn set_input(&mut self, text: impl Into<String>, now: Instant) -> Vec<Effect> {
        self.input = text.into();
        self.debouncer.update(self.input.clone(), now);
        self.tick(now)
    }

    /// Commit the debounced query if its quiet period is over.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(query) = self.debouncer.poll(now) {
            debug!(query = %query, "Search query committed");
            if let Some(request) = self.session.set_query(&query) {
                effects.push(Effect::FetchPage(request));
            }
        }
        self.refresh();
        effects
    }

    /// When [`Self::tick`] should next be called.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Feed back a fetched page. Returns false if it was stale.
    pub fn apply_page(&mut self, response: PageResponse) -> bool {
        let accepted = self.session.apply(response);
        self.refresh();
        accepted
    }

    pub fn apply_genres(&mut self, result: Result<GenreCatalog, CatalogError>) {
        match result {
            Ok(genres) => {
                debug!("Loaded {} genres", genres.genres().len());
                self.genres = genres;
                self.genre_error = None;
            }
            Err(e) => {
                warn!("Failed to load genres: {}", e);
                self.genre_error = Some(e.user_message());
            }
        }
    }

    pub fn handle_key(&mut self, key: Key, now: Instant) -> KeyOutcome {
        let outcome = match key {
            Key::Down => self.move_selection(|i, n| (i + 1) % n, 0),
            Key::Up => {
                let last = self.item_count().saturating_sub(1);
                self.move_selection(|i, n| (i + n - 1) % n, last)
            }
            Key::Right => match self.autocomplete(now) {
                Some(effects) => KeyOutcome::handled(effects),
                None => KeyOutcome::ignored(),
            },
            Key::Left => match self.autocomplete_original.take() {
                Some(original) => KeyOutcome::handled(self.set_input(original, now)),
                None => KeyOutcome::ignored(),
            },
            Key::Enter if self.open => {
                let effects = match self.selected {
                    Some(index) => self.activate(index),
                    None => Vec::new(),
                };
                KeyOutcome::handled(effects)
            }
            Key::Space if self.open => match self.selected.and_then(|i| self.movie_at(i)) {
                Some(movie) => {
                    self.toggle_favorite(&movie);
                    KeyOutcome::handled(Vec::new())
                }
                None => KeyOutcome::ignored(),
            },
            Key::Escape if self.open => {
                self.close();
                KeyOutcome::handled(Vec::new())
            }
            Key::Enter | Key::Space | Key::Escape => KeyOutcome::ignored(),
        };
        self.refresh();
        outcome
    }

    /// Pointer click on a dropdown item.
    pub fn click_item(&mut self, index: usize) -> Vec<Effect> {
        let effects = self.activate(index);
        self.refresh();
        effects
    }

    /// Ask for the detail page of the movie at `index`.
    pub fn open_details(&mut self, index: usize) -> Vec<Effect> {
        self.movie_at(index)
            .map(|movie| vec![Effect::OpenDetails(movie)])
            .unwrap_or_default()
    }

    /// Pointer toggle of a row's favorite marker.
    ///
    /// Returns whether the movie is now a favorite, or `None` if `index` is
    /// not a movie row.
    pub fn toggle_favorite_at(&mut self, index: usize) -> Option<bool> {
        let movie = self.movie_at(index)?;
        let now_favorite = self.toggle_favorite(&movie);
        self.refresh();
        Some(now_favorite)
    }

    /// The input gained focus.
    pub fn focus(&mut self) {
        if !self.input.trim().is_empty() && !self.session.movies().is_empty() {
            self.open = true;
        }
        self.refresh();
    }

    /// Pointer interaction outside the input and the dropdown.
    pub fn click_outside(&mut self) {
        self.open = false;
        self.selected = None;
        self.autocomplete_original = None;
        self.refresh();
    }

    /// The user scrolled the dropdown.
    ///
    /// Near the bottom this loads the next page, retrying a failed one.
    pub fn scrolled(&mut self, metrics: ScrollMetrics) -> Vec<Effect> {
        if metrics.is_near_bottom() {
            self.load_more(true)
        } else {
            Vec::new()
        }
    }

    /// The trailing sentinel row became visible.
    ///
    /// Does not retry a failed page; only a scroll does.
    pub fn sentinel_visible(&mut self) -> Vec<Effect> {
        self.load_more(false)
    }

    // Queries

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The debounced query text (untrimmed).
    pub fn committed_query(&self) -> &str {
        self.debouncer.current()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_autocomplete_active(&self) -> bool {
        self.autocomplete_original.is_some()
    }

    /// Search error, else genre loading error.
    pub fn error(&self) -> Option<&str> {
        self.session.error().or(self.genre_error.as_deref())
    }

    pub fn is_favorite(&self, movie_id: u32) -> bool {
        self.favorites.is_favorite(movie_id)
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn genres(&self) -> &GenreCatalog {
        &self.genres
    }

    pub fn favorites(&self) -> &Arc<FavoritesStore> {
        &self.favorites
    }

    /// No results for the committed query: offer external search links.
    pub fn shows_fallback_links(&self) -> bool {
        self.session.movies().is_empty()
            && !self.session.query().is_empty()
            && !self.session.is_loading()
            && self.session.total_results() == 0
    }

    pub fn visible_items(&self) -> Vec<VisibleItem<'_>> {
        let movies = self.session.movies();
        if !movies.is_empty() {
            movies.iter().map(VisibleItem::Movie).collect()
        } else if self.shows_fallback_links() {
            FallbackLink::ALL
                .iter()
                .map(|link| VisibleItem::Fallback(*link))
                .collect()
        } else {
            Vec::new()
        }
    }

    pub fn item_count(&self) -> usize {
        let movies = self.session.movies().len();
        if movies > 0 {
            movies
        } else if self.shows_fallback_links() {
            FallbackLink::ALL.len()
        } else {
            0
        }
    }

    // Internals

    fn open_condition(&self) -> bool {
        !self.input.trim().is_empty() && self.item_count() > 0
    }

    fn refresh(&mut self) {
        let should_open = self.open_condition();
        if should_open != self.should_open {
            self.should_open = should_open;
            self.open = should_open;
            self.selected = None;
            self.autocomplete_original = None;
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.selected = None;
        self.autocomplete_original = None;
    }

    fn move_selection(&mut self, step: impl Fn(usize, usize) -> usize, first: usize) -> KeyOutcome {
        let count = self.item_count();
        if !self.open || count == 0 {
            return KeyOutcome::ignored();
        }
        self.selected = Some(match self.selected {
            Some(index) => step(index, count),
            None => first,
        });
        KeyOutcome::handled(Vec::new())
    }

    fn autocomplete(&mut self, now: Instant) -> Option<Vec<Effect>> {
        let title = self.session.movies().first()?.title.clone();
        if self.input.trim().is_empty() {
            return None;
        }
        self.autocomplete_original = Some(self.input.clone());
        Some(self.set_input(title, now))
    }

    fn activate(&mut self, index: usize) -> Vec<Effect> {
        if let Some(movie) = self.movie_at(index) {
            return self.choose(movie);
        }
        match self.link_at(index) {
            Some(link) => vec![Effect::OpenUrl(fallback_link_url(
                link,
                self.session.query(),
            ))],
            None => Vec::new(),
        }
    }

    /// Commit a movie: the input shows its title and the dropdown closes.
    ///
    /// The title is not searched for; the committed query stays as it was.
    fn choose(&mut self, movie: Movie) -> Vec<Effect> {
        debug!(movie_id = movie.id, title = %movie.title, "Movie chosen");
        self.input = movie.title.clone();
        self.debouncer.cancel();
        self.close();
        vec![Effect::MovieChosen(movie)]
    }

    fn toggle_favorite(&self, movie: &Movie) -> bool {
        match self.favorites.toggle(movie, &self.genres) {
            Ok(now_favorite) => now_favorite,
            Err(e) => {
                warn!(movie_id = movie.id, "Failed to persist favorites: {}", e);
                self.favorites.is_favorite(movie.id)
            }
        }
    }

    fn load_more(&mut self, retry: bool) -> Vec<Effect> {
        if !self.open || self.session.movies().is_empty() {
            return Vec::new();
        }
        let request = if retry {
            self.session.retry_next_page()
        } else {
            self.session.fetch_next_page()
        };
        request
            .map(Effect::FetchPage)
            .into_iter()
            .collect()
    }

    fn movie_at(&self, index: usize) -> Option<Movie> {
        self.session.movies().get(index).cloned()
    }

    fn link_at(&self, index: usize) -> Option<FallbackLink> {
        if self.shows_fallback_links() {
            FallbackLink::from_index(index)
        } else {
            None
        }
    }
}
