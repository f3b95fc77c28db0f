//! Runs a [`SearchController`] on tokio.
//!
//! The driver performs the controller's effects: catalog fetches run in
//! spawned tasks and report back over a channel, links are resolved and
//! opened, and the debounce deadline is slept on.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use super::state::SearchController;
use super::types::{Effect, Key};
use crate::catalog::{CatalogError, DetailLinks, GenreCache, GenreCatalog, Movie, MovieCatalog};
use crate::favorites::FavoriteMovie;
use crate::navigation::{LinkOpener, NavigationError};
use crate::search::{PageRequest, PageResponse};

/// Result of background work, fed back into the driver.
#[derive(Debug)]
pub enum Completion {
    Page(PageResponse),
    Genres(Result<GenreCatalog, CatalogError>),
    LinkOpened {
        url: String,
        result: Result<(), NavigationError>,
    },
}

/// Things the owner of the driver may want to show.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    MovieChosen(Movie),
    LinkOpened(String),
    LinkFailed { url: String, message: String },
}

pub struct SearchDriver {
    controller: SearchController,
    catalog: Arc<dyn MovieCatalog>,
    genres: Arc<GenreCache>,
    links: Arc<DetailLinks>,
    opener: Arc<dyn LinkOpener>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    pending: usize,
    events: Vec<DriverEvent>,
}

enum Wake {
    Completion(Completion),
    Deadline,
}

impl SearchDriver {
    pub fn new(
        controller: SearchController,
        catalog: Arc<dyn MovieCatalog>,
        genres: Arc<GenreCache>,
        links: Arc<DetailLinks>,
        opener: Arc<dyn LinkOpener>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            catalog,
            genres,
            links,
            opener,
            tx,
            rx,
            pending: 0,
            events: Vec::new(),
        }
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    /// Start loading the genre list in the background.
    pub fn load_genres(&mut self) {
        let genres = Arc::clone(&self.genres);
        self.spawn(async move { Completion::Genres(genres.get().await) });
    }

    /// Run a controller operation and perform the effects it returns.
    pub fn dispatch(&mut self, op: impl FnOnce(&mut SearchController, Instant) -> Vec<Effect>) {
        let effects = op(&mut self.controller, Instant::now());
        self.execute(effects);
    }

    pub fn set_input(&mut self, text: &str) {
        self.dispatch(|c, now| c.set_input(text, now));
    }

    /// Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        let outcome = self.controller.handle_key(key, Instant::now());
        self.execute(outcome.effects);
        outcome.handled
    }

    /// Commit a due debounced query.
    pub fn tick(&mut self) {
        self.dispatch(|c, now| c.tick(now));
    }

    /// Open the detail page of a stored favorite.
    pub fn open_favorite(&mut self, favorite: &FavoriteMovie) {
        let links = Arc::clone(&self.links);
        let opener = Arc::clone(&self.opener);
        let (id, title, year) = (favorite.id, favorite.title.clone(), favorite.year_number());
        self.spawn(async move {
            let url = links.resolve(id, &title, year).await;
            let result = opener.open(&url);
            Completion::LinkOpened { url, result }
        });
    }

    /// Apply every completion that is already available.
    pub fn drain(&mut self) {
        while let Ok(completion) = self.rx.try_recv() {
            self.process(completion);
        }
        self.tick();
    }

    /// Wait for the next completion or the debounce deadline.
    ///
    /// Waits forever when [`Self::is_idle`] is true.
    pub async fn next(&mut self) {
        let deadline = self.controller.next_deadline();
        let sleep = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        let wake = tokio::select! {
            completion = self.rx.recv() => match completion {
                Some(completion) => Wake::Completion(completion),
                None => return,
            },
            _ = sleep => Wake::Deadline,
        };

        match wake {
            Wake::Completion(completion) => self.process(completion),
            Wake::Deadline => self.tick(),
        }
    }

    /// Run until no work is pending and no query waits on its debounce.
    pub async fn settle(&mut self) {
        while !self.is_idle() {
            self.next().await;
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending == 0 && self.controller.next_deadline().is_none()
    }

    /// Events produced since the last call.
    pub fn take_events(&mut self) -> Vec<DriverEvent> {
        std::mem::take(&mut self.events)
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage(request) => self.fetch(request),
                Effect::OpenUrl(url) => {
                    let result = self.opener.open(&url);
                    self.record_navigation(url, result);
                }
                Effect::OpenDetails(movie) => {
                    let links = Arc::clone(&self.links);
                    let opener = Arc::clone(&self.opener);
                    self.spawn(async move {
                        let url = links.resolve_movie(&movie).await;
                        let result = opener.open(&url);
                        Completion::LinkOpened { url, result }
                    });
                }
                Effect::MovieChosen(movie) => {
                    info!(movie_id = movie.id, "Selected \"{}\"", movie.title);
                    self.events.push(DriverEvent::MovieChosen(movie));
                }
            }
        }
    }

    fn fetch(&mut self, request: PageRequest) {
        let catalog = Arc::clone(&self.catalog);
        debug!(query = %request.query, page = request.page, "Fetching page");
        self.spawn(async move {
            let result = catalog.search_movies(&request.query, request.page).await;
            Completion::Page(PageResponse { request, result })
        });
    }

    fn process(&mut self, completion: Completion) {
        self.pending = self.pending.saturating_sub(1);
        match completion {
            Completion::Page(response) => {
                self.controller.apply_page(response);
            }
            Completion::Genres(result) => self.controller.apply_genres(result),
            Completion::LinkOpened { url, result } => self.record_navigation(url, result),
        }
    }

    fn record_navigation(&mut self, url: String, result: Result<(), NavigationError>) {
        match result {
            Ok(()) => {
                debug!(url = %url, "Opened link");
                self.events.push(DriverEvent::LinkOpened(url));
            }
            Err(e) => {
                error!("{}", e);
                self.events.push(DriverEvent::LinkFailed {
                    url,
                    message: e.to_string(),
                });
            }
        }
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // The driver may be gone; nothing to report to then.
            let _ = tx.send(work.await);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::VisibleItem;
    use crate::favorites::{FavoritesStore, MemoryKeyValueStore};
    use crate::testing::{fixtures, MockCatalog, RecordingLinkOpener};
    use std::time::Duration;

    struct Harness {
        driver: SearchDriver,
        catalog: Arc<MockCatalog>,
        opener: Arc<RecordingLinkOpener>,
    }

    fn harness() -> Harness {
        let catalog = Arc::new(MockCatalog::new());
        catalog.set_genres(fixtures::genres());
        let opener = Arc::new(RecordingLinkOpener::new());
        let favorites = Arc::new(FavoritesStore::open(Arc::new(MemoryKeyValueStore::new())));
        let controller = SearchController::new(favorites, Duration::from_millis(300));

        let driver = SearchDriver::new(
            controller,
            catalog.clone(),
            Arc::new(GenreCache::new(catalog.clone())),
            Arc::new(DetailLinks::new(catalog.clone(), 100)),
            opener.clone(),
        );
        Harness {
            driver,
            catalog,
            opener,
        }
    }

    fn titles(driver: &SearchDriver) -> Vec<String> {
        driver
            .controller()
            .session()
            .movies()
            .iter()
            .map(|m| m.title.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_fetches_after_debounce() {
        let mut h = harness();
        h.catalog.set_movies(vec![
            fixtures::movie(268, "Batman", "1989-06-23"),
            fixtures::movie(1, "Alien", "1979-05-25"),
        ]);

        h.driver.set_input("b");
        h.driver.set_input("ba");
        h.driver.set_input("bat");
        h.driver.settle().await;

        assert_eq!(h.catalog.search_count(), 1);
        assert_eq!(titles(&h.driver), vec!["Batman"]);
        assert!(h.driver.controller().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_search_never_overwrites_newer_results() {
        let mut h = harness();
        h.catalog.set_movies(vec![
            fixtures::movie(1, "Alien", "1979-05-25"),
            fixtures::movie(11, "Star Wars", "1977-05-25"),
        ]);
        h.catalog.set_delay("ali", Duration::from_secs(2));

        h.driver.set_input("ali");
        // Commit "ali" and start its slow fetch
        h.driver.next().await;
        assert!(h.driver.controller().session().is_loading());

        h.driver.set_input("star");
        h.driver.settle().await;

        assert_eq!(h.catalog.search_count(), 2);
        assert_eq!(titles(&h.driver), vec!["Star Wars"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrolling_loads_following_pages() {
        let mut h = harness();
        h.catalog.set_movies(fixtures::numbered_movies("Rocky", 45));

        h.driver.set_input("rocky");
        h.driver.settle().await;
        assert_eq!(h.driver.controller().item_count(), 20);

        h.driver.dispatch(|c, _| c.sentinel_visible());
        h.driver.dispatch(|c, _| c.sentinel_visible());
        h.driver.settle().await;
        assert_eq!(h.driver.controller().item_count(), 40);

        h.driver.dispatch(|c, _| c.sentinel_visible());
        h.driver.settle().await;
        assert_eq!(h.driver.controller().item_count(), 45);
        assert!(!h.driver.controller().session().has_next_page());
        assert_eq!(h.catalog.search_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_link_is_opened() {
        let mut h = harness();

        h.driver.set_input("zzzzz");
        h.driver.settle().await;
        assert!(matches!(
            h.driver.controller().visible_items().as_slice(),
            [VisibleItem::Fallback(_), VisibleItem::Fallback(_)]
        ));

        h.driver.handle_key(Key::Up);
        assert!(h.driver.handle_key(Key::Enter));

        assert_eq!(
            h.opener.opened(),
            vec!["https://www.google.com/search?q=zzzzz%20filme"]
        );
        assert_eq!(
            h.driver.take_events(),
            vec![DriverEvent::LinkOpened(
                "https://www.google.com/search?q=zzzzz%20filme".to_string()
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_details_resolve_imdb_id() {
        let mut h = harness();
        h.catalog.set_movies(vec![
            fixtures::movie(268, "Batman", "1989-06-23"),
            fixtures::movie(364, "Batman Returns", "1992-06-19"),
        ]);
        h.catalog.set_external_id(268, "tt0096895");

        h.driver.set_input("batman");
        h.driver.settle().await;

        h.driver.dispatch(|c, _| c.open_details(0));
        h.driver.dispatch(|c, _| c.open_details(1));
        h.driver.settle().await;

        let opened = h.opener.opened();
        assert!(opened.contains(&"https://www.imdb.com/title/tt0096895/".to_string()));
        assert!(opened.contains(
            &"https://www.imdb.com/find?q=Batman%20Returns%201992&s=tt&ttype=ft".to_string()
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_genres_feed_favorite_snapshots() {
        let mut h = harness();
        h.catalog
            .set_movies(vec![fixtures::movie_with_genres(155, "The Dark Knight", vec![18, 80])]);

        h.driver.load_genres();
        h.driver.set_input("dark");
        h.driver.settle().await;

        h.driver.handle_key(Key::Down);
        assert!(h.driver.handle_key(Key::Space));

        let favorites = h.driver.controller().favorites().favorites();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].genres, vec!["Drama", "Crime"]);
        assert_eq!(h.catalog.genre_request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_choosing_reports_event_and_opening_favorite() {
        let mut h = harness();
        h.catalog.set_movies(vec![fixtures::movie(268, "Batman", "1989-06-23")]);

        h.driver.set_input("bat");
        h.driver.settle().await;
        h.driver.handle_key(Key::Down);
        h.driver.handle_key(Key::Enter);

        match h.driver.take_events().as_slice() {
            [DriverEvent::MovieChosen(movie)] => assert_eq!(movie.id, 268),
            other => panic!("unexpected events {:?}", other),
        }

        let favorite = FavoriteMovie::from_movie(
            &fixtures::movie(268, "Batman", "1989-06-23"),
            &GenreCatalog::default(),
        );
        h.driver.open_favorite(&favorite);
        h.driver.settle().await;
        assert_eq!(
            h.opener.opened(),
            vec!["https://www.imdb.com/find?q=Batman%201989&s=tt&ttype=ft"]
        );
    }
}
