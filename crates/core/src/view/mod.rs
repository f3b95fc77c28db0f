//! What the presentation layer draws, derived from controller state.
//!
//! Nothing in here holds state of its own; [`ViewModel::build`] is a pure
//! function of the controller.

mod highlight;

pub use highlight::{highlight, Segment};

use crate::catalog::{fallback_link_url, image_url, FallbackLink, Movie};
use crate::controller::{SearchController, VisibleItem};
use crate::favorites::FavoriteMovie;

/// Keyboard help shown under the input.
pub const HINT: &str =
    "Utilize as teclas ↓ ↑ para navegar • → para autocompletar • ← para reverter • Espaço para favoritar";

pub const LOADING_MORE: &str = "Carregando mais filmes...";

pub const ALL_LOADED: &str = "Todos os resultados carregados";

/// Genres shown per dropdown row.
const ROW_GENRES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MovieRow {
    pub id: u32,
    pub title: Vec<Segment>,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub is_favorite: bool,
    pub is_selected: bool,
    /// The first row is drawn larger, with the overview.
    pub is_first: bool,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRow {
    pub label: String,
    pub url: String,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemView {
    Movie(MovieRow),
    Link(LinkRow),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub input: String,
    pub open: bool,
    pub items: Vec<ItemView>,
    /// First page in flight.
    pub loading: bool,
    pub loading_more: Option<&'static str>,
    /// A trailing row whose visibility should trigger the next page.
    pub has_sentinel: bool,
    pub footer: Option<String>,
    pub result_count: Option<String>,
    pub no_results: Option<String>,
    pub error: Option<String>,
    pub hint: &'static str,
}

impl ViewModel {
    pub fn build(controller: &SearchController) -> Self {
        let session = controller.session();
        let query = session.query();
        let selected = controller.selected();

        let items = controller
            .visible_items()
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let is_selected = selected == Some(index);
                match item {
                    VisibleItem::Movie(movie) => {
                        ItemView::Movie(movie_row(controller, movie, index, is_selected))
                    }
                    VisibleItem::Fallback(link) => ItemView::Link(link_row(link, query, is_selected)),
                }
            })
            .collect();

        let movies = session.movies().len();
        let showing_movies = movies > 0;
        let fetching_more = session.is_fetching_next_page();

        let footer = (showing_movies && !session.has_next_page())
            .then(|| footer_text(movies, session.total_results()));

        Self {
            input: controller.input().to_string(),
            open: controller.is_open(),
            items,
            loading: session.is_loading(),
            loading_more: fetching_more.then_some(LOADING_MORE),
            has_sentinel: showing_movies && session.has_next_page() && !fetching_more,
            footer,
            result_count: showing_movies.then(|| format_movie_count(session.total_results())),
            no_results: controller
                .shows_fallback_links()
                .then(|| format!("Nenhum resultado encontrado para \"{}\"", query)),
            error: controller.error().map(str::to_string),
            hint: HINT,
        }
    }
}

/// "1 filme encontrado" / "{n} filmes encontrados".
pub fn format_movie_count(count: u32) -> String {
    if count == 1 {
        "1 filme encontrado".to_string()
    } else {
        format!("{} filmes encontrados", count)
    }
}

/// Footer once no further page will be loaded.
pub fn footer_text(loaded: usize, total_results: u32) -> String {
    if total_results == 0 || loaded as u64 >= total_results as u64 {
        ALL_LOADED.to_string()
    } else {
        format!("{} de {}", loaded, format_movie_count(total_results))
    }
}

fn movie_row(controller: &SearchController, movie: &Movie, index: usize, is_selected: bool) -> MovieRow {
    let is_first = index == 0;
    let mut genres = controller.genres().resolve(&movie.genre_ids);
    genres.truncate(ROW_GENRES);

    MovieRow {
        id: movie.id,
        title: highlight(&movie.title, controller.committed_query()),
        year: movie.year(),
        genres,
        poster_url: image_url(movie.poster_path.as_deref(), if is_first { "w154" } else { "w92" }),
        is_favorite: controller.is_favorite(movie.id),
        is_selected,
        is_first,
        overview: (is_first && !movie.overview.is_empty()).then(|| movie.overview.clone()),
    }
}

fn link_row(link: FallbackLink, query: &str, is_selected: bool) -> LinkRow {
    LinkRow {
        label: link.label(query),
        url: fallback_link_url(link, query),
        is_selected,
    }
}

/// A row of the favorites table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRow {
    pub id: u32,
    pub title: String,
    pub year: String,
    pub genres: String,
    pub poster_url: Option<String>,
}

pub fn favorite_rows(favorites: &[FavoriteMovie]) -> Vec<FavoriteRow> {
    favorites
        .iter()
        .map(|f| FavoriteRow {
            id: f.id,
            title: f.title.clone(),
            year: f.year.clone(),
            genres: f.genres.join(", "),
            poster_url: image_url(f.poster_path.as_deref(), "w92"),
        })
        .collect()
}
