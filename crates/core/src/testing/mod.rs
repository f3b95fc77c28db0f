//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external collaborators
//! (movie catalog, link opener), allowing the controller and driver to be
//! exercised end to end without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use moviefinder_core::testing::{fixtures, MockCatalog, RecordingLinkOpener};
//!
//! let catalog = MockCatalog::new();
//! catalog.set_movies(vec![fixtures::movie(268, "Batman", "1989-06-23")]);
//! catalog.set_genres(fixtures::genres());
//!
//! let opener = RecordingLinkOpener::new();
//! // Hand both to a SearchDriver...
//! ```

mod mock_catalog;
mod recording_opener;

pub use mock_catalog::{MockCatalog, RecordedCatalogQuery, MOCK_PAGE_SIZE};
pub use recording_opener::RecordingLinkOpener;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{Genre, GenreCatalog, Movie, MoviePage};

    /// Create a test movie with reasonable defaults.
    pub fn movie(id: u32, title: &str, release_date: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            release_date: release_date.to_string(),
            genre_ids: vec![28, 80],
            overview: format!("A movie about {}.", title.to_lowercase()),
            vote_average: 7.5,
            backdrop_path: None,
        }
    }

    /// Create a test movie with explicit genre IDs.
    pub fn movie_with_genres(id: u32, title: &str, genre_ids: Vec<u32>) -> Movie {
        Movie {
            genre_ids,
            ..movie(id, title, "2008-07-18")
        }
    }

    /// `count` movies titled "{prefix} 1", "{prefix} 2", ... with IDs starting at 1.
    pub fn numbered_movies(prefix: &str, count: u32) -> Vec<Movie> {
        (1..=count)
            .map(|i| movie(i, &format!("{} {}", prefix, i), "2000-01-01"))
            .collect()
    }

    /// Create a result page.
    pub fn page(page: u32, total_pages: u32, total_results: u32, results: Vec<Movie>) -> MoviePage {
        MoviePage {
            page,
            results,
            total_pages,
            total_results,
        }
    }

    /// A small genre list matching the IDs used by [`movie`].
    pub fn genres() -> Vec<Genre> {
        vec![
            Genre {
                id: 28,
                name: "Ação".to_string(),
            },
            Genre {
                id: 35,
                name: "Comédia".to_string(),
            },
            Genre {
                id: 80,
                name: "Crime".to_string(),
            },
            Genre {
                id: 18,
                name: "Drama".to_string(),
            },
        ]
    }

    pub fn genre_catalog() -> GenreCatalog {
        GenreCatalog::new(genres())
    }
}
