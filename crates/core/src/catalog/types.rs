//! Types for movie catalog responses.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Base URL for TMDB poster and backdrop images.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// A movie as returned by catalog searches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Catalog movie ID.
    pub id: u32,
    /// Localized title.
    pub title: String,
    /// Poster path (relative to the image base URL).
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date (YYYY-MM-DD), empty when unknown.
    #[serde(default)]
    pub release_date: String,
    /// Genre IDs, resolved against a [`GenreCatalog`].
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Synopsis.
    #[serde(default)]
    pub overview: String,
    /// Average vote (0-10).
    #[serde(default)]
    pub vote_average: f32,
    /// Backdrop path (relative to the image base URL).
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl Movie {
    /// Release year, if the release date is a valid date.
    pub fn year(&self) -> Option<i32> {
        NaiveDate::parse_from_str(self.release_date.trim(), "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    /// Page number (1-indexed).
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl MoviePage {
    /// An empty first page, used for blank queries.
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: vec![],
            total_pages: 0,
            total_results: 0,
        }
    }
}

/// A movie genre.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// The genre list used to turn genre IDs into names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreCatalog {
    genres: Vec<Genre>,
}

impl GenreCatalog {
    pub fn new(genres: Vec<Genre>) -> Self {
        Self { genres }
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    /// Name of a single genre.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.genres
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.as_str())
    }

    /// Resolve genre IDs to names, keeping the ID order and skipping unknown IDs.
    pub fn resolve(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.name(*id))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Build a full image URL for a poster or backdrop path.
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    match path {
        Some(p) if !p.is_empty() => Some(format!("{}/{}{}", IMAGE_BASE_URL, size, p)),
        _ => None,
    }
}
