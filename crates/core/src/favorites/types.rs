use serde::{Deserialize, Serialize};

use crate::catalog::{GenreCatalog, Movie};

/// A movie the user marked as favorite.
///
/// Genre names are a snapshot taken when the movie was favorited; they are
/// never re-resolved against later genre lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteMovie {
    pub id: u32,
    pub title: String,
    /// Release year, empty when unknown.
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl FavoriteMovie {
    /// Snapshot a search result, resolving its genres against `genres`.
    pub fn from_movie(movie: &Movie, genres: &GenreCatalog) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            year: movie.year().map(|y| y.to_string()).unwrap_or_default(),
            genres: genres.resolve(&movie.genre_ids),
            poster_path: movie.poster_path.clone(),
        }
    }

    /// Release year as a number, for building detail links.
    pub fn year_number(&self) -> Option<i32> {
        self.year.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_snapshot_from_movie() {
        let movie = fixtures::movie_with_genres(155, "The Dark Knight", vec![18, 999, 28]);
        let favorite = FavoriteMovie::from_movie(&movie, &fixtures::genre_catalog());

        assert_eq!(favorite.id, 155);
        assert_eq!(favorite.year, "2008");
        assert_eq!(favorite.genres, vec!["Drama", "Ação"]);
        assert_eq!(favorite.poster_path.as_deref(), Some("/poster-155.jpg"));
        assert_eq!(favorite.year_number(), Some(2008));
    }

    #[test]
    fn test_unknown_release_date_gives_empty_year() {
        let movie = fixtures::movie(1, "Untitled", "");
        let favorite = FavoriteMovie::from_movie(&movie, &GenreCatalog::default());

        assert_eq!(favorite.year, "");
        assert!(favorite.genres.is_empty());
        assert_eq!(favorite.year_number(), None);
    }

    #[test]
    fn test_serialized_field_names() {
        let favorite = FavoriteMovie {
            id: 1,
            title: "Up".to_string(),
            year: "2009".to_string(),
            genres: vec!["Animação".to_string()],
            poster_path: None,
        };
        let json = serde_json::to_value(&favorite).unwrap();
        assert_eq!(json["poster_path"], serde_json::Value::Null);
        assert_eq!(json["genres"][0], "Animação");
    }
}
