//! TMDB (The Movie Database) API client.
//!
//! TMDB accepts either a v3 API key (query parameter) or a v4 read token
//! (bearer header); both are sent when configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{Genre, MoviePage};
use super::{CatalogError, MovieCatalog};

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB v3 API key.
    #[serde(default)]
    pub api_key: String,
    /// TMDB v4 read access token.
    #[serde(default)]
    pub api_token: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Language passed through to every request.
    #[serde(default = "default_language")]
    pub language: String,
    /// Region passed through to every request.
    #[serde(default = "default_region")]
    pub region: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "pt-BR".to_string()
}

fn default_region() -> String {
    "BR".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_token: String::new(),
            base_url: default_base_url(),
            language: default_language(),
            region: default_region(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TmdbConfig {
    /// Whether any credential is configured.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() || !self.api_token.trim().is_empty()
    }
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_token: String,
    language: String,
    region: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        if !config.has_credentials() {
            return Err(CatalogError::NotConfigured(
                "TMDB API key or token is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            api_token: config.api_token,
            language: config.language,
            region: config.region,
        })
    }

    /// GET request with the shared credentials and locale parameters applied.
    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.get(&url).query(&[
            ("language", self.language.as_str()),
            ("region", self.region.as_str()),
        ]);

        if !self.api_key.is_empty() {
            request = request.query(&[("api_key", self.api_key.as_str())]);
        }
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }

        request
    }

    /// Map non-success statuses to catalog errors.
    async fn check_status(response: Response, what: &str) -> Result<Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => CatalogError::Authentication(body),
            StatusCode::FORBIDDEN => CatalogError::Authorization(body),
            StatusCode::NOT_FOUND => CatalogError::NotFound(what.to_string()),
            StatusCode::TOO_MANY_REQUESTS => CatalogError::RateLimitExceeded,
            _ => CatalogError::Http {
                status: status.as_u16(),
                message: body,
            },
        })
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(MoviePage::empty());
        }

        debug!("TMDB movie search: query='{}', page={}", query, page);

        let page = page.to_string();
        let response = self
            .get("/search/movie")
            .query(&[
                ("query", query),
                ("page", page.as_str()),
                ("include_adult", "false"),
            ])
            .send()
            .await?;

        let response = Self::check_status(response, "movie search").await?;

        response.json::<MoviePage>().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse movie search response: {}", e))
        })
    }

    async fn get_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        debug!("TMDB genre list");

        let response = self.get("/genre/movie/list").send().await?;
        let response = Self::check_status(response, "genre list").await?;

        let list: TmdbGenreList = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse genre list response: {}", e))
        })?;

        Ok(list.genres)
    }

    async fn get_external_id(&self, movie_id: u32) -> Result<Option<String>, CatalogError> {
        debug!("TMDB external ids: id={}", movie_id);

        let response = self
            .get(&format!("/movie/{}/external_ids", movie_id))
            .send()
            .await?;
        let response = Self::check_status(response, &format!("Movie ID {}", movie_id)).await?;

        let ids: TmdbExternalIds = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse external ids response: {}", e))
        })?;

        Ok(ids.imdb_id.filter(|id| !id.is_empty()))
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbGenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct TmdbExternalIds {
    imdb_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config_for(server: &mockito::ServerGuard) -> TmdbConfig {
        TmdbConfig {
            api_key: "test-key".to_string(),
            api_token: "test-token".to_string(),
            base_url: server.url(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_requires_credentials() {
        let result = TmdbClient::new(TmdbConfig::default());
        assert!(matches!(result, Err(CatalogError::NotConfigured(_))));
    }

    #[test]
    fn test_token_alone_is_enough() {
        let config = TmdbConfig {
            api_token: "token".to_string(),
            ..Default::default()
        };
        assert!(TmdbClient::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_search_movies_sends_locale_and_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "bat man".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("include_adult".into(), "false".into()),
                Matcher::UrlEncoded("language".into(), "pt-BR".into()),
                Matcher::UrlEncoded("region".into(), "BR".into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            ]))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"page": 2, "total_pages": 3, "total_results": 45,
                    "results": [{"id": 268, "title": "Batman", "release_date": "1989-06-23",
                                 "genre_ids": [14, 28], "overview": "", "vote_average": 7.2,
                                 "poster_path": "/p.jpg", "backdrop_path": null}]}"#,
            )
            .create_async()
            .await;

        let client = TmdbClient::new(config_for(&server)).unwrap();
        let page = client.search_movies("  bat man ", 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.page, 2);
        assert_eq!(page.total_results, 45);
        assert_eq!(page.results[0].title, "Batman");
        assert_eq!(page.results[0].year(), Some(1989));
    }

    #[tokio::test]
    async fn test_blank_query_skips_request() {
        let server = mockito::Server::new_async().await;
        let client = TmdbClient::new(config_for(&server)).unwrap();

        let page = client.search_movies("   ", 1).await.unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total_results, 0);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        let client = TmdbClient::new(config_for(&server)).unwrap();

        let _m401 = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"status_message": "Invalid API key"}"#)
            .create_async()
            .await;
        let result = client.search_movies("x", 1).await;
        assert!(matches!(result, Err(CatalogError::Authentication(_))));

        let _m403 = server
            .mock("GET", "/genre/movie/list")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;
        let result = client.get_genres().await;
        assert!(matches!(result, Err(CatalogError::Authorization(_))));

        let _m500 = server
            .mock("GET", "/movie/1/external_ids")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;
        let result = client.get_external_id(1).await;
        assert!(matches!(
            result,
            Err(CatalogError::Http { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Grab a free port, then close it so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = TmdbClient::new(TmdbConfig {
            api_key: "test-key".to_string(),
            base_url: format!("http://127.0.0.1:{}", port),
            ..Default::default()
        })
        .unwrap();

        let result = client.search_movies("batman", 1).await;
        assert!(matches!(result, Err(CatalogError::Network(_))));

        let message = result.unwrap_err().user_message();
        assert!(message.starts_with("Erro de conexão"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_distinguished() {
        let mut server = mockito::Server::new_async().await;
        let client = TmdbClient::new(config_for(&server)).unwrap();

        let _m429 = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;
        let result = client.search_movies("x", 1).await;
        assert!(matches!(result, Err(CatalogError::RateLimitExceeded)));
    }

    #[tokio::test]
    async fn test_get_external_id() {
        let mut server = mockito::Server::new_async().await;
        let _found = server
            .mock("GET", "/movie/268/external_ids")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": 268, "imdb_id": "tt0096895"}"#)
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/movie/5/external_ids")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": 5, "imdb_id": null}"#)
            .create_async()
            .await;

        let client = TmdbClient::new(config_for(&server)).unwrap();
        assert_eq!(
            client.get_external_id(268).await.unwrap().as_deref(),
            Some("tt0096895")
        );
        assert_eq!(client.get_external_id(5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_genres() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/genre/movie/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"genres": [{"id": 28, "name": "Ação"}, {"id": 35, "name": "Comédia"}]}"#)
            .create_async()
            .await;

        let client = TmdbClient::new(config_for(&server)).unwrap();
        let genres = client.get_genres().await.unwrap();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[1].name, "Comédia");
    }
}
