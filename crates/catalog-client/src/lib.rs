//! TMDB movie catalog client.
//!
//! Builds the candidate pool for a recommendation by walking the first few
//! pages of TMDB's `/discover/movie` endpoint for a set of genres, sorted by
//! rating. The pool is the raw concatenation of titles in page order:
//! a title that shows up on two pages is kept twice.
//!
//! A missing API key is a supported deployment mode, not an error: the
//! catalog simply reports no movies.

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use domain::GenreId;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Result pages requested per lookup
pub const PAGES: RangeInclusive<u32> = 1..=3;

/// Minimum vote count for a movie to be considered
pub const MIN_VOTE_COUNT: u32 = 500;

/// Locale of returned titles
pub const LANGUAGE: &str = "ko-KR";

const SORT_BY: &str = "vote_average.desc";

/// Anything that can produce a candidate pool for a set of genres.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Titles of top-rated movies in `genre_ids`. Never fails; an empty list
    /// means nothing usable was found.
    async fn fetch_top_movies_by_genres(&self, genre_ids: &[GenreId]) -> Vec<String>;
}

#[derive(Debug, Deserialize)]
struct DiscoverPage {
    results: Option<Vec<DiscoverMovie>>,
}

#[derive(Debug, Deserialize)]
struct DiscoverMovie {
    title: Option<String>,
}

/// Client for TMDB's discover endpoint.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbClient {
    /// Create a client. A blank `api_key` is treated as absent.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            info!("No TMDB API key configured; catalog lookups will return no movies");
        }

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_page(
        &self,
        api_key: &str,
        genres: &str,
        page: u32,
    ) -> reqwest::Result<DiscoverPage> {
        let url = format!("{}/discover/movie", self.base_url);
        let page = page.to_string();
        let min_votes = MIN_VOTE_COUNT.to_string();

        self.client
            .get(&url)
            .query(&[
                ("api_key", api_key),
                ("with_genres", genres),
                ("sort_by", SORT_BY),
                ("vote_count.gte", min_votes.as_str()),
                ("language", LANGUAGE),
                ("page", page.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<DiscoverPage>()
            .await
    }
}

/// Join genre ids the way TMDB's `with_genres` filter expects them
fn genre_filter(genre_ids: &[GenreId]) -> String {
    genre_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn fetch_top_movies_by_genres(&self, genre_ids: &[GenreId]) -> Vec<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Vec::new();
        };

        let genres = genre_filter(genre_ids);
        let mut titles = Vec::new();

        for page in PAGES {
            let results = match self.fetch_page(api_key, &genres, page).await {
                Ok(DiscoverPage {
                    results: Some(results),
                }) => results,
                Ok(DiscoverPage { results: None }) => {
                    debug!("Page {} for genres {} had no results field", page, genres);
                    continue;
                }
                Err(err) => {
                    warn!("Skipping page {} for genres {}: {}", page, genres, err);
                    continue;
                }
            };

            let before = titles.len();
            titles.extend(results.into_iter().filter_map(|movie| movie.title));
            debug!(
                "Page {} for genres {} added {} titles",
                page,
                genres,
                titles.len() - before
            );
        }

        info!("Collected {} titles for genres {}", titles.len(), genres);
        titles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Page 1 and 3 succeed (with an overlapping title), page 2 fails
    async fn discover(
        State(seen): State<Seen>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let page = params.get("page").cloned().unwrap_or_default();
        seen.lock().unwrap().push(params);

        match page.as_str() {
            "1" => Json(json!({
                "page": 1,
                "results": [{ "title": "기생충" }, { "title": "올드보이" }, { "name": "no title" }]
            }))
            .into_response(),
            "2" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            _ => Json(json!({ "page": 3, "results": [{ "title": "기생충" }] })).into_response(),
        }
    }

    /// Start a mock TMDB service on a random port
    async fn start_mock_service(app: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock TMDB service");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock TMDB service failed");
        });

        (format!("http://{}", addr), handle)
    }

    async fn start_discover_service() -> (String, Seen, tokio::task::JoinHandle<()>) {
        let seen = Seen::default();
        let app = Router::new()
            .route("/discover/movie", get(discover))
            .with_state(seen.clone());
        let (addr, handle) = start_mock_service(app).await;
        (addr, seen, handle)
    }

    #[tokio::test]
    async fn test_collects_titles_across_pages_and_skips_failures() {
        let (addr, seen, handle) = start_discover_service().await;
        let client = TmdbClient::new(Some("key".into()), addr, Duration::from_secs(5)).unwrap();

        let titles = client.fetch_top_movies_by_genres(&[53, 27]).await;

        // Page 2 failed, duplicates across pages are kept, untitled entries dropped
        assert_eq!(titles, vec!["기생충", "올드보이", "기생충"]);
        assert_eq!(seen.lock().unwrap().len(), 3, "all three pages requested");

        handle.abort();
    }

    #[tokio::test]
    async fn test_query_parameters() {
        let (addr, seen, handle) = start_discover_service().await;
        let client = TmdbClient::new(Some("secret".into()), addr, Duration::from_secs(5)).unwrap();

        client.fetch_top_movies_by_genres(&[878, 9648]).await;

        let seen = seen.lock().unwrap();
        let pages: Vec<&str> = seen.iter().map(|p| p["page"].as_str()).collect();
        assert_eq!(pages, vec!["1", "2", "3"]);

        let first = &seen[0];
        assert_eq!(first["api_key"], "secret");
        assert_eq!(first["with_genres"], "878,9648");
        assert_eq!(first["sort_by"], "vote_average.desc");
        assert_eq!(first["vote_count.gte"], "500");
        assert_eq!(first["language"], "ko-KR");

        handle.abort();
    }

    #[tokio::test]
    async fn test_missing_results_field_is_skipped() {
        let app = Router::new().route(
            "/discover/movie",
            get(|| async { Json(json!({ "status_message": "nothing here" })) }),
        );
        let (addr, handle) = start_mock_service(app).await;
        let client = TmdbClient::new(Some("key".into()), addr, Duration::from_secs(5)).unwrap();

        assert!(client.fetch_top_movies_by_genres(&[18]).await.is_empty());

        handle.abort();
    }

    #[tokio::test]
    async fn test_without_api_key_makes_no_requests() {
        let (addr, seen, handle) = start_discover_service().await;

        for key in [None, Some(String::new()), Some("   ".to_string())] {
            let client = TmdbClient::new(key, addr.clone(), Duration::from_secs(5)).unwrap();
            assert!(!client.is_configured());
            assert!(client.fetch_top_movies_by_genres(&[18]).await.is_empty());
        }
        assert!(seen.lock().unwrap().is_empty());

        handle.abort();
    }

    #[test]
    fn test_genre_filter_joins_with_commas() {
        assert_eq!(genre_filter(&[35, 10749]), "35,10749");
        assert_eq!(genre_filter(&[18]), "18");
    }
}
