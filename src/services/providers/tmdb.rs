/// TMDb API provider
///
/// Backs the trending feed and display cards with The Movie Database.
///
/// API Flow:
/// 1. Trending: /trending/movie/week → one page of movie summaries
/// 2. Cards: /search/movie?query=<title> → first match becomes the card
///
/// Card lookups retry transient failures and fall back to a placeholder card,
/// so decorating results never takes a request down with it. Trending has no
/// meaningful fallback and propagates its errors.
use crate::{
    cache::{Cache, CacheKey},
    cached,
    error::{AppError, AppResult},
    models::{MovieCard, TmdbMovie, TmdbResultsPage, TrendingEntry, TrendingFeed},
    services::providers::MovieDataProvider,
};
use chrono::Utc;
use reqwest::Client as HttpClient;
use std::time::Duration;

const CARD_CACHE_TTL: u64 = 604800; // 1 week

const TRENDING_TIMEOUT: Duration = Duration::from_secs(15);
const CARD_TIMEOUT: Duration = Duration::from_secs(10);
const CARD_ATTEMPTS: u32 = 3;
const CARD_RETRY_PAUSE: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
    trending_ttl: u64,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, trending_ttl: u64) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
            trending_ttl,
        }
    }

    /// Fetches the weekly trending page from TMDb
    async fn fetch_trending(&self) -> AppResult<TrendingFeed> {
        let url = format!("{}/trending/movie/week", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .timeout(TRENDING_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDb API returned status {}: {}",
                status, body
            )));
        }

        let page: TmdbResultsPage = response.json().await?;
        let entries: Vec<TrendingEntry> =
            page.results.into_iter().map(TrendingEntry::from).collect();

        tracing::info!(
            entries = entries.len(),
            provider = "tmdb",
            "Trending feed fetched"
        );

        Ok(TrendingFeed {
            entries,
            fetched_at: Utc::now(),
        })
    }

    /// Searches TMDb for a title, returning the first match if any
    async fn search_movie(&self, title: &str) -> AppResult<Option<TmdbMovie>> {
        let url = format!("{}/search/movie", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .timeout(CARD_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDb API returned status {}: {}",
                status, body
            )));
        }

        let page: TmdbResultsPage = response.json().await?;
        Ok(page.results.into_iter().next())
    }

    /// Searches with retries, pausing between attempts
    ///
    /// An empty result page is an answer, not a failure, and returns
    /// immediately without retrying.
    async fn search_movie_with_retry(&self, title: &str) -> AppResult<Option<TmdbMovie>> {
        let mut last_error = None;

        for attempt in 1..=CARD_ATTEMPTS {
            match self.search_movie(title).await {
                Ok(found) => return Ok(found),
                Err(e) => {
                    tracing::warn!(error = %e, title = %title, attempt, "TMDb search attempt failed");
                    last_error = Some(e);
                    if attempt < CARD_ATTEMPTS {
                        tokio::time::sleep(CARD_RETRY_PAUSE).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::ExternalApi("TMDb search failed".to_string())))
    }
}

#[async_trait::async_trait]
impl MovieDataProvider for TmdbProvider {
    async fn trending(&self) -> AppResult<TrendingFeed> {
        cached!(
            self.cache,
            CacheKey::Trending,
            self.trending_ttl,
            self.fetch_trending()
        )
    }

    /// Never fails: upstream errors degrade to a placeholder card
    ///
    /// Successful lookups are cached for a week, and so is "TMDb has no record
    /// of this title" since that answer is just as stable. Transient failures
    /// are served as placeholders but left uncached so the next request tries
    /// again.
    async fn movie_card(&self, title: &str) -> AppResult<MovieCard> {
        let key = CacheKey::MovieCard(title.to_string());

        if let Some(card) = self.cache.get_from_cache(&key).await {
            return Ok(card);
        }

        match self.search_movie_with_retry(title).await {
            Ok(Some(movie)) => {
                let card = MovieCard::from_search(title, movie);
                self.cache.set_in_background(&key, &card, CARD_CACHE_TTL);
                Ok(card)
            }
            Ok(None) => {
                let card = MovieCard::fallback(title);
                self.cache.set_in_background(&key, &card, CARD_CACHE_TTL);
                Ok(card)
            }
            Err(e) => {
                tracing::warn!(error = %e, title = %title, "Detail lookup failed, serving placeholder card");
                Ok(MovieCard::fallback(title))
            }
        }
    }

    fn clone_for_task(&self) -> Box<dyn MovieDataProvider> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    use crate::cache::create_redis_client;
    use crate::models::POSTER_PLACEHOLDER;

    // Nothing listens on port 1, so every request and cache lookup fails fast.
    async fn create_unreachable_provider() -> TmdbProvider {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client).await;

        TmdbProvider::new(
            cache,
            "test_key".to_string(),
            "http://127.0.0.1:1".to_string(),
            3600,
        )
    }

    #[tokio::test]
    async fn test_trending_failure_surfaces_as_error() {
        let provider = create_unreachable_provider().await;

        let result = provider.trending().await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_movie_card_falls_back_when_unreachable() {
        let provider = create_unreachable_provider().await;

        let card = assert_ok!(provider.movie_card("Inception").await);

        assert_eq!(card.title, "Inception");
        assert_eq!(card.poster, POSTER_PLACEHOLDER);
        assert_eq!(card.year, None);
        assert_eq!(card.rating, None);
    }

    // Serves an empty search result page on a random local port.
    async fn spawn_empty_search_stub() -> String {
        let app = axum::Router::new().route(
            "/search/movie",
            axum::routing::get(|| async {
                axum::Json(serde_json::json!({ "page": 1, "results": [] }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_movie_card_empty_search_result_is_fallback() {
        let api_url = spawn_empty_search_stub().await;
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client).await;
        let provider = TmdbProvider::new(cache, "test_key".to_string(), api_url, 3600);

        // An empty result page is an answer, so no retries happen and the
        // fallback card comes back on the first attempt.
        let card = assert_ok!(provider.movie_card("Ghost Title").await);

        assert_eq!(card.title, "Ghost Title");
        assert_eq!(card.poster, POSTER_PLACEHOLDER);
        assert_eq!(card.rating, None);
    }

    #[test]
    fn test_trending_page_deserialization() {
        // Trimmed from a real /trending/movie/week response; unknown fields
        // like media_type and genre_ids must not break parsing.
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "adult": false,
                    "backdrop_path": "/xl5oCFLVMo4d4Yu8KVLr9CSMaxZ.jpg",
                    "id": 1022789,
                    "title": "Inside Out 2",
                    "original_language": "en",
                    "overview": "Teenager Riley's mind headquarters is undergoing a sudden demolition.",
                    "poster_path": "/vpnVM9B6NMmQpWeZvzLvDESb2QY.jpg",
                    "media_type": "movie",
                    "genre_ids": [16, 10751],
                    "release_date": "2024-06-11",
                    "vote_average": 7.6,
                    "vote_count": 2587
                }
            ],
            "total_pages": 1000,
            "total_results": 20000
        }"#;

        let page: TmdbResultsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);

        let entry = TrendingEntry::from(page.results.into_iter().next().unwrap());
        assert_eq!(entry.tmdb_id, 1022789);
        assert_eq!(entry.title, "Inside Out 2");
        assert_eq!(entry.year, Some(2024));
        assert_eq!(entry.rating, Some(7.6));
    }
}
