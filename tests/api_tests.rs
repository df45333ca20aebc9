use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;

use cinematch_api::{
    error::{AppError, AppResult},
    models::{Movie, MovieCard, TrendingEntry, TrendingFeed},
    routes::{create_router, AppState},
    services::providers::MovieDataProvider,
    store::{MovieCatalog, SimilarityMatrix},
};

/// Provider stub with canned data, switchable to a failing trending feed
#[derive(Clone)]
struct StubProvider {
    trending_ok: bool,
}

#[async_trait::async_trait]
impl MovieDataProvider for StubProvider {
    async fn trending(&self) -> AppResult<TrendingFeed> {
        if !self.trending_ok {
            return Err(AppError::ExternalApi(
                "TMDb API returned status 503".to_string(),
            ));
        }

        Ok(TrendingFeed {
            entries: vec![TrendingEntry {
                tmdb_id: 27205,
                title: "Inception".to_string(),
                poster: "https://image.tmdb.org/t/p/w500/inception.jpg".to_string(),
                year: Some(2010),
                rating: Some(8.4),
                overview: Some("A thief who steals corporate secrets.".to_string()),
            }],
            fetched_at: Utc::now(),
        })
    }

    async fn movie_card(&self, title: &str) -> AppResult<MovieCard> {
        Ok(MovieCard {
            title: title.to_string(),
            poster: format!("https://posters.test/{}.jpg", title.to_lowercase()),
            year: Some(2010),
            rating: Some(8.4),
            overview: Some(format!("Overview of {}.", title)),
        })
    }

    fn clone_for_task(&self) -> Box<dyn MovieDataProvider> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn movie(id: u32, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        feature_text: format!("features of {}", title),
        poster_path: Some(format!("/poster-{}.jpg", id)),
    }
}

fn create_test_server(provider: StubProvider) -> TestServer {
    let catalog = MovieCatalog::new(vec![
        movie(1, "Inception"),
        movie(2, "Interstellar"),
        movie(3, "The Dark Knight"),
        movie(4, "Tenet"),
    ])
    .unwrap();

    let similarity = SimilarityMatrix::new(vec![
        vec![1.0, 0.9, 0.7, 0.4],
        vec![0.9, 1.0, 0.5, 0.6],
        vec![0.7, 0.5, 1.0, 0.3],
        vec![0.4, 0.6, 0.3, 1.0],
    ])
    .unwrap();

    let state = AppState::new(catalog, similarity, Arc::new(provider), 5);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn working_server() -> TestServer {
    create_test_server(StubProvider { trending_ok: true })
}

#[tokio::test]
async fn test_health_check() {
    let server = working_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommendations_ranked_by_similarity() {
    let server = working_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Inception")
        .add_query_param("limit", "2")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["query"], "Inception");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Interstellar");
    assert_eq!(results[0]["poster"], "https://image.tmdb.org/t/p/w500/poster-2.jpg");
    assert_eq!(results[1]["title"], "The Dark Knight");
    // Cards only appear when enrichment is requested.
    assert!(results[0]["card"].is_null());
}

#[tokio::test]
async fn test_recommendations_default_limit_covers_catalog() {
    let server = working_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Tenet")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    // Default limit is 5; a four-movie catalog yields the three others.
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["title"], "Interstellar");
}

#[tokio::test]
async fn test_recommendations_resolve_fuzzy_titles() {
    let server = working_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "incepton")
        .add_query_param("limit", "1")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["query"], "Inception");
}

#[tokio::test]
async fn test_recommendations_unknown_title_is_404() {
    let server = working_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "zzzzzzzzzz")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("zzzzzzzzzz"));
}

#[tokio::test]
async fn test_recommendations_zero_limit_is_400() {
    let server = working_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Inception")
        .add_query_param("limit", "0")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_limit_above_cap_is_400() {
    let server = working_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Inception")
        .add_query_param("limit", "51")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_enrich_attaches_cards() {
    let server = working_server();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Inception")
        .add_query_param("limit", "2")
        .add_query_param("enrich", "true")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["card"]["title"], "Interstellar");
    assert_eq!(results[0]["card"]["year"], 2010);
    assert_eq!(results[1]["card"]["title"], "The Dark Knight");
}

#[tokio::test]
async fn test_trending_feed() {
    let server = working_server();

    let response = server.get("/api/v1/trending").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Inception");
    assert_eq!(entries[0]["tmdb_id"], 27205);
}

#[tokio::test]
async fn test_trending_upstream_down_is_502() {
    let server = create_test_server(StubProvider { trending_ok: false });

    let response = server.get("/api/v1/trending").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_title_search_ranks_matches() {
    let server = working_server();

    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "incep")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["query"], "incep");

    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["title"], "Inception");
    assert!(matches[0]["score"].as_f64().unwrap() >= 0.5);
}

#[tokio::test]
async fn test_title_search_empty_query_is_400() {
    let server = working_server();

    let response = server
        .get("/api/v1/titles/search")
        .add_query_param("q", "")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_title_card_endpoint() {
    let server = working_server();

    let response = server
        .get("/api/v1/titles/card")
        .add_query_param("title", "Inception")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Inception");
    assert_eq!(body["year"], 2010);
}

#[tokio::test]
async fn test_request_id_header_is_echoed() {
    let server = working_server();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("550e8400-e29b-41d4-a716-446655440000"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "550e8400-e29b-41d4-a716-446655440000"
    );
}

#[tokio::test]
async fn test_request_id_generated_when_absent() {
    let server = working_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let header = response.headers().get("x-request-id").unwrap();
    assert!(!header.to_str().unwrap().is_empty());
}
