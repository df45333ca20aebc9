use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::providers::MovieDataProvider,
    store::{MovieCatalog, SimilarityMatrix},
};

pub mod recommendations;
pub mod titles;
pub mod trending;

/// Shared application state
///
/// The catalog and similarity matrix are immutable once loaded, so handlers
/// share them through plain `Arc`s with no locking.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<MovieCatalog>,
    pub similarity: Arc<SimilarityMatrix>,
    pub provider: Arc<dyn MovieDataProvider>,
    pub default_recommendations: usize,
}

impl AppState {
    pub fn new(
        catalog: MovieCatalog,
        similarity: SimilarityMatrix,
        provider: Arc<dyn MovieDataProvider>,
        default_recommendations: usize,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            similarity: Arc::new(similarity),
            provider,
            default_recommendations,
        }
    }
}

/// Creates the application router with all routes
///
/// The request-id layer sits outermost so the trace span below it can pick
/// the ID out of the request extensions.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", get(recommendations::recommend))
        .route("/trending", get(trending::trending))
        .route("/titles/search", get(titles::search))
        .route("/titles/card", get(titles::card))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
