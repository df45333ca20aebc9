use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult, models::RecommendationResponse, routes::AppState, services::recommend,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    title: String,
    limit: Option<usize>,
    #[serde(default)]
    enrich: bool,
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let limit = params.limit.unwrap_or(state.default_recommendations);

    let response = recommend::get_recommendations(
        &state.catalog,
        &state.similarity,
        state.provider.clone(),
        &params.title,
        limit,
        params.enrich,
    )
    .await?;

    Ok(Json(response))
}
