use axum::{extract::State, Json};

use crate::{error::AppResult, models::TrendingFeed, routes::AppState};

/// Handler for the trending feed endpoint
///
/// Serves whatever the provider returns, cached or fresh. Provider errors
/// propagate and surface as an upstream-unavailable response.
pub async fn trending(State(state): State<AppState>) -> AppResult<Json<TrendingFeed>> {
    let feed = state.provider.trending().await?;
    Ok(Json(feed))
}
