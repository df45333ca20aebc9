use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{MovieCard, TitleMatch, TitleSearchResponse},
    routes::AppState,
    services::title_match,
};

const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CardQuery {
    title: String,
}

/// Handler for the title search endpoint
///
/// Fuzzy-matches the query against catalog titles and returns the ranked
/// matches above the cutoff.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<TitleSearchResponse>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let matches: Vec<TitleMatch> =
        title_match::ranked_matches(&params.q, state.catalog.titles(), limit)
            .into_iter()
            .map(|(title, score)| TitleMatch {
                title: title.to_string(),
                score,
            })
            .collect();

    Ok(Json(TitleSearchResponse {
        query: params.q,
        matches,
    }))
}

/// Handler for the movie card endpoint
///
/// Looks up a display card for any title, catalog or not. The provider
/// degrades upstream failures to a placeholder card itself.
pub async fn card(
    State(state): State<AppState>,
    Query(params): Query<CardQuery>,
) -> AppResult<Json<MovieCard>> {
    if params.title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Card title cannot be empty".to_string(),
        ));
    }

    let card = state.provider.movie_card(&params.title).await?;
    Ok(Json(card))
}
