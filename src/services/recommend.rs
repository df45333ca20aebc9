use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{RecommendationResponse, RecommendedMovie},
    services::{providers::MovieDataProvider, title_match},
    store::{MovieCatalog, SimilarityMatrix},
};

/// Most results a single request may ask for
pub const MAX_RECOMMENDATIONS: usize = 50;

/// Resolves a free-text title to a catalog row index
///
/// Tries an exact case-insensitive lookup first, then falls back to fuzzy
/// matching over every catalog title.
pub fn resolve_title(catalog: &MovieCatalog, query: &str) -> AppResult<usize> {
    if let Some(index) = catalog.index_of_title(query) {
        return Ok(index);
    }

    title_match::best_match(query, catalog.titles())
        .and_then(|title| catalog.index_of_title(title))
        .ok_or_else(|| {
            AppError::NotFound(format!("No movie matching \"{}\" in the catalog", query))
        })
}

/// Generates recommendations for a movie title
///
/// Resolves the title to a catalog row, ranks every other movie by descending
/// similarity, and returns the top `limit` of them with posters resolved from
/// the catalog. With `enrich` set, each result also carries a display card
/// fetched from the provider; card failures degrade to placeholders inside the
/// batch fetch, so enrichment never fails the request.
pub async fn get_recommendations(
    catalog: &MovieCatalog,
    similarity: &SimilarityMatrix,
    provider: Arc<dyn MovieDataProvider>,
    query: &str,
    limit: usize,
    enrich: bool,
) -> AppResult<RecommendationResponse> {
    if limit == 0 || limit > MAX_RECOMMENDATIONS {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_RECOMMENDATIONS
        )));
    }

    let index = resolve_title(catalog, query)?;
    let movies = catalog.movies();
    let resolved = movies[index].title.clone();

    let mut results: Vec<RecommendedMovie> = similarity
        .neighbors(index, limit)
        .into_iter()
        .map(|(neighbor, score)| {
            let movie = &movies[neighbor];
            RecommendedMovie {
                title: movie.title.clone(),
                poster: movie.poster_url(),
                score,
                card: None,
            }
        })
        .collect();

    if enrich {
        let titles: Vec<String> = results.iter().map(|r| r.title.clone()).collect();
        let cards = provider.movie_cards(&titles).await;
        for (result, card) in results.iter_mut().zip(cards) {
            result.card = Some(card);
        }
    }

    tracing::info!(
        query = %query,
        resolved = %resolved,
        results = results.len(),
        enrich,
        "Recommendations generated"
    );

    Ok(RecommendationResponse {
        query: resolved,
        results,
    })
}
