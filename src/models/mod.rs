use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base URL for TMDB poster images (w500 rendition)
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Poster shown when TMDB has no artwork for a title
pub const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/450x650?text=No+Poster";

/// A movie in the precomputed catalog
///
/// `feature_text` is the combined genres/cast/crew/keywords string the offline
/// pipeline vectorized to build the similarity matrix. It is carried through
/// so the catalog remains self-describing, but the service never re-derives
/// scores from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Upstream (TMDB) identifier for the movie
    pub id: u32,
    pub title: String,
    pub feature_text: String,
    /// Poster reference relative to the image base, when known at build time
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl Movie {
    /// Full poster URL for this movie, falling back to the placeholder
    pub fn poster_url(&self) -> String {
        poster_url_for_path(self.poster_path.as_deref())
    }
}

/// Builds a full poster URL from an optional TMDB poster path
pub fn poster_url_for_path(path: Option<&str>) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{}{}", POSTER_BASE_URL, p),
        _ => POSTER_PLACEHOLDER.to_string(),
    }
}

/// One ranked entry returned by the recommendation lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedMovie {
    pub title: String,
    /// Poster resolved from the catalog (placeholder when the catalog has none)
    pub poster: String,
    pub score: f32,
    /// TMDB-enriched display card, present only when enrichment was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<MovieCard>,
}

/// Response body for the recommendations endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    /// The catalog title the query resolved to
    pub query: String,
    pub results: Vec<RecommendedMovie>,
}

/// One catalog title matched by a fuzzy search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleMatch {
    pub title: String,
    /// Similarity ratio against the query, in [0, 1]
    pub score: f64,
}

/// Response body for the title search endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TitleSearchResponse {
    pub query: String,
    pub matches: Vec<TitleMatch>,
}

/// Display card for a single title, enriched from TMDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCard {
    pub title: String,
    pub poster: String,
    pub year: Option<i32>,
    pub rating: Option<f32>,
    pub overview: Option<String>,
}

impl MovieCard {
    /// Card served when TMDB has no result for a title or the fetch failed
    pub fn fallback(title: &str) -> Self {
        Self {
            title: title.to_string(),
            poster: POSTER_PLACEHOLDER.to_string(),
            year: None,
            rating: None,
            overview: None,
        }
    }

    /// Builds a card from a TMDB search result, keeping the queried title
    /// when the result carries none
    pub fn from_search(query: &str, movie: TmdbMovie) -> Self {
        let title = movie
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| query.to_string());

        Self {
            title,
            poster: poster_url_for_path(movie.poster_path.as_deref()),
            year: movie.release_year(),
            rating: movie.vote_average,
            overview: movie.overview,
        }
    }
}

/// One entry of the weekly trending feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub tmdb_id: u64,
    pub title: String,
    pub poster: String,
    pub year: Option<i32>,
    pub rating: Option<f32>,
    pub overview: Option<String>,
}

impl From<TmdbMovie> for TrendingEntry {
    fn from(movie: TmdbMovie) -> Self {
        let year = movie.release_year();

        Self {
            tmdb_id: movie.id,
            title: movie
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            poster: poster_url_for_path(movie.poster_path.as_deref()),
            year,
            rating: movie.vote_average,
            overview: movie.overview,
        }
    }
}

/// The trending feed with the time it was fetched from TMDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingFeed {
    pub entries: Vec<TrendingEntry>,
    pub fetched_at: DateTime<Utc>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of results, as returned by both /search/movie and /trending
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbResultsPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// A movie object from the TMDB API
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl TmdbMovie {
    /// Year component of `release_date` ("2010-07-16" -> 2010)
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }
}
