/// Movie data provider abstraction
///
/// This module provides a pluggable architecture for external movie data
/// sources. The catalog and similarity matrix answer recommendation queries on
/// their own; providers add the live data around them (trending feeds, poster
/// and rating cards for display).
use crate::{
    error::AppResult,
    models::{MovieCard, TrendingFeed},
};

pub mod tmdb;

/// Trait for movie data providers
///
/// Providers implement the trending feed and per-title card lookup. Card
/// lookups exist to decorate recommendation results, so the batch method must
/// return one card per requested title, in order, substituting a placeholder
/// card wherever the upstream lookup fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieDataProvider: Send + Sync {
    /// Fetch the provider's current trending movies
    ///
    /// Trending has no local fallback. When the upstream is unreachable the
    /// error propagates so callers can report the feed as unavailable.
    async fn trending(&self) -> AppResult<TrendingFeed>;

    /// Fetch a display card for a single title
    async fn movie_card(&self, title: &str) -> AppResult<MovieCard>;

    /// Fetch display cards for multiple titles in parallel
    ///
    /// Default implementation calls movie_card for each title in parallel.
    /// Failed lookups become placeholder cards rather than errors, keeping the
    /// output aligned with the input titles.
    async fn movie_cards(&self, titles: &[String]) -> Vec<MovieCard> {
        let mut tasks = Vec::new();

        for title in titles {
            let provider = self.clone_for_task();
            let title = title.clone();
            let task = tokio::spawn(async move { provider.movie_card(&title).await });
            tasks.push(task);
        }

        let mut cards = Vec::with_capacity(titles.len());
        let mut failures = 0;

        for (task, title) in tasks.into_iter().zip(titles) {
            match task.await {
                Ok(Ok(card)) => cards.push(card),
                Ok(Err(e)) => {
                    tracing::warn!(
                        error = %e,
                        title = %title,
                        provider = self.name(),
                        "Card fetch failed, using placeholder"
                    );
                    failures += 1;
                    cards.push(MovieCard::fallback(title));
                }
                Err(e) => {
                    tracing::error!(error = %e, title = %title, "Task join error");
                    failures += 1;
                    cards.push(MovieCard::fallback(title));
                }
            }
        }

        if failures > 0 {
            tracing::warn!(
                success_count = cards.len() - failures,
                failure_count = failures,
                "Partial card fetch failure"
            );
        }

        cards
    }

    /// Clone provider for parallel task execution
    ///
    /// Required because providers need to be moved into tokio tasks.
    fn clone_for_task(&self) -> Box<dyn MovieDataProvider>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
