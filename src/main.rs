use std::sync::Arc;

use cinematch_api::{
    cache::{create_redis_client, Cache},
    config::Config,
    routes::{create_router, AppState},
    services::providers::tmdb::TmdbProvider,
    store::load_store,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // The loader validates both artifacts; a bad catalog or matrix stops the
    // server here instead of surfacing as 500s later.
    let (catalog, similarity) = load_store(&config.catalog_path, &config.similarity_path)?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let provider = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.trending_cache_ttl_secs,
    ));

    let state = AppState::new(catalog, similarity, provider, config.default_recommendations);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain queued cache writes before the process exits.
    cache_writer.shutdown().await;

    Ok(())
}

/// Resolves when the process receives Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
