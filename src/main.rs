use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streamly_api::{
    config::Config,
    db::{self, Cache, CacheWriterHandle, InMemoryCatalogStore, PgCatalogStore},
    routes::{create_router, AppState},
    services::{CachedCatalogStore, CatalogStore, ScoringModel},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamly_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let cache = match &config.redis_url {
        Some(url) => {
            let client = db::create_redis_client(url)?;
            tracing::info!("Redis cache enabled");
            Some(Cache::new(client))
        }
        None => None,
    };
    let (cache, cache_handle) = match cache {
        Some((cache, handle)) => (Some(cache), Some(handle)),
        None => (None, None),
    };

    let store = build_store(&config, cache).await?;
    tracing::info!(store = store.name(), "Catalog store ready");

    let scoring = ScoringModel::new(config.scoring_year());
    let state = Arc::new(AppState::new(store, scoring));
    tracing::info!(
        current_year = state.engine.scoring().current_year(),
        "Recency scores anchored"
    );
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_cache(cache_handle).await;
    Ok(())
}

/// Picks the backing store and wraps it with the cache when one is configured
async fn build_store(config: &Config, cache: Option<Cache>) -> anyhow::Result<Arc<dyn CatalogStore>> {
    if let Some(path) = &config.catalog_file {
        let store = InMemoryCatalogStore::from_json_file(path).await?;
        return Ok(with_cache(store, cache, config.cache_ttl_secs));
    }

    let pool = db::create_pool(&config.database_url, config.max_connections).await?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    Ok(with_cache(
        PgCatalogStore::new(pool),
        cache,
        config.cache_ttl_secs,
    ))
}

fn with_cache<S>(store: S, cache: Option<Cache>, ttl: u64) -> Arc<dyn CatalogStore>
where
    S: CatalogStore + 'static,
{
    match cache {
        Some(cache) => Arc::new(CachedCatalogStore::new(store, cache, ttl)),
        None => Arc::new(store),
    }
}

async fn shutdown_cache(handle: Option<CacheWriterHandle>) {
    if let Some(handle) = handle {
        handle.shutdown().await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
