use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelgate::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache, FileStore, MemoryStore, SharedStore},
    services::providers::TmdbProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "reelgate=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: SharedStore = match &config.data_dir {
        Some(dir) => {
            tracing::info!(data_dir = %dir.display(), "Using file-backed profile store");
            Arc::new(FileStore::open(dir)?)
        }
        None => {
            tracing::warn!("DATA_DIR not set; profiles will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let (cache, cache_handle) = match &config.redis_url {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?);
            tracing::info!("Catalog cache enabled");
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let provider = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        cache,
    );

    let state = AppState::new(
        store,
        Arc::new(provider),
        config.content_policy(),
        config.max_pin_attempts,
    )?;

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
