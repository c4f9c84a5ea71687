use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fuel_server::cache::DiskCache;
use fuel_server::config::Config;
use fuel_server::feed::{BrandFilter, FeedClient, FeedClientConfig};
use fuel_server::store::{DataStore, DataStoreConfig, RefreshOutcome};
use fuel_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fuel_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let mut client_config = FeedClientConfig::new().with_url(&config.feed_url);
    if let Some(timeout) = config.feed_timeout {
        client_config = client_config.with_timeout(timeout);
    }
    let client = FeedClient::new(client_config)?;

    let cache = Arc::new(DiskCache::new(&config.cache_path));
    let store = Arc::new(DataStore::new(
        client,
        cache,
        DataStoreConfig {
            ttl: config.cache_ttl,
            brand: BrandFilter::new(&config.brand),
        },
    ));

    // Render from cache straight away; the first revalidation runs alongside.
    let initial = store.load().await;
    tokio::spawn(async move {
        match initial.await {
            Ok(outcome) => log_outcome(&outcome),
            Err(e) => error!(error = %e, "initial refresh task failed"),
        }
    });

    let refresh_store = Arc::clone(&store);
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            log_outcome(&refresh_store.refresh().await);
        }
    });

    let state = AppState::new(store, &config.brand);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        brand = %config.brand,
        cache = %config.cache_path.display(),
        "fuel station map listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn log_outcome(outcome: &RefreshOutcome) {
    match outcome {
        RefreshOutcome::Fetched { stations } => info!(stations, "stations refreshed"),
        RefreshOutcome::FellBack { stations, error } => {
            warn!(stations, %error, "feed unavailable, serving cached stations")
        }
        RefreshOutcome::Failed { error } => error!(%error, "feed unavailable and no cache"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
