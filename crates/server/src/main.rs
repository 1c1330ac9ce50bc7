use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::{
    load_config, open_store, validate_config, CatalogIngestor, CatalogSource, ContentLibrary,
    DurableCache, FavoritesStore, ProviderCountAggregator, SystemClock, TmdbClient,
    PROVIDER_COUNTS_NAMESPACE,
};
use marquee_server::api::create_router;
use marquee_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MARQUEE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");

    // Create the durable store shared by provider counts and favorites
    let store = open_store(&config.cache).context("Failed to open cache store")?;

    // Create TMDB client
    let source: Arc<dyn CatalogSource> = Arc::new(
        TmdbClient::new(config.tmdb.clone()).context("Failed to create TMDB client")?,
    );
    info!(
        "TMDB client initialized (language: {}, region: {})",
        config.tmdb.language, config.tmdb.region
    );

    // Provider count aggregator
    let counts_cache = Arc::new(DurableCache::new(
        Arc::clone(&store),
        PROVIDER_COUNTS_NAMESPACE,
        config.cache.ttl(),
        Arc::new(SystemClock),
    ));
    let providers = Arc::new(ProviderCountAggregator::new(
        Arc::clone(&source),
        counts_cache,
        &config.providers,
    ));
    info!(
        "Provider aggregator initialized (concurrency: {}, default region: {})",
        config.providers.concurrency, config.providers.default_region
    );

    // Content library
    let ingestor = CatalogIngestor::new(Arc::clone(&source), &config.ingest);
    info!(
        "Catalog ingestion: up to {} pages per content type",
        ingestor.max_pages()
    );
    let library = Arc::new(ContentLibrary::new(ingestor));

    // Favorites
    let favorites = Arc::new(FavoritesStore::new(Arc::clone(&store)));
    info!("Loaded {} favorites", favorites.count());

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), library, providers, favorites));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
