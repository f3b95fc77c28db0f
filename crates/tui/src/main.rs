mod app;
mod input;
mod opener;
mod theme;
mod ui;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moviefinder_core::{
    load_default_config, validate_config, CachedCatalog, Config, DetailLinks, FavoritesStore,
    GenreCache, KeyValueStore, MovieCatalog, SanitizedConfig, SearchController, SearchDriver,
    SqliteKeyValueStore, TmdbClient,
};

use app::{TuiApp, TuiConfig};
use opener::SystemLinkOpener;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        // The log file may not exist yet
        eprintln!("moviefinder: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let (config, config_path) = load_default_config().context("Failed to load configuration")?;

    init_logging(&config)?;

    match &config_path {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => info!("No configuration file, using defaults and environment"),
    }

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );
    info!("Starting moviefinder v{}", VERSION);

    // Catalog stack: TMDB behind the result cache
    let tmdb: Arc<dyn MovieCatalog> = Arc::new(
        TmdbClient::new(config.tmdb.clone()).context("Failed to create TMDB client")?,
    );
    let catalog: Arc<dyn MovieCatalog> =
        Arc::new(CachedCatalog::new(tmdb, &config.search.cache()));
    let genres = Arc::new(GenreCache::new(Arc::clone(&catalog)));
    let links = Arc::new(DetailLinks::new(
        Arc::clone(&catalog),
        config.links.cache_capacity,
    ));

    // Favorites
    info!("Favorites database: {:?}", config.favorites.path);
    let storage: Arc<dyn KeyValueStore> = Arc::new(
        SqliteKeyValueStore::new(&config.favorites.path)
            .context("Failed to open favorites database")?,
    );
    let favorites = Arc::new(FavoritesStore::open(storage));
    info!("Loaded {} favorites", favorites.len());

    let controller = SearchController::new(favorites, config.search.debounce());
    let mut driver = SearchDriver::new(
        controller,
        catalog,
        genres,
        links,
        Arc::new(SystemLinkOpener::new()),
    );
    driver.load_genres();

    let app = TuiApp::new(driver, TuiConfig::default()).context("Failed to start terminal")?;
    app.run().await.context("Terminal UI failed")?;

    info!("Shutdown complete");
    Ok(())
}

/// Logs go to a file; the terminal is drawn by the UI.
fn init_logging(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.logging.path)
        .with_context(|| format!("Failed to open log file {:?}", config.logging.path))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
