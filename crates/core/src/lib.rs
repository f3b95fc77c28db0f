pub mod catalog;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod favorites;
pub mod navigation;
pub mod search;
pub mod testing;
pub mod view;

pub use catalog::{
    CachedCatalog, CatalogError, DetailLinks, FallbackLink, Genre, GenreCache, GenreCatalog,
    Movie, MovieCatalog, MoviePage, SearchCacheConfig, TmdbClient, TmdbConfig,
};
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config, ConfigError,
    SanitizedConfig,
};
pub use controller::{
    Completion, DriverEvent, Effect, Key, KeyOutcome, ScrollMetrics, SearchController,
    SearchDriver, VisibleItem,
};
pub use debounce::{debounced, Debouncer};
pub use favorites::{
    FavoriteMovie, FavoritesError, FavoritesStore, KeyValueStore, MemoryKeyValueStore,
    SqliteKeyValueStore, StorageError, SubscriptionId,
};
pub use navigation::{LinkOpener, NavigationError};
pub use search::{PageRequest, PageResponse, SearchSession, MAX_PAGES};
pub use view::{ItemView, ViewModel};
