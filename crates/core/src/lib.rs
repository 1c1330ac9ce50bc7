pub mod cache;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod filters;
pub mod inflight;
pub mod ingest;
pub mod library;
pub mod metrics;
pub mod providers;
pub mod query;
pub mod testing;
pub mod tmdb;

pub use cache::{
    open_store, CacheEntry, CacheError, CacheStore, Clock, DurableCache, MemoryCacheStore,
    SqliteCacheStore, SystemClock,
};
pub use catalog::CatalogItem;
pub use config::{
    load_config, load_config_from_str, validate_config, CacheConfig, Config, ConfigError,
    IngestConfig, ProvidersConfig, SanitizedConfig, ServerConfig,
};
pub use favorites::{FavoriteItem, FavoritesError, FavoritesStore};
pub use filters::{
    FilterCriteria, FilterError, FilterGroup, FilterPatch, FilterState, Keyword, SortKey,
    SortOrder,
};
pub use ingest::{CatalogIngestor, IngestError};
pub use library::ContentLibrary;
pub use providers::{CountMap, ProviderCountAggregator, PROVIDER_COUNTS_NAMESPACE};
pub use query::{run_query, QueryPage, PAGE_SIZE};
pub use tmdb::{
    image_url, CatalogSource, ContentType, GatewayError, ImageSize, TmdbClient, TmdbConfig,
    WatchProvider,
};
