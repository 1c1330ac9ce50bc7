use std::sync::Arc;

use marquee_core::{
    image_url, Config, ContentLibrary, FavoritesStore, ImageSize, ProviderCountAggregator,
    SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    image_base_url: String,
    library: Arc<ContentLibrary>,
    providers: Arc<ProviderCountAggregator>,
    favorites: Arc<FavoritesStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        library: Arc<ContentLibrary>,
        providers: Arc<ProviderCountAggregator>,
        favorites: Arc<FavoritesStore>,
    ) -> Self {
        let image_base_url = config.tmdb.resolved_image_base_url();
        Self {
            config,
            image_base_url,
            library,
            providers,
            favorites,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn library(&self) -> &ContentLibrary {
        self.library.as_ref()
    }

    pub fn providers(&self) -> &ProviderCountAggregator {
        self.providers.as_ref()
    }

    pub fn favorites(&self) -> &FavoritesStore {
        self.favorites.as_ref()
    }

    /// Absolute URL for a poster or profile path.
    pub fn image_url(&self, path: Option<&str>, size: ImageSize) -> String {
        image_url(&self.image_base_url, path, size)
    }
}
