//! User favorites, persisted as one JSON array in a [`CacheStore`].

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::cache::{CacheError, CacheStore};
use crate::catalog::CatalogItem;
use crate::tmdb::ContentType;

/// Storage key holding the serialized list.
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Error)]
pub enum FavoritesError {
    /// Only titles can be favorited.
    #[error("Cannot favorite content type '{0}'")]
    Unsupported(ContentType),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// A favorited movie or show. Identity is `(id, content_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
}

impl From<&CatalogItem> for FavoriteItem {
    fn from(item: &CatalogItem) -> Self {
        let (release_date, first_air_date) = match item.content_type {
            ContentType::Tv => (None, item.date.clone()),
            _ => (item.date.clone(), None),
        };
        Self {
            id: item.id,
            title: item.title.clone(),
            poster_path: item.image_path.clone(),
            content_type: item.content_type,
            vote_average: item.rating,
            release_date,
            first_air_date,
        }
    }
}

/// Favorites list, loaded once and written through on every change.
pub struct FavoritesStore {
    store: Arc<dyn CacheStore>,
    favorites: RwLock<Vec<FavoriteItem>>,
}

impl FavoritesStore {
    /// Load the persisted list. Missing or unreadable data starts empty.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        let favorites = match store.get_raw(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable favorites");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load favorites");
                Vec::new()
            }
        };

        Self {
            store,
            favorites: RwLock::new(favorites),
        }
    }

    /// Add `item` if absent, remove it otherwise. Returns whether it is now
    /// a favorite. Nothing changes if the list cannot be persisted.
    pub fn toggle(&self, item: FavoriteItem) -> Result<bool, FavoritesError> {
        if item.content_type.providers_path().is_none() {
            return Err(FavoritesError::Unsupported(item.content_type));
        }

        let mut favorites = self
            .favorites
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut next = favorites.clone();
        let added = match next
            .iter()
            .position(|f| f.id == item.id && f.content_type == item.content_type)
        {
            Some(pos) => {
                next.remove(pos);
                false
            }
            None => {
                next.push(item);
                true
            }
        };

        let raw = serde_json::to_string(&next).map_err(|e| CacheError::Parse(e.to_string()))?;
        self.store.set_raw(FAVORITES_KEY, &raw)?;
        *favorites = next;

        Ok(added)
    }

    pub fn is_favorite(&self, id: u64, content_type: ContentType) -> bool {
        self.favorites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|f| f.id == id && f.content_type == content_type)
    }

    /// Favorites in insertion order, optionally of one content type.
    pub fn list(&self, content_type: Option<ContentType>) -> Vec<FavoriteItem> {
        self.favorites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|f| content_type.is_none_or(|ct| f.content_type == ct))
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.favorites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::testing::fixtures;

    fn favorite(id: u64, content_type: ContentType) -> FavoriteItem {
        FavoriteItem {
            id,
            title: format!("Title {}", id),
            poster_path: None,
            content_type,
            vote_average: 7.0,
            release_date: None,
            first_air_date: None,
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let favorites = FavoritesStore::new(Arc::new(MemoryCacheStore::new()));

        assert!(favorites.toggle(favorite(1, ContentType::Movie)).unwrap());
        assert!(favorites.is_favorite(1, ContentType::Movie));
        assert!(!favorites.is_favorite(1, ContentType::Tv));

        assert!(!favorites.toggle(favorite(1, ContentType::Movie)).unwrap());
        assert!(!favorites.is_favorite(1, ContentType::Movie));
        assert_eq!(favorites.count(), 0);
    }

    #[test]
    fn test_same_id_different_type_are_distinct() {
        let favorites = FavoritesStore::new(Arc::new(MemoryCacheStore::new()));
        favorites.toggle(favorite(1, ContentType::Movie)).unwrap();
        favorites.toggle(favorite(1, ContentType::Tv)).unwrap();

        assert_eq!(favorites.count(), 2);
        assert_eq!(favorites.list(Some(ContentType::Tv)).len(), 1);
        assert_eq!(favorites.list(None).len(), 2);
    }

    #[test]
    fn test_people_cannot_be_favorited() {
        let favorites = FavoritesStore::new(Arc::new(MemoryCacheStore::new()));
        let err = favorites
            .toggle(favorite(1, ContentType::Person))
            .unwrap_err();
        assert!(matches!(err, FavoritesError::Unsupported(ContentType::Person)));
    }

    #[test]
    fn test_persists_across_instances() {
        let store = Arc::new(MemoryCacheStore::new());
        FavoritesStore::new(store.clone())
            .toggle(favorite(42, ContentType::Tv))
            .unwrap();

        let reloaded = FavoritesStore::new(store);
        assert!(reloaded.is_favorite(42, ContentType::Tv));
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let store = Arc::new(MemoryCacheStore::new());
        store.set_raw(FAVORITES_KEY, "[{broken").unwrap();

        let favorites = FavoritesStore::new(store);
        assert_eq!(favorites.count(), 0);
    }

    #[test]
    fn test_from_catalog_item_maps_dates() {
        let movie = fixtures::catalog_item(1, "Heat");
        let fav = FavoriteItem::from(&movie);
        assert_eq!(fav.release_date.as_deref(), Some("2020-01-01"));
        assert!(fav.first_air_date.is_none());

        let show = CatalogItem {
            content_type: ContentType::Tv,
            ..fixtures::catalog_item(2, "Dark")
        };
        let fav = FavoriteItem::from(&show);
        assert!(fav.release_date.is_none());
        assert_eq!(fav.first_air_date.as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn test_serialized_shape_uses_type_field() {
        let json = serde_json::to_value(favorite(1, ContentType::Movie)).unwrap();
        assert_eq!(json["type"], "movie");
    }
}
