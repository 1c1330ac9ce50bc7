//! Ingested item sets, one per content type.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::catalog::CatalogItem;
use crate::filters::FilterCriteria;
use crate::inflight::KeyedLocks;
use crate::ingest::CatalogIngestor;
use crate::query::{run_query, QueryPage};
use crate::tmdb::ContentType;

/// Holds the latest ingested snapshot per content type.
///
/// Snapshots are replaced wholesale and handed out as `Arc`s, so a query
/// never observes a half-written set. Concurrent loads of the same content
/// type are serialized; a caller that waited on someone else's load reuses
/// its result.
pub struct ContentLibrary {
    ingestor: CatalogIngestor,
    items: RwLock<HashMap<ContentType, Arc<Vec<CatalogItem>>>>,
    inflight: KeyedLocks,
}

impl ContentLibrary {
    pub fn new(ingestor: CatalogIngestor) -> Self {
        Self {
            ingestor,
            items: RwLock::new(HashMap::new()),
            inflight: KeyedLocks::new(),
        }
    }

    /// Current snapshot, if any.
    pub fn snapshot(&self, content_type: ContentType) -> Option<Arc<Vec<CatalogItem>>> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&content_type)
            .cloned()
    }

    /// Whether an ingestion for `content_type` is running.
    pub fn is_loading(&self, content_type: ContentType) -> bool {
        self.inflight.is_locked(content_type.as_str())
    }

    /// Re-run ingestion and replace the snapshot. Returns the new item count.
    pub async fn refresh(&self, content_type: ContentType) -> usize {
        let _guard = self.inflight.lock(content_type.as_str()).await;
        self.load(content_type).await
    }

    /// Ingest `content_type` unless a non-empty snapshot already exists.
    pub async fn ensure_loaded(&self, content_type: ContentType) -> Arc<Vec<CatalogItem>> {
        if let Some(items) = self.snapshot(content_type).filter(|i| !i.is_empty()) {
            return items;
        }

        let _guard = self.inflight.lock(content_type.as_str()).await;

        if let Some(items) = self.snapshot(content_type).filter(|i| !i.is_empty()) {
            debug!(content_type = %content_type, "Reusing snapshot loaded while waiting");
            return items;
        }

        self.load(content_type).await;
        self.snapshot(content_type).unwrap_or_default()
    }

    /// Run the query pipeline over the current snapshot.
    ///
    /// An unloaded content type behaves like an empty one.
    pub fn query(
        &self,
        content_type: ContentType,
        criteria: &FilterCriteria,
        page: usize,
    ) -> QueryPage {
        let items = self.snapshot(content_type).unwrap_or_default();
        run_query(&items, criteria, page)
    }

    async fn load(&self, content_type: ContentType) -> usize {
        let items = self.ingestor.ingest(content_type).await;
        let count = items.len();

        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(content_type, Arc::new(items));

        info!(content_type = %content_type, items = count, "Library snapshot replaced");
        count
    }
}
