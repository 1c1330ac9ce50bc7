//! Watch-provider availability counts.
//!
//! For a (content type, region) pair the aggregator asks the discover
//! endpoint how many titles each provider carries, using a small pool of
//! workers that pull provider indices from a shared cursor. Results are
//! cached for the TTL of the underlying [`DurableCache`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, DurableCache};
use crate::config::ProvidersConfig;
use crate::inflight::KeyedLocks;
use crate::metrics::{PROVIDER_AGGREGATIONS, PROVIDER_LOOKUP_FAILURES};
use crate::tmdb::{CatalogSource, ContentType, WatchProvider};

/// Provider ID to number of matching titles. Zero counts are never stored.
pub type CountMap = BTreeMap<u32, u64>;

/// [`DurableCache`] namespace holding count maps.
pub const PROVIDER_COUNTS_NAMESPACE: &str = "provider_counts";

/// Cache key for a (content type, region) pair.
pub fn cache_key(content_type: ContentType, region: &str) -> String {
    format!("{}:{}", content_type, region)
}

/// Keep providers with a logo, order by display priority (unset last) and
/// optionally keep only the first `limit`.
pub fn select_providers(
    mut providers: Vec<WatchProvider>,
    limit: Option<usize>,
) -> Vec<WatchProvider> {
    providers.retain(|p| p.logo_path.as_deref().is_some_and(|l| !l.is_empty()));
    providers.sort_by_key(|p| p.display_priority.unwrap_or(u32::MAX));
    if let Some(limit) = limit {
        providers.truncate(limit);
    }
    providers
}

/// Bounded-concurrency provider count aggregator.
pub struct ProviderCountAggregator {
    source: Arc<dyn CatalogSource>,
    cache: Arc<DurableCache>,
    concurrency: usize,
    monetization_types: String,
    inflight: KeyedLocks,
}

impl ProviderCountAggregator {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        cache: Arc<DurableCache>,
        config: &ProvidersConfig,
    ) -> Self {
        Self {
            source,
            cache,
            concurrency: config.concurrency.max(1),
            monetization_types: config.monetization_types.clone(),
            inflight: KeyedLocks::new(),
        }
    }

    /// Counts already in the cache, without touching the network.
    pub fn cached_counts(&self, content_type: ContentType, region: &str) -> Option<CountMap> {
        self.cache
            .get::<CountMap>(&cache_key(content_type, region))
            .map(|entry| entry.data)
    }

    /// Produce the count map for `content_type` in `region`.
    ///
    /// Never fails: per-provider failures drop that provider, and a failure
    /// to load the provider catalog yields an empty (uncached) map.
    pub async fn fetch_counts(
        &self,
        content_type: ContentType,
        region: &str,
        limit: Option<usize>,
    ) -> CountMap {
        if content_type.providers_path().is_none() {
            debug!(content_type = %content_type, "No watch providers for content type");
            return CountMap::new();
        }

        let key = cache_key(content_type, region);
        if let Some(counts) = self.cached_counts(content_type, region) {
            PROVIDER_AGGREGATIONS
                .with_label_values(&[content_type.as_str(), "cached"])
                .inc();
            return counts;
        }

        let _guard = self.inflight.lock(&key).await;

        // Someone else may have finished the same aggregation while we waited.
        if let Some(counts) = self.cached_counts(content_type, region) {
            PROVIDER_AGGREGATIONS
                .with_label_values(&[content_type.as_str(), "cached"])
                .inc();
            return counts;
        }

        let providers = match self.source.watch_providers(content_type).await {
            Ok(providers) => select_providers(providers, limit),
            Err(e) => {
                warn!(
                    content_type = %content_type,
                    region = %region,
                    error = %e,
                    "Failed to load provider catalog"
                );
                PROVIDER_AGGREGATIONS
                    .with_label_values(&[content_type.as_str(), "failed"])
                    .inc();
                return CountMap::new();
            }
        };

        let counts = self.count_providers(content_type, region, &providers).await;

        if let Err(e) = self.cache.put(&key, &counts) {
            warn!(key = %key, error = %e, "Failed to persist provider counts");
        }

        info!(
            content_type = %content_type,
            region = %region,
            providers = providers.len(),
            with_titles = counts.len(),
            "Provider counts aggregated"
        );
        PROVIDER_AGGREGATIONS
            .with_label_values(&[content_type.as_str(), "computed"])
            .inc();

        counts
    }

    /// Forget the cached counts for one pair.
    pub fn invalidate(&self, content_type: ContentType, region: &str) -> Result<(), CacheError> {
        self.cache.invalidate(&cache_key(content_type, region))
    }

    /// Forget cached counts for every content type in each of `regions`.
    pub fn clear_cache(&self, regions: &[&str]) -> Result<(), CacheError> {
        for region in regions {
            for content_type in ContentType::ALL {
                if content_type.providers_path().is_some() {
                    self.invalidate(content_type, region)?;
                }
            }
        }
        Ok(())
    }

    async fn count_providers(
        &self,
        content_type: ContentType,
        region: &str,
        providers: &[WatchProvider],
    ) -> CountMap {
        let cursor = AtomicUsize::new(0);
        let cursor = &cursor;
        let workers = self.concurrency.min(providers.len());

        let results = join_all(
            (0..workers).map(move |_| self.run_worker(cursor, providers, content_type, region)),
        )
        .await;

        results
            .into_iter()
            .flatten()
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Claim provider indices until the cursor runs past the end.
    async fn run_worker(
        &self,
        cursor: &AtomicUsize,
        providers: &[WatchProvider],
        content_type: ContentType,
        region: &str,
    ) -> Vec<(u32, u64)> {
        let mut found = Vec::new();

        loop {
            let idx = cursor.fetch_add(1, Ordering::SeqCst);
            let Some(provider) = providers.get(idx) else {
                break;
            };

            match self
                .source
                .discover_total(
                    content_type,
                    provider.provider_id,
                    region,
                    &self.monetization_types,
                )
                .await
            {
                Ok(total) => found.push((provider.provider_id, total)),
                Err(e) => {
                    PROVIDER_LOOKUP_FAILURES.inc();
                    debug!(
                        provider_id = provider.provider_id,
                        region = %region,
                        error = %e,
                        "Provider count lookup failed"
                    );
                }
            }
        }

        found
    }
}
