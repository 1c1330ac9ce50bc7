//! Mock catalog source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::tmdb::{
    CatalogSource, ContentType, GatewayError, ListingPage, RawCatalogItem, WatchProvider,
};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogQuery {
    PopularPage {
        content_type: ContentType,
        page: u32,
        extra_params: Vec<(String, String)>,
    },
    WatchProviders {
        content_type: ContentType,
    },
    DiscoverTotal {
        content_type: ContentType,
        provider_id: u32,
        region: String,
        monetization_types: String,
    },
}

/// Mock implementation of the CatalogSource trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable listing pages, provider catalogs and totals
/// - Track queries for assertions
/// - Simulate failures, globally or per provider/page
/// - Simulate per-provider latency and observe peak concurrency
///
/// # Example
///
/// ```rust,ignore
/// use marquee_core::testing::{MockCatalogSource, fixtures};
///
/// let source = MockCatalogSource::new();
/// source.set_providers(ContentType::Movie, vec![fixtures::provider(8, 1)]).await;
/// source.set_total(8, 120).await;
///
/// let total = source.discover_total(ContentType::Movie, 8, "US", "flatrate").await?;
/// assert_eq!(total, 120);
/// ```
#[derive(Debug)]
pub struct MockCatalogSource {
    /// Listing pages per content type, page 1 first.
    listings: Arc<RwLock<HashMap<ContentType, Vec<Vec<RawCatalogItem>>>>>,
    /// Provider catalogs per content type.
    providers: Arc<RwLock<HashMap<ContentType, Vec<WatchProvider>>>>,
    /// Discover totals by provider ID. Unknown providers report 0.
    totals: Arc<RwLock<HashMap<u32, u64>>>,
    /// Providers whose discover lookup fails.
    failing_providers: Arc<RwLock<HashSet<u32>>>,
    /// Listing pages that fail.
    failing_pages: Arc<RwLock<HashSet<u32>>>,
    /// Artificial latency per provider lookup.
    latencies: Arc<RwLock<HashMap<u32, Duration>>>,
    /// Latency applied to provider catalog requests.
    catalog_latency: Arc<RwLock<Option<Duration>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<GatewayError>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Default for MockCatalogSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogSource {
    /// Create a new empty mock catalog source.
    pub fn new() -> Self {
        Self {
            listings: Arc::new(RwLock::new(HashMap::new())),
            providers: Arc::new(RwLock::new(HashMap::new())),
            totals: Arc::new(RwLock::new(HashMap::new())),
            failing_providers: Arc::new(RwLock::new(HashSet::new())),
            failing_pages: Arc::new(RwLock::new(HashSet::new())),
            latencies: Arc::new(RwLock::new(HashMap::new())),
            catalog_latency: Arc::new(RwLock::new(None)),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Set the listing pages for a content type (index 0 is page 1).
    pub async fn set_pages(&self, content_type: ContentType, pages: Vec<Vec<RawCatalogItem>>) {
        self.listings.write().await.insert(content_type, pages);
    }

    /// Make a listing page fail with a 500.
    pub async fn fail_page(&self, page: u32) {
        self.failing_pages.write().await.insert(page);
    }

    // =========================================================================
    // Providers
    // =========================================================================

    /// Set the provider catalog for a content type.
    pub async fn set_providers(&self, content_type: ContentType, providers: Vec<WatchProvider>) {
        self.providers.write().await.insert(content_type, providers);
    }

    /// Set the discover total for a provider.
    pub async fn set_total(&self, provider_id: u32, total: u64) {
        self.totals.write().await.insert(provider_id, total);
    }

    /// Make a provider's discover lookup fail with a 500.
    pub async fn fail_provider(&self, provider_id: u32) {
        self.failing_providers.write().await.insert(provider_id);
    }

    /// Delay a provider's discover lookup.
    pub async fn set_latency(&self, provider_id: u32, latency: Duration) {
        self.latencies.write().await.insert(provider_id, latency);
    }

    /// Delay provider catalog requests.
    pub async fn set_catalog_latency(&self, latency: Duration) {
        *self.catalog_latency.write().await = Some(latency);
    }

    // =========================================================================
    // Error Simulation
    // =========================================================================

    /// Set an error to be returned on the next operation.
    pub async fn set_next_error(&self, error: GatewayError) {
        *self.next_error.write().await = Some(error);
    }

    async fn check_error(&self) -> Result<(), GatewayError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(())
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    /// Provider IDs passed to `discover_total`, in call order.
    pub async fn discover_calls(&self) -> Vec<u32> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::DiscoverTotal { provider_id, .. } => Some(*provider_id),
                _ => None,
            })
            .collect()
    }

    /// Number of `watch_providers` calls.
    pub async fn provider_catalog_calls(&self) -> usize {
        self.queries
            .read()
            .await
            .iter()
            .filter(|q| matches!(q, RecordedCatalogQuery::WatchProviders { .. }))
            .count()
    }

    /// Pages passed to `popular_page`, in call order.
    pub async fn page_calls(&self) -> Vec<u32> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::PopularPage { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded queries.
    pub async fn clear_queries(&self) {
        self.queries.write().await.clear();
    }

    /// Highest number of simultaneous `discover_total` calls observed.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, query: RecordedCatalogQuery) {
        self.queries.write().await.push(query);
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn popular_page(
        &self,
        content_type: ContentType,
        page: u32,
        extra_params: &[(String, String)],
    ) -> Result<ListingPage, GatewayError> {
        self.record(RecordedCatalogQuery::PopularPage {
            content_type,
            page,
            extra_params: extra_params.to_vec(),
        })
        .await;
        self.check_error().await?;

        if self.failing_pages.read().await.contains(&page) {
            return Err(GatewayError::Request {
                status: 500,
                body: format!("page {} unavailable", page),
            });
        }

        let listings = self.listings.read().await;
        let pages = listings.get(&content_type).map(Vec::as_slice).unwrap_or(&[]);
        let results = page
            .checked_sub(1)
            .and_then(|idx| pages.get(idx as usize))
            .cloned()
            .unwrap_or_default();

        Ok(ListingPage {
            page,
            total_pages: pages.len() as u32,
            total_results: pages.iter().map(|p| p.len() as u64).sum(),
            results,
        })
    }

    async fn watch_providers(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<WatchProvider>, GatewayError> {
        self.record(RecordedCatalogQuery::WatchProviders { content_type })
            .await;

        let latency = *self.catalog_latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.check_error().await?;

        if content_type.providers_path().is_none() {
            return Err(GatewayError::Unsupported(content_type));
        }

        Ok(self
            .providers
            .read()
            .await
            .get(&content_type)
            .cloned()
            .unwrap_or_default())
    }

    async fn discover_total(
        &self,
        content_type: ContentType,
        provider_id: u32,
        region: &str,
        monetization_types: &str,
    ) -> Result<u64, GatewayError> {
        self.record(RecordedCatalogQuery::DiscoverTotal {
            content_type,
            provider_id,
            region: region.to_string(),
            monetization_types: monetization_types.to_string(),
        })
        .await;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = self.latencies.read().await.get(&provider_id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.check_error().await?;

        if self.failing_providers.read().await.contains(&provider_id) {
            return Err(GatewayError::Request {
                status: 500,
                body: format!("provider {} unavailable", provider_id),
            });
        }

        Ok(self
            .totals
            .read()
            .await
            .get(&provider_id)
            .copied()
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_pages_are_one_based() {
        let source = MockCatalogSource::new();
        source
            .set_pages(
                ContentType::Movie,
                vec![vec![fixtures::raw_movie(1, "A")], vec![fixtures::raw_movie(2, "B")]],
            )
            .await;

        let page = source.popular_page(ContentType::Movie, 2, &[]).await.unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.total_pages, 2);

        let beyond = source.popular_page(ContentType::Movie, 3, &[]).await.unwrap();
        assert!(beyond.results.is_empty());
    }

    #[tokio::test]
    async fn test_next_error_is_consumed() {
        let source = MockCatalogSource::new();
        source
            .set_next_error(GatewayError::Parse("boom".to_string()))
            .await;

        assert!(source.watch_providers(ContentType::Movie).await.is_err());
        assert!(source.watch_providers(ContentType::Movie).await.is_ok());
        assert_eq!(source.provider_catalog_calls().await, 2);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let source = MockCatalogSource::new();
        source.set_total(8, 10).await;
        source.fail_provider(9).await;

        assert_eq!(
            source
                .discover_total(ContentType::Tv, 8, "US", "flatrate")
                .await
                .unwrap(),
            10
        );
        assert!(source
            .discover_total(ContentType::Tv, 9, "US", "flatrate")
            .await
            .is_err());
        assert_eq!(source.discover_calls().await, vec![8, 9]);
    }
}
