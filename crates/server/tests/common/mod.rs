//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock catalog source and an in-memory cache store, enabling
//! end-to-end API tests without network access.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use marquee_core::{
    testing::{ManualClock, MockCatalogSource},
    CacheStore, CatalogIngestor, CatalogSource, ContentLibrary, Config, DurableCache,
    FavoritesStore, IngestConfig, MemoryCacheStore, ProviderCountAggregator, TmdbConfig,
    PROVIDER_COUNTS_NAMESPACE,
};

/// Re-export fixtures for test convenience
pub use marquee_core::testing::fixtures;

/// Image base used by every fixture so URLs are predictable.
pub const IMAGE_BASE_URL: &str = "http://images.test";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_catalog() {
///     let fixture = TestFixture::new().await;
///     fixture.source.set_pages(ContentType::Movie, vec![fixtures::movie_page(1, 20)]).await;
///
///     let response = fixture.get("/api/v1/catalog/movie").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog source - configure listings, providers and totals
    pub source: Arc<MockCatalogSource>,
    /// Store shared by provider counts and favorites
    pub store: Arc<MemoryCacheStore>,
    /// Clock driving cache expiry
    pub clock: Arc<ManualClock>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let source = Arc::new(MockCatalogSource::new());
        let store = Arc::new(MemoryCacheStore::new());
        let clock = Arc::new(ManualClock::new());

        let config = Config {
            tmdb: TmdbConfig {
                api_key: "test-key".to_string(),
                image_base_url: Some(IMAGE_BASE_URL.to_string()),
                ..TmdbConfig::default()
            },
            ingest: IngestConfig {
                max_pages: test_config.max_pages,
                page_delay_ms: 0,
                extra_params: BTreeMap::new(),
            },
            ..Config::default()
        };

        let catalog_source: Arc<dyn CatalogSource> = source.clone();
        let cache_store: Arc<dyn CacheStore> = store.clone();

        let counts_cache = Arc::new(DurableCache::new(
            Arc::clone(&cache_store),
            PROVIDER_COUNTS_NAMESPACE,
            config.cache.ttl(),
            clock.clone(),
        ));
        let providers = Arc::new(ProviderCountAggregator::new(
            Arc::clone(&catalog_source),
            counts_cache,
            &config.providers,
        ));
        let library = Arc::new(ContentLibrary::new(CatalogIngestor::new(
            catalog_source,
            &config.ingest,
        )));
        let favorites = Arc::new(FavoritesStore::new(cache_store));

        let state = Arc::new(marquee_server::state::AppState::new(
            config, library, providers, favorites,
        ));

        // Create router
        let router = marquee_server::api::create_router(state);

        Self {
            router,
            source,
            store,
            clock,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Listing pages ingested per content type
    pub max_pages: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self { max_pages: 2 }
    }
}

impl TestConfig {
    pub fn with_max_pages(max_pages: u32) -> Self {
        Self { max_pages }
    }
}
