//! Catalog lifecycle integration tests.
//!
//! These tests wire the real services together over a mock catalog source:
//! - Ingestion into the content library followed by filtered queries
//! - Filter state surviving a query-string round trip
//! - Provider counts persisted in SQLite and reused by a fresh process

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::TimeDelta;
use tempfile::TempDir;

use marquee_core::{
    testing::{fixtures, ManualClock, MockCatalogSource},
    CacheStore, CatalogIngestor, ContentLibrary, ContentType, DurableCache, FilterCriteria,
    FilterState, IngestConfig, ProviderCountAggregator, ProvidersConfig, SortKey, SortOrder,
    SqliteCacheStore, PROVIDER_COUNTS_NAMESPACE,
};

fn ingest_config(max_pages: u32) -> IngestConfig {
    IngestConfig {
        max_pages,
        page_delay_ms: 0,
        extra_params: BTreeMap::new(),
    }
}

/// Two pages of twenty movies; ratings cycle 5.0..=9.5 by ID.
async fn two_page_library() -> (Arc<MockCatalogSource>, ContentLibrary) {
    let source = Arc::new(MockCatalogSource::new());
    source
        .set_pages(
            ContentType::Movie,
            vec![fixtures::movie_page(1, 20), fixtures::movie_page(21, 20)],
        )
        .await;

    let ingestor = CatalogIngestor::new(source.clone(), &ingest_config(2));
    (source, ContentLibrary::new(ingestor))
}

#[tokio::test]
async fn test_filter_sort_paginate_over_ingested_movies() {
    let (_source, library) = two_page_library().await;
    assert_eq!(library.ensure_loaded(ContentType::Movie).await.len(), 40);

    let mut state = FilterState::new();
    state.set_rating_range(7.0, 10.0).unwrap();
    state.set_sort(SortKey::VoteAverage, SortOrder::Asc);

    let page = library.query(ContentType::Movie, state.criteria(), 1);

    // id % 10 in 4..=9 gives ratings 7.0..=9.5: six per ten items.
    assert_eq!(page.total_results, 24);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 20);

    let ratings: Vec<f64> = page.items.iter().map(|i| i.rating).collect();
    assert!(ratings.windows(2).all(|w| w[0] <= w[1]));
    assert!(ratings.iter().all(|r| *r >= 7.0));

    // Ties keep ingestion order.
    let sevens: Vec<u64> = page
        .items
        .iter()
        .filter(|i| i.rating == 7.0)
        .map(|i| i.id)
        .collect();
    assert_eq!(sevens, vec![4, 14, 24, 34]);

    let second = library.query(ContentType::Movie, state.criteria(), 2);
    assert_eq!(second.items.len(), 4);
    assert!(second.items.iter().all(|i| i.rating == 9.5));
}

#[tokio::test]
async fn test_query_string_round_trip_reproduces_page() {
    let (_source, library) = two_page_library().await;
    library.ensure_loaded(ContentType::Movie).await;

    let mut state = FilterState::new();
    state.set_rating_range(6.0, 8.0).unwrap();
    state.set_sort(SortKey::Title, SortOrder::Asc);

    let parsed = FilterCriteria::from_query(state.to_query()).unwrap();
    assert_eq!(&parsed, state.criteria());

    let direct = library.query(ContentType::Movie, state.criteria(), 1);
    let restored = library.query(ContentType::Movie, &parsed, 1);
    assert_eq!(direct, restored);
}

#[tokio::test]
async fn test_provider_counts_survive_restart() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("cache.db");
    let clock = Arc::new(ManualClock::new());

    let source = Arc::new(MockCatalogSource::new());
    source
        .set_providers(
            ContentType::Tv,
            vec![fixtures::provider(8, 1), fixtures::provider(337, 2)],
        )
        .await;
    source.set_total(8, 1200).await;
    source.set_total(337, 0).await;

    let aggregator_for = |store: Arc<dyn CacheStore>| {
        let cache = Arc::new(DurableCache::new(
            store,
            PROVIDER_COUNTS_NAMESPACE,
            TimeDelta::days(7),
            clock.clone(),
        ));
        ProviderCountAggregator::new(source.clone(), cache, &ProvidersConfig::default())
    };

    {
        let store: Arc<dyn CacheStore> =
            Arc::new(SqliteCacheStore::new(&db_path).expect("Failed to open cache"));
        let counts = aggregator_for(store)
            .fetch_counts(ContentType::Tv, "US", None)
            .await;
        assert_eq!(counts.into_iter().collect::<Vec<_>>(), vec![(8, 1200)]);
    }

    source.clear_queries().await;

    let store: Arc<dyn CacheStore> =
        Arc::new(SqliteCacheStore::new(&db_path).expect("Failed to reopen cache"));
    let raw = store
        .get_raw("provider_counts:tv:US")
        .unwrap()
        .expect("entry persisted");
    assert!(raw.contains("\"ts\""));

    let counts = aggregator_for(store)
        .fetch_counts(ContentType::Tv, "US", None)
        .await;
    assert_eq!(counts.get(&8), Some(&1200));
    assert!(source.recorded_queries().await.is_empty());
}
