//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Upstream TMDB requests
//! - Durable cache hits and misses
//! - Provider count aggregation
//! - Catalog ingestion

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Upstream API
// =============================================================================

/// Upstream request duration.
pub static UPSTREAM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "marquee_upstream_request_duration_seconds",
            "Duration of TMDB API calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

/// Upstream requests total.
pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "marquee_upstream_requests_total",
            "Total TMDB API requests",
        ),
        &["endpoint", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Cache
// =============================================================================

/// Cache lookups by namespace and outcome.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marquee_cache_lookups_total", "Durable cache lookups"),
        &["namespace", "result"], // result: "memory_hit", "store_hit", "miss", "expired", "corrupt"
    )
    .unwrap()
});

// =============================================================================
// Provider counts
// =============================================================================

/// Provider count aggregations by outcome.
pub static PROVIDER_AGGREGATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "marquee_provider_aggregations_total",
            "Provider count aggregation runs",
        ),
        &["content_type", "result"], // result: "cached", "computed", "failed"
    )
    .unwrap()
});

/// Per-provider lookups that failed and were dropped from the result.
pub static PROVIDER_LOOKUP_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "marquee_provider_lookup_failures_total",
        "Per-provider count lookups that failed",
    )
    .unwrap()
});

// =============================================================================
// Ingestion
// =============================================================================

/// Ingestion runs by outcome.
pub static INGEST_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marquee_ingest_runs_total", "Catalog ingestion runs"),
        &["content_type", "result"], // result: "success", "failed"
    )
    .unwrap()
});

/// Items produced per successful ingestion run.
pub static INGEST_ITEMS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "marquee_ingest_items",
            "Number of items produced per ingestion run",
        )
        .buckets(vec![0.0, 20.0, 100.0, 200.0, 400.0, 1000.0, 10000.0]),
        &["content_type"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(UPSTREAM_REQUEST_DURATION.clone()),
        Box::new(UPSTREAM_REQUESTS.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(PROVIDER_AGGREGATIONS.clone()),
        Box::new(PROVIDER_LOOKUP_FAILURES.clone()),
        Box::new(INGEST_RUNS.clone()),
        Box::new(INGEST_ITEMS.clone()),
    ]
}
