//! TMDB gateway.
//!
//! Thin authenticated access to the TMDB v3 API plus image URL resolution.
//! Everything else in the crate talks to the catalog through the
//! [`CatalogSource`] trait so that tests can swap in a mock.

mod client;
mod types;

pub use client::{image_url, TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No credential configured (missing API key).
    #[error("Client not configured: {0}")]
    NotConfigured(String),

    /// Upstream answered with a non-success status.
    #[error("Request failed: {status} - {body}")]
    Request { status: u16, body: String },

    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The content type has no such endpoint (e.g. people have no providers).
    #[error("Unsupported for content type '{0}'")]
    Unsupported(ContentType),
}

/// Catalog operations used by ingestion and provider aggregation.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of the popularity-ordered listing for a content type.
    async fn popular_page(
        &self,
        content_type: ContentType,
        page: u32,
        extra_params: &[(String, String)],
    ) -> Result<ListingPage, GatewayError>;

    /// Fetch the full watch-provider catalog for a content type.
    async fn watch_providers(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<WatchProvider>, GatewayError>;

    /// Number of titles available on a single provider in a region.
    ///
    /// Only the first discover page is requested; the total is read from
    /// the page metadata.
    async fn discover_total(
        &self,
        content_type: ContentType,
        provider_id: u32,
        region: &str,
        monetization_types: &str,
    ) -> Result<u64, GatewayError>;
}
