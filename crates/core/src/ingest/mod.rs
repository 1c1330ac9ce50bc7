//! Catalog ingestion.
//!
//! Pulls a fixed window of popularity-ordered listing pages for one content
//! type, one page at a time, and normalizes every result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::CatalogItem;
use crate::config::IngestConfig;
use crate::metrics::{INGEST_ITEMS, INGEST_RUNS};
use crate::tmdb::{CatalogSource, ContentType, GatewayError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to fetch page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: GatewayError,
    },
}

/// Sequential, paced page fetcher.
pub struct CatalogIngestor {
    source: Arc<dyn CatalogSource>,
    max_pages: u32,
    page_delay: Duration,
    extra_params: Vec<(String, String)>,
}

impl CatalogIngestor {
    pub fn new(source: Arc<dyn CatalogSource>, config: &IngestConfig) -> Self {
        Self {
            source,
            max_pages: config.page_limit(),
            page_delay: config.page_delay(),
            extra_params: config.extra_params_list(),
        }
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Fetch and normalize pages `1..=max_pages`.
    ///
    /// Any failure discards everything fetched so far and yields an empty
    /// list; use [`try_ingest`](Self::try_ingest) to see the error.
    pub async fn ingest(&self, content_type: ContentType) -> Vec<CatalogItem> {
        match self.try_ingest(content_type).await {
            Ok(items) => items,
            Err(e) => {
                warn!(content_type = %content_type, error = %e, "Catalog ingestion failed");
                Vec::new()
            }
        }
    }

    /// Like [`ingest`](Self::ingest) but reports the first failing page.
    pub async fn try_ingest(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<CatalogItem>, IngestError> {
        let start = Instant::now();
        let mut items = Vec::new();

        for page in 1..=self.max_pages {
            if page > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let listing = match self
                .source
                .popular_page(content_type, page, &self.extra_params)
                .await
            {
                Ok(listing) => listing,
                Err(source) => {
                    INGEST_RUNS
                        .with_label_values(&[content_type.as_str(), "failed"])
                        .inc();
                    return Err(IngestError::Page { page, source });
                }
            };

            debug!(
                content_type = %content_type,
                page,
                results = listing.results.len(),
                "Fetched listing page"
            );

            items.extend(listing.results.into_iter().map(CatalogItem::from));
        }

        INGEST_RUNS
            .with_label_values(&[content_type.as_str(), "success"])
            .inc();
        INGEST_ITEMS
            .with_label_values(&[content_type.as_str()])
            .observe(items.len() as f64);

        info!(
            content_type = %content_type,
            pages = self.max_pages,
            items = items.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Catalog ingested"
        );

        Ok(items)
    }
}
