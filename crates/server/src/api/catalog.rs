//! Catalog API handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use marquee_core::{CatalogItem, FilterCriteria, ImageSize};
use serde::Serialize;
use tracing::debug;

use super::handlers::{parse_content_type, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Query key selecting the page; every other key is a filter key.
const PAGE_PARAM: &str = "page";

#[derive(Debug, Serialize)]
pub struct CatalogItemView {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Absolute poster/profile URL, empty when the item has no image.
    pub image_url: String,
    pub favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogPageResponse {
    pub items: Vec<CatalogItemView>,
    pub page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    /// Number of filter groups that deviate from the defaults.
    pub active_filters: usize,
    /// Canonical query string for the applied filters.
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog/{content_type}
///
/// Filter, sort and paginate the local snapshot. The first request for a
/// content type triggers ingestion.
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    Path(content_type): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CatalogPageResponse>, ApiError> {
    let content_type = parse_content_type(&content_type)?;

    let page = params
        .get(PAGE_PARAM)
        .and_then(|p| p.trim().parse::<usize>().ok())
        .unwrap_or(1);
    // Filter parsing ignores unknown keys, `page` included.
    let criteria = FilterCriteria::from_query(&params)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    state.library().ensure_loaded(content_type).await;
    let result = state.library().query(content_type, &criteria, page);

    debug!(
        content_type = %content_type,
        page = result.page,
        total_results = result.total_results,
        "Catalog query"
    );

    let items = result
        .items
        .into_iter()
        .map(|item| CatalogItemView {
            image_url: state.image_url(item.image_path.as_deref(), ImageSize::default()),
            favorite: state.favorites().is_favorite(item.id, item.content_type),
            item,
        })
        .collect();

    Ok(Json(CatalogPageResponse {
        items,
        page: result.page,
        total_pages: result.total_pages,
        total_results: result.total_results,
        active_filters: criteria.active_filter_count(),
        query: criteria.to_query_string(),
    }))
}

/// POST /api/v1/catalog/{content_type}/refresh
///
/// Re-run ingestion and replace the snapshot.
pub async fn refresh_catalog(
    State(state): State<Arc<AppState>>,
    Path(content_type): Path<String>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let content_type = parse_content_type(&content_type)?;
    let count = state.library().refresh(content_type).await;
    Ok(Json(RefreshResponse { count }))
}
