//! Watch-provider count API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use marquee_core::CountMap;
use serde::Deserialize;

use super::handlers::{parse_content_type, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CountsParams {
    /// ISO 3166-1 region; the configured default when absent.
    #[serde(default)]
    pub region: Option<String>,
    /// Only count the first `limit` providers by display priority.
    #[serde(default)]
    pub limit: Option<usize>,
}

fn resolve_region(state: &AppState, region: Option<String>) -> String {
    region
        .map(|r| r.trim().to_uppercase())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| state.config().providers.default_region.clone())
}

/// GET /api/v1/providers/{content_type}/counts
///
/// Map of provider id to title count. Served from cache when fresh.
pub async fn get_counts(
    State(state): State<Arc<AppState>>,
    Path(content_type): Path<String>,
    Query(params): Query<CountsParams>,
) -> Result<Json<CountMap>, ApiError> {
    let content_type = parse_content_type(&content_type)?;
    let region = resolve_region(&state, params.region);

    let counts = state
        .providers()
        .fetch_counts(content_type, &region, params.limit)
        .await;

    Ok(Json(counts))
}

/// DELETE /api/v1/providers/{content_type}/counts
///
/// Drop the cached counts for one region so the next read recomputes them.
pub async fn invalidate_counts(
    State(state): State<Arc<AppState>>,
    Path(content_type): Path<String>,
    Query(params): Query<CountsParams>,
) -> Result<StatusCode, ApiError> {
    let content_type = parse_content_type(&content_type)?;
    let region = resolve_region(&state, params.region);

    state
        .providers()
        .invalidate(content_type, &region)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}
