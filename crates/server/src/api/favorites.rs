//! Favorites API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use marquee_core::{FavoriteItem, FavoritesError};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::handlers::{parse_content_type, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FavoritesParams {
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteItem>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: u64,
    /// Whether the item is a favorite after the toggle.
    pub favorite: bool,
}

/// GET /api/v1/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FavoritesParams>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let content_type = params
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty())
        .map(parse_content_type)
        .transpose()?;

    let favorites = state.favorites().list(content_type);
    let total = favorites.len();
    Ok(Json(FavoritesResponse { favorites, total }))
}

/// POST /api/v1/favorites/toggle
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Json(item): Json<FavoriteItem>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let id = item.id;
    let content_type = item.content_type;

    let favorite = state.favorites().toggle(item).map_err(|e| match e {
        FavoritesError::Unsupported(_) => ApiError::bad_request(e.to_string()),
        FavoritesError::Cache(_) => ApiError::internal(e.to_string()),
    })?;

    info!(id, content_type = %content_type, favorite, "Favorite toggled");
    Ok(Json(ToggleResponse { id, favorite }))
}
