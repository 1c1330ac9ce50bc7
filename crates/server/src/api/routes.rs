use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{catalog, favorites, handlers, middleware::metrics_middleware, providers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Catalog (local filtered view)
        .route("/catalog/{content_type}", get(catalog::list_catalog))
        .route(
            "/catalog/{content_type}/refresh",
            post(catalog::refresh_catalog),
        )
        // Provider counts
        .route(
            "/providers/{content_type}/counts",
            get(providers::get_counts).delete(providers::invalidate_counts),
        )
        // Favorites
        .route("/favorites", get(favorites::list_favorites))
        .route("/favorites/toggle", post(favorites::toggle_favorite))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
