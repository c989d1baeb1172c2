//! API route definitions

use super::handlers::{self, AppState};
use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Discovery
        .route("/api/tools", get(handlers::list_tools))
        .route(
            "/api/tools/{id}",
            get(handlers::get_tool).post(handlers::run_tool),
        )
        .route("/api/categories", get(handlers::list_categories))
        .route(
            "/api/categories/{id}/tools",
            get(handlers::list_category_tools),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
