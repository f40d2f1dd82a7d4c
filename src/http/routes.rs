use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with the API routes only
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Translation control
        .route("/start_translation", post(handlers::start_translation))
        .route("/stop_translation", post(handlers::stop_translation))
        .route("/status", get(handlers::translation_status))
        // Server-sent events
        .route("/stream", get(handlers::stream))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes plus the browser front end served from `static_dir` at `/`
pub fn create_app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    create_router(state).fallback_service(ServeDir::new(static_dir.as_ref()))
}
