use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/session/connect", post(handlers::connect))
        .route("/session/disconnect", post(handlers::disconnect))
        .route("/session/text", post(handlers::send_text))
        .route("/session/outfit/dismiss", post(handlers::dismiss_outfit))
        // Observables
        .route("/session/state", get(handlers::get_state))
        .route("/session/transcript", get(handlers::get_transcript))
        .route("/session/outfit", get(handlers::get_outfit))
        .route("/session/stats", get(handlers::get_stats))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
