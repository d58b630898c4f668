//! HTTP API server

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod middleware;
pub mod state;

pub use state::AppState;

/// Build the API router using the provided application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/albums", post(handlers::create_album))
        .route("/albums/:id", get(handlers::get_album))
        .layer(from_fn(middleware::track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
