//! Route definitions and router construction.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the facade router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/speak", post(handlers::speak))
        .route("/status", get(handlers::status))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
