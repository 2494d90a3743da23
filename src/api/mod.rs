//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::store::LedgerStore;

pub use routes::{create_router, AppState};

/// Build the application router
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: LedgerStore + Clone,
{
    // Layers run outermost-last: identity -> logging -> handler
    let api_routes = create_router::<S>()
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::client_identity_middleware));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
