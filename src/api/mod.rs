//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

use crate::coordinator::OccupancyCoordinator;

pub use routes::create_router;

/// Build the application router
pub fn build_router(coordinator: OccupancyCoordinator) -> Router {
    // Layers run last-added first: context -> logging -> handler
    let api_routes = create_router()
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::context_middleware));

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(coordinator)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
