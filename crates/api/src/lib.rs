//! HTTP surface of the course catalog admin backend.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// The router with every middleware layer applied, as served by `main`.
pub fn app(state: AppState) -> Router {
    let config = state.config().clone();
    routes::build_router(state)
        .layer(middleware::body_limit_layer(config.max_body_bytes))
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer(&config.cors_origins))
}
