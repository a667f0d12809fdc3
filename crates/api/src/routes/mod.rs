pub mod courses;
pub mod health;
pub mod pages;
pub mod stats;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(courses::routes())
        .merge(pages::routes())
        .merge(stats::routes())
        .route("/ping", get(health::ping));

    Router::new()
        .merge(health::routes())
        .nest("/api", api)
        .with_state(state)
}
