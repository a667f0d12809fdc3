use axum::{extract::State, routing::get, Json, Router};
use coursedesk_core::stats::DashboardStats;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats/dashboard", get(dashboard))
}

async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.stats().dashboard().await?))
}
