use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};
use coursedesk_core::mutation::types::DeleteConfirmation;
use coursedesk_core::page::service::StoredPage;
use coursedesk_core::page::PageQuery;
use serde_json::Value;

use crate::error::ApiResult;
use crate::state::AppState;

/// Page routes, nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pages", post(create).get(list))
        .route("/pages/{key}", get(fetch).put(update).delete(remove))
}

async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StoredPage>)> {
    let Json(payload) = body?;
    Ok((StatusCode::CREATED, Json(state.pages().create(payload).await?)))
}

async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<StoredPage>>> {
    let Query(query) = query?;
    Ok(Json(state.pages().list(&query).await?))
}

/// Pages are read by slug but written by identity.
async fn fetch(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<StoredPage>> {
    Ok(Json(state.pages().get_by_slug(&slug).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<StoredPage>> {
    let Json(payload) = body?;
    Ok(Json(state.pages().update(&id, payload).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteConfirmation>> {
    Ok(Json(state.pages().delete(&id).await?))
}
