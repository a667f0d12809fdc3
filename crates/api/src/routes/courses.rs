use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};
use coursedesk_core::course::service::StoredCourse;
use coursedesk_core::course::CourseQuery;
use coursedesk_core::mutation::types::{
    BulkDeleteResult, BulkStatusResult, BulkUpdateResult, DeleteConfirmation,
};
use serde_json::Value;

use crate::auth::MaybeActor;
use crate::error::ApiResult;
use crate::state::AppState;

/// Course card routes, nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", post(create).get(list))
        .route("/courses/bulk/update", post(bulk_update))
        .route("/courses/bulk/delete", post(bulk_delete))
        .route("/courses/bulk/status", post(bulk_status))
        .route("/courses/{key}", get(fetch).put(update).delete(remove))
}

type JsonBody = Result<Json<Value>, JsonRejection>;

async fn create(
    State(state): State<AppState>,
    actor: MaybeActor,
    body: JsonBody,
) -> ApiResult<(StatusCode, Json<StoredCourse>)> {
    let Json(payload) = body?;
    let course = state.courses().create(payload, actor.actor()).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn list(
    State(state): State<AppState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<StoredCourse>>> {
    let Query(query) = query?;
    Ok(Json(state.courses().list(&query).await?))
}

/// `key` is an identity or an exact program title.
async fn fetch(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<StoredCourse>> {
    Ok(Json(state.courses().get(&key).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: MaybeActor,
    body: JsonBody,
) -> ApiResult<Json<StoredCourse>> {
    let Json(payload) = body?;
    Ok(Json(state.courses().update(&id, payload, actor.actor()).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteConfirmation>> {
    Ok(Json(state.courses().delete(&id).await?))
}

async fn bulk_update(
    State(state): State<AppState>,
    actor: MaybeActor,
    body: JsonBody,
) -> ApiResult<Json<BulkUpdateResult>> {
    let Json(payload) = body?;
    Ok(Json(state.courses().bulk_update(&payload, actor.actor()).await?))
}

async fn bulk_delete(
    State(state): State<AppState>,
    body: JsonBody,
) -> ApiResult<Json<BulkDeleteResult>> {
    let Json(payload) = body?;
    Ok(Json(state.courses().bulk_delete(&payload).await?))
}

async fn bulk_status(
    State(state): State<AppState>,
    actor: MaybeActor,
    body: JsonBody,
) -> ApiResult<Json<BulkStatusResult>> {
    let Json(payload) = body?;
    Ok(Json(
        state
            .courses()
            .bulk_update_status(&payload, actor.actor())
            .await?,
    ))
}
