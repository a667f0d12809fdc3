use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::QueryRejection;
use coursedesk_core::document::validate::ValidationError;
use coursedesk_core::CoreError;
use serde_json::json;

/// API error type mapped to the JSON bodies admin clients expect.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body or query string could not be read; keeps the extractor's status.
    #[error("rejected request: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::Validation(e),
            CoreError::NotFound { entity, .. } => ApiError::NotFound(entity),
            CoreError::Store(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("{entity} not found") }),
            ),
            ApiError::Validation(err) => {
                (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
            }
            ApiError::Rejected { status, message } => (*status, json!({ "error": message })),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::not_found("Course", "x"), StatusCode::NOT_FOUND),
            (
                CoreError::Validation(ValidationError::InvalidIds),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::Store("connection reset".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
        assert_eq!(
            ApiError::Unauthorized("bad token".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn query_rejections_become_json() {
        #[derive(Debug, serde::Deserialize)]
        struct Paging {
            #[allow(dead_code)]
            n: u32,
        }
        let uri: axum::http::Uri = "/items?n=abc".parse().unwrap();
        let rejection = axum_extra::extract::Query::<Paging>::try_from_uri(&uri).unwrap_err();
        let response = ApiError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().contains("query string"));
    }
}
