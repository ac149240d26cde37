use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stockroom_core::error::CoreError;
use stockroom_db::StoreError;
use stockroom_index::SearchError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, store, and search error types and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce the uniform
/// `{success: false, message, status}` error envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A domain-level error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A search adapter error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing or not-owned entity.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A rejected credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                CoreError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },

            ApiError::Store(err) => classify_store_error(err),

            ApiError::Search(err) => match err {
                // An all-empty query is the caller's mistake, not ours.
                SearchError::EmptyQuery => (StatusCode::BAD_REQUEST, err.to_string()),
                other => {
                    tracing::error!(error = %other, "Search engine error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },

            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "message": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a store error into a status and client-safe message.
///
/// Unique-constraint violations are surfaced as validation failures; raw
/// database errors are logged with their details and surfaced generically.
fn classify_store_error(err: StoreError) -> (StatusCode, String) {
    match err {
        StoreError::Duplicate { constraint } => (
            StatusCode::BAD_REQUEST,
            format!("duplicate value violates unique constraint {constraint}"),
        ),
        other => {
            tracing::error!(error = %other, "Store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}
